use scraper::{ElementRef, Selector};

pub fn clean_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub fn inner_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of the first descendant matching `selector`, if it is non-blank.
pub fn first_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element.select(selector).next().and_then(|node| {
        let cleaned = inner_text(node);
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    })
}

/// Tries each selector in order and returns the first non-blank text.
pub fn first_text_any(element: &ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .find_map(|selector| first_text(element, selector))
}

pub fn first_attr(element: &ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(clean_text)
        .filter(|value| !value.is_empty())
}

pub fn snippet(element: &ElementRef<'_>, max_chars: usize) -> String {
    element.html().chars().take(max_chars).collect()
}
