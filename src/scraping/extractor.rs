//! Turns a rendered listing page into concerts.
//!
//! Candidate elements come from the first listing strategy that matches
//! anything; results are never merged across strategies. Each field then
//! has its own ordered fallback list of sub-selectors.

use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::base;
use super::dates;
use crate::models::Concert;

pub struct ListingStrategy {
    pub name: &'static str,
    selector: Selector,
}

impl ListingStrategy {
    fn new(name: &'static str, css: &str) -> Self {
        Self {
            name,
            selector: Selector::parse(css).expect("listing strategy selector"),
        }
    }

    pub fn candidates<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.selector).collect()
    }
}

static LISTING_STRATEGIES: Lazy<Vec<ListingStrategy>> = Lazy::new(|| {
    vec![
        ListingStrategy::new("listing element", "li.event-listings-element"),
        ListingStrategy::new("event listing", ".event-listing"),
        ListingStrategy::new("concert listing", ".concert-listing"),
        ListingStrategy::new("event list item", r#"li[class*="event"]"#),
        ListingStrategy::new("event block", r#"div[class*="event"]"#),
        ListingStrategy::new("concert link", r#"a[href*="concerts"]"#),
    ]
});

static ARTIST_SELECTORS: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&[".artists", ".artist", "strong", "h3", ".summary"]));
static VENUE_SELECTORS: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&[".venue", ".location", ".venue-name"]));
static DATE_SELECTORS: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&[".date", "time", ".event-date"]));
static TIME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time").expect("time selector"));

fn selectors(css: &[&str]) -> Vec<Selector> {
    css.iter()
        .map(|value| Selector::parse(value).expect("field selector"))
        .collect()
}

pub fn strategies() -> &'static [ListingStrategy] {
    &LISTING_STRATEGIES
}

/// Candidates of the first strategy with at least one match.
pub fn select_candidates(
    document: &Html,
) -> Option<(&'static ListingStrategy, Vec<ElementRef<'_>>)> {
    for strategy in strategies() {
        let found = strategy.candidates(document);
        debug!(
            strategy = strategy.name,
            count = found.len(),
            "listing strategy evaluated"
        );
        if !found.is_empty() {
            return Some((strategy, found));
        }
    }
    None
}

pub fn extract(document: &Html, within_days: u32, today: NaiveDate) -> Vec<Concert> {
    let Some((strategy, candidates)) = select_candidates(document) else {
        debug!("no listing strategy matched");
        return Vec::new();
    };
    let last_day = today
        .checked_add_days(Days::new(u64::from(within_days)))
        .unwrap_or(NaiveDate::MAX);

    let mut concerts = Vec::new();
    for candidate in candidates {
        let Some(concert) = read_candidate(&candidate, today) else {
            continue;
        };
        if concert.date() < today || concert.date() > last_day {
            debug!(
                date = %concert.date(),
                artist = concert.artist(),
                "candidate outside requested window"
            );
            continue;
        }
        concerts.push(concert);
    }

    debug!(
        strategy = strategy.name,
        kept = concerts.len(),
        "listing extraction finished"
    );
    concerts
}

pub fn extract_html(html: &str, within_days: u32, today: NaiveDate) -> Vec<Concert> {
    extract(&Html::parse_document(html), within_days, today)
}

fn read_candidate(element: &ElementRef<'_>, today: NaiveDate) -> Option<Concert> {
    let artist = base::first_text_any(element, &ARTIST_SELECTORS);
    let venue = base::first_text_any(element, &VENUE_SELECTORS);
    let date = read_date(element, today);

    match (artist, venue, date) {
        (Some(artist), Some(venue), Some(date)) => Concert::new(date, &artist, &venue),
        (artist, venue, date) => {
            debug!(
                has_artist = artist.is_some(),
                has_venue = venue.is_some(),
                has_date = date.is_some(),
                html = %base::snippet(element, 200),
                "discarding partial candidate"
            );
            None
        }
    }
}

fn read_date(element: &ElementRef<'_>, today: NaiveDate) -> Option<NaiveDate> {
    let text = base::first_text_any(element, &DATE_SELECTORS);
    dates::parse_date_on(text.as_deref(), today).or_else(|| {
        let attr = base::first_attr(element, &TIME_SELECTOR, "datetime");
        dates::parse_date_on(attr.as_deref(), today)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    const SONGKICK_HTML: &str = r#"
    <ul class="metro-area-calendar-listings">
        <li class="event-listings-element">
            <time datetime="2025-03-05T20:00:00+0100"></time>
            <p class="artists summary"><a href="/concerts/1-muse"><strong>Muse</strong></a></p>
            <p class="location"><span class="venue-name">Barclays Arena</span></p>
        </li>
        <li class="event-listings-element">
            <div class="date">15. März 2025</div>
            <p class="artists"><strong>Deichkind</strong></p>
            <p class="location">Sporthalle Hamburg</p>
        </li>
        <li class="event-listings-element">
            <div class="date">March 20, 2025</div>
            <p class="artists"><strong>Nobody Knows Where</strong></p>
        </li>
        <li class="event-listings-element">
            <div class="date">TBA</div>
            <p class="artists"><strong>Mystery Act</strong></p>
            <p class="location">Docks</p>
        </li>
    </ul>
    "#;

    #[test]
    fn extracts_listing_elements() {
        let concerts = extract_html(SONGKICK_HTML, 30, today());
        assert_eq!(concerts.len(), 2);

        assert_eq!(concerts[0].artist(), "Muse");
        assert_eq!(concerts[0].location(), "Barclays Arena");
        assert_eq!(concerts[0].date_key(), "2025-03-05");

        assert_eq!(concerts[1].artist(), "Deichkind");
        assert_eq!(concerts[1].location(), "Sporthalle Hamburg");
        assert_eq!(concerts[1].date_key(), "2025-03-15");
    }

    #[test]
    fn never_returns_blank_fields() {
        for concert in extract_html(SONGKICK_HTML, 365, today()) {
            assert!(!concert.artist().is_empty());
            assert!(!concert.location().is_empty());
        }
    }

    #[test]
    fn first_matching_strategy_wins() {
        let html = r#"
        <div class="concert-listing">
            <span class="artist">Broken Listing</span>
        </div>
        <div class="event-card">
            <h3>Would Match Later</h3>
            <span class="venue">Docks</span>
            <span class="date">2025-03-05</span>
        </div>
        "#;
        let document = Html::parse_document(html);
        let (strategy, found) = select_candidates(&document).expect("a strategy matches");
        assert_eq!(strategy.name, "concert listing");
        assert_eq!(found.len(), 1);
        assert!(extract(&document, 30, today()).is_empty());
    }

    #[test]
    fn falls_back_to_generic_event_blocks() {
        let html = r#"
        <div class="event-card">
            <h3>Kraftklub</h3>
            <span class="venue">Große Freiheit 36</span>
            <span class="event-date">Wed, 05 Mar 2025</span>
        </div>
        "#;
        let concerts = extract_html(html, 30, today());
        assert_eq!(concerts.len(), 1);
        assert_eq!(concerts[0].artist(), "Kraftklub");
        assert_eq!(concerts[0].location(), "Große Freiheit 36");
        assert_eq!(concerts[0].date_key(), "2025-03-05");
    }

    #[test]
    fn unparseable_text_falls_back_to_datetime_attribute() {
        let html = r#"
        <li class="event-listings-element">
            <time datetime="2025-03-07">Tonight-ish</time>
            <span class="artist">Tocotronic</span>
            <span class="venue">Uebel &amp; Gefährlich</span>
        </li>
        "#;
        let concerts = extract_html(html, 30, today());
        assert_eq!(concerts.len(), 1);
        assert_eq!(concerts[0].date_key(), "2025-03-07");
        assert_eq!(concerts[0].location(), "Uebel & Gefährlich");
    }

    #[test]
    fn window_boundaries_are_inclusive() {
        let listing = |date: &str, artist: &str| {
            format!(
                r#"<li class="event-listings-element"><span class="date">{date}</span><span class="artist">{artist}</span><span class="venue">Docks</span></li>"#
            )
        };
        let html = [
            listing("2025-02-28", "Yesterday"),
            listing("2025-03-01", "Today"),
            listing("2025-03-31", "Last Day"),
            listing("2025-04-01", "Too Late"),
        ]
        .join("\n");

        let concerts = extract_html(&format!("<ul>{html}</ul>"), 30, today());
        let artists: Vec<_> = concerts.iter().map(|c| c.artist()).collect();
        assert_eq!(artists, vec!["Today", "Last Day"]);
    }

    #[test]
    fn empty_page_yields_nothing() {
        let html = "<html><body><p>Nothing here</p></body></html>";
        assert!(extract_html(html, 30, today()).is_empty());
    }
}
