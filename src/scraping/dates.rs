//! Free-text date normalization.
//!
//! Strict formats are tried in order first. When none of them accept the
//! whole input, a permissive pass strips weekday names, ordinals and time
//! suffixes, translates German month names and retries a wider set of
//! layouts. Nothing here returns an error; unparseable text is `None`.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::base::clean_text;

const STRICT_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%d.%m.%Y",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%d %B %Y",
    "%a, %d %b %Y",
];

const LOOSE_FORMATS: [&str; 12] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d.%m.%y",
    "%d-%m-%Y",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%B %d %Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%d %B, %Y",
    "%Y %B %d",
];

const YEARLESS_FORMATS: [&str; 3] = ["%B %d", "%d %B", "%d.%m."];

static ISO_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})[T ]").expect("iso prefix regex"));
static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(mon|tue|tues|wed|thu|thur|thurs|fri|sat|sun)(day|nesday|urday|sday|rsday)?\b\.?,?",
    )
    .expect("weekday regex")
});
static GERMAN_WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(montag|dienstag|mittwoch|donnerstag|freitag|samstag|sonntag|mo|di|mi|do|fr|sa|so)\b\.?,?",
    )
    .expect("german weekday regex")
});
static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("ordinal regex"));
static DAY_DOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})\.\s+([A-Za-z])").expect("day dot regex"));
static TIME_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(,|\bat\b|\bum\b)?\s*\d{1,2}:\d{2}(\s*(am|pm|uhr))?.*$")
        .expect("time suffix regex")
});
static GERMAN_MONTHS: [(&str, &str); 22] = [
    ("januar", "January"),
    ("jan", "January"),
    ("februar", "February"),
    ("feb", "February"),
    ("märz", "March"),
    ("maerz", "March"),
    ("mär", "March"),
    ("mrz", "March"),
    ("apr", "April"),
    ("mai", "May"),
    ("juni", "June"),
    ("jun", "June"),
    ("juli", "July"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("sept", "September"),
    ("oktober", "October"),
    ("okt", "October"),
    ("nov", "November"),
    ("dezember", "December"),
    ("dez", "December"),
];

/// Listing text often trails the date with a venue or price after one of these.
const TRAILER_SEPARATORS: [&str; 3] = ["·", "|", " - "];

/// Parses free-form listing text into a calendar date. `today` resolves
/// year-less inputs to their next occurrence on or after that day.
pub fn parse_date_on(text: Option<&str>, today: NaiveDate) -> Option<NaiveDate> {
    let cleaned = clean_text(text?);
    if cleaned.is_empty() {
        return None;
    }
    parse_strict(&cleaned)
        .or_else(|| parse_permissive(&cleaned, today))
        .or_else(|| {
            let head = leading_segment(&cleaned)?;
            parse_strict(head).or_else(|| parse_permissive(head, today))
        })
}

/// Text before the first trailer separator, when there is one.
fn leading_segment(text: &str) -> Option<&str> {
    let cut = TRAILER_SEPARATORS
        .iter()
        .filter_map(|sep| text.find(sep))
        .min()?;
    let head = text[..cut].trim();
    if head.is_empty() {
        None
    } else {
        Some(head)
    }
}

fn parse_strict(text: &str) -> Option<NaiveDate> {
    STRICT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn parse_permissive(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M%z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.date_naive());
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    if let Some(caps) = ISO_PREFIX_RE.captures(text) {
        if let Ok(date) = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d") {
            return Some(date);
        }
    }

    let simplified = simplify(text);
    if simplified.is_empty() || !simplified.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    if let Some(date) = LOOSE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&simplified, fmt).ok())
    {
        return Some(date);
    }

    YEARLESS_FORMATS
        .iter()
        .find_map(|fmt| parse_yearless(&simplified, fmt, today))
}

fn simplify(text: &str) -> String {
    let mut value = text.to_string();
    value = TIME_SUFFIX_RE.replace(&value, "").to_string();
    value = WEEKDAY_RE.replace_all(&value, " ").to_string();
    value = GERMAN_WEEKDAY_RE.replace_all(&value, " ").to_string();
    value = ORDINAL_RE.replace_all(&value, "$1").to_string();
    value = DAY_DOT_RE.replace_all(&value, "$1 $2").to_string();
    value = translate_months(&value);
    clean_text(value.trim_matches(|c: char| c == ',' || c == '-' || c.is_whitespace()))
}

fn translate_months(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let lowered = word.trim_end_matches(['.', ',']).to_lowercase();
            GERMAN_MONTHS
                .iter()
                .find(|(german, _)| *german == lowered)
                .map(|(_, english)| {
                    let suffix = if word.ends_with(',') { "," } else { "" };
                    format!("{english}{suffix}")
                })
                .unwrap_or_else(|| word.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Chrono needs a year to build a date, so one is appended before parsing.
fn parse_yearless(text: &str, fmt: &str, today: NaiveDate) -> Option<NaiveDate> {
    let year = today.year();
    let with_year = format!("{text} {year}");
    let date = NaiveDate::parse_from_str(&with_year, &format!("{fmt} %Y")).ok()?;
    if date < today {
        date.with_year(year + 1)
    } else {
        Some(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        ymd(2025, 3, 1)
    }

    fn parse(text: &str) -> Option<NaiveDate> {
        parse_date_on(Some(text), today())
    }

    #[test]
    fn strict_formats_agree() {
        let expected = ymd(2025, 3, 5);
        for text in [
            "2025-03-05",
            "05.03.2025",
            "03/05/2025",
            "March 05, 2025",
            "5 March 2025",
            "Wed, 05 Mar 2025",
        ] {
            assert_eq!(parse(text), Some(expected), "input {text:?}");
        }
    }

    #[test]
    fn strict_formats_agree_across_a_year() {
        let mut date = ymd(2024, 1, 1);
        while date < ymd(2025, 1, 1) {
            let iso = date.format("%Y-%m-%d").to_string();
            let dotted = date.format("%d.%m.%Y").to_string();
            let us = date.format("%m/%d/%Y").to_string();
            assert_eq!(parse(&iso), Some(date));
            assert_eq!(parse(&dotted), Some(date));
            assert_eq!(parse(&us), Some(date));
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn empty_and_garbage_are_none() {
        assert_eq!(parse_date_on(None, today()), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
        assert_eq!(parse("not a date"), None);
        assert_eq!(parse("Tickets"), None);
        assert_eq!(parse("31.02.2025"), None);
    }

    #[test]
    fn falls_back_on_datetime_attributes() {
        assert_eq!(parse("2025-03-05T20:00:00+0100"), Some(ymd(2025, 3, 5)));
        assert_eq!(parse("2025-03-05T20:00:00+01:00"), Some(ymd(2025, 3, 5)));
        assert_eq!(parse("2025-03-05T20:00:00"), Some(ymd(2025, 3, 5)));
    }

    #[test]
    fn falls_back_on_loose_layouts() {
        assert_eq!(parse("Saturday 15 March 2025"), Some(ymd(2025, 3, 15)));
        assert_eq!(parse("March 15th, 2025"), Some(ymd(2025, 3, 15)));
        assert_eq!(parse("Sat, 15 Mar 2025 20:00"), Some(ymd(2025, 3, 15)));
        assert_eq!(parse("2025/03/15"), Some(ymd(2025, 3, 15)));
    }

    #[test]
    fn understands_german_months() {
        assert_eq!(parse("5. März 2025"), Some(ymd(2025, 3, 5)));
        assert_eq!(parse("Sa., 15. März 2025"), Some(ymd(2025, 3, 15)));
        assert_eq!(parse("1. Oktober 2025"), Some(ymd(2025, 10, 1)));
        assert_eq!(parse("5. Mär 2025"), Some(ymd(2025, 3, 5)));
        assert_eq!(parse("5. Mrz. 2025"), Some(ymd(2025, 3, 5)));
        assert_eq!(parse("Okt 3 2025"), Some(ymd(2025, 10, 3)));
        assert_eq!(parse("24. Dez 2025"), Some(ymd(2025, 12, 24)));
        assert_eq!(parse("Do., 06.03.2025"), Some(ymd(2025, 3, 6)));
    }

    #[test]
    fn ignores_trailing_listing_text() {
        assert_eq!(parse("11 Mar 2025 · Docks"), Some(ymd(2025, 3, 11)));
        assert_eq!(parse("5. Mär 2025 | ab 35 €"), Some(ymd(2025, 3, 5)));
        assert_eq!(parse("2025-03-20 - Große Freiheit 36"), Some(ymd(2025, 3, 20)));
        assert_eq!(parse("Docks · Hamburg"), None);
    }

    #[test]
    fn yearless_dates_roll_forward() {
        assert_eq!(parse("Mar 15"), Some(ymd(2025, 3, 15)));
        assert_eq!(parse("15 Feb"), Some(ymd(2026, 2, 15)));
        assert_eq!(parse("Friday 7 March"), Some(ymd(2025, 3, 7)));
    }
}
