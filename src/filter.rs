use crate::models::{Concert, FilterCriteria};

/// Applies every present criterion (AND) and sorts by date, keeping input
/// order for concerts on the same day.
///
/// Artist and venue match as case-insensitive substrings. Date bounds are
/// inclusive and compared against the zero-padded `YYYY-MM-DD` form, so
/// bounds must use that form too.
pub fn filter_concerts(concerts: &[Concert], criteria: &FilterCriteria) -> Vec<Concert> {
    let artist = needle(criteria.artist.as_deref());
    let venue = needle(criteria.venue.as_deref());
    let from_date = bound(criteria.from_date.as_deref());
    let to_date = bound(criteria.to_date.as_deref());

    let mut filtered: Vec<Concert> = concerts
        .iter()
        .filter(|concert| {
            artist
                .as_deref()
                .map_or(true, |n| concert.artist().to_lowercase().contains(n))
        })
        .filter(|concert| {
            venue
                .as_deref()
                .map_or(true, |n| concert.location().to_lowercase().contains(n))
        })
        .filter(|concert| {
            let key = concert.date_key();
            from_date.map_or(true, |from| key.as_str() >= from)
                && to_date.map_or(true, |to| key.as_str() <= to)
        })
        .cloned()
        .collect();

    filtered.sort_by_key(|concert| concert.date());
    filtered
}

fn needle(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_lowercase())
}

fn bound(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
