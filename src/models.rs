use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single concert listing. Only built through [`Concert::new`], which
/// refuses blank artist or venue text.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "ConcertRecord")]
pub struct Concert {
    date: NaiveDate,
    artist: String,
    location: String,
}

#[derive(Deserialize)]
struct ConcertRecord {
    date: NaiveDate,
    artist: String,
    location: String,
}

impl TryFrom<ConcertRecord> for Concert {
    type Error = String;

    fn try_from(record: ConcertRecord) -> Result<Self, Self::Error> {
        Concert::new(record.date, &record.artist, &record.location)
            .ok_or_else(|| format!("concert on {} has a blank artist or location", record.date))
    }
}

impl Concert {
    pub fn new(date: NaiveDate, artist: &str, location: &str) -> Option<Self> {
        let artist = artist.trim();
        let location = location.trim();
        if artist.is_empty() || location.is_empty() {
            return None;
        }
        Some(Self {
            date,
            artist: artist.to_string(),
            location: location.to_string(),
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Zero-padded `YYYY-MM-DD`, the stored form.
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// The persisted snapshot: every concert from the last successful scrape
/// plus when that scrape ran.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ConcertCatalog {
    #[serde(default)]
    pub last_updated: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub concerts: Vec<Concert>,
}

impl ConcertCatalog {
    pub fn is_empty(&self) -> bool {
        self.concerts.is_empty()
    }
}

/// Query-time criteria. Every field is optional and the active ones are
/// AND-combined.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct FilterCriteria {
    pub artist: Option<String>,
    pub venue: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}
