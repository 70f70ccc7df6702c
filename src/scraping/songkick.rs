use anyhow::Result;
use chrono::NaiveDate;
use scraper::Html;
use tracing::info;

use super::browser::PageFetcher;
use super::extractor;
use super::ConcertSource;
use crate::models::Concert;

const SOURCE_ID: &str = "songkick";
const SOURCE_NAME: &str = "Songkick";

/// Songkick metro-area calendar. The page fills in listings with
/// JavaScript, so it normally runs behind the headless fetcher.
pub struct Songkick {
    url: String,
    fetcher: Box<dyn PageFetcher>,
}

impl Songkick {
    pub fn new(url: impl Into<String>, fetcher: Box<dyn PageFetcher>) -> Self {
        Self {
            url: url.into(),
            fetcher,
        }
    }
}

impl ConcertSource for Songkick {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn source_url(&self) -> &str {
        &self.url
    }

    fn fetch(&self, within_days: u32, today: NaiveDate) -> Result<Vec<Concert>> {
        let html = self.fetcher.fetch(&self.url)?;
        let document = Html::parse_document(&html);
        let concerts = extractor::extract(&document, within_days, today);
        info!(
            source = SOURCE_ID,
            renderer = self.fetcher.name(),
            count = concerts.len(),
            "songkick listings extracted"
        );
        Ok(concerts)
    }
}
