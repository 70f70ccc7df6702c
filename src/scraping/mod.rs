pub mod allevents;
pub mod base;
pub mod browser;
pub mod dates;
pub mod extractor;
pub mod songkick;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::models::Concert;

pub trait ConcertSource: Send + Sync {
    fn source_id(&self) -> &'static str;
    fn source_name(&self) -> &'static str;
    fn source_url(&self) -> &str;
    fn fetch(&self, within_days: u32, today: NaiveDate) -> anyhow::Result<Vec<Concert>>;
}

#[derive(Clone, Debug, Serialize)]
pub struct SourceInfo {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SourceFailure {
    pub source_id: String,
    pub error: String,
}

/// Outcome of one scrape across all sources. Failed sources contribute no
/// concerts and are listed in `failures`.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    pub concerts: Vec<Concert>,
    pub failures: Vec<SourceFailure>,
}

pub struct ConcertScraper {
    sources: Vec<Box<dyn ConcertSource>>,
    timezone: Tz,
}

impl ConcertScraper {
    pub fn new(sources: Vec<Box<dyn ConcertSource>>, timezone: Tz) -> Self {
        Self { sources, timezone }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let sources: Vec<Box<dyn ConcertSource>> = vec![
            Box::new(songkick::Songkick::new(
                config.source_url.clone(),
                browser::fetcher_for(config),
            )),
            Box::new(allevents::AllEvents),
        ];
        Self::new(sources, config.tz())
    }

    pub fn list_sources(&self) -> Vec<SourceInfo> {
        self.sources
            .iter()
            .map(|source| SourceInfo {
                id: source.source_id().to_string(),
                name: source.source_name().to_string(),
                url: source.source_url().to_string(),
            })
            .collect()
    }

    /// Best effort: any failure shows up as fewer (possibly zero) concerts.
    pub fn scrape(&self, within_days: u32) -> Vec<Concert> {
        self.scrape_report(within_days).concerts
    }

    pub fn scrape_report(&self, within_days: u32) -> ScrapeReport {
        let today = Utc::now().with_timezone(&self.timezone).date_naive();
        self.scrape_on(within_days, today)
    }

    pub fn scrape_on(&self, within_days: u32, today: NaiveDate) -> ScrapeReport {
        let mut report = ScrapeReport::default();

        for source in &self.sources {
            let source_id = source.source_id();
            match source.fetch(within_days, today) {
                Ok(mut scraped) => {
                    info!(source = source_id, count = scraped.len(), "source scraped");
                    report.concerts.append(&mut scraped);
                }
                Err(err) => {
                    warn!(source = source_id, error = %err, "source scrape failed");
                    report.failures.push(SourceFailure {
                        source_id: source_id.to_string(),
                        error: format!("{err:#}"),
                    });
                }
            }
        }

        info!(
            total = report.concerts.len(),
            failed_sources = report.failures.len(),
            "scrape finished"
        );
        report
    }
}
