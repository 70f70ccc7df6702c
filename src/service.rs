use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tracing::{error, info};

use crate::config::AppConfig;
use crate::filter::filter_concerts;
use crate::models::{Concert, ConcertCatalog, FilterCriteria};
use crate::scraping::ConcertScraper;
use crate::store::ConcertStore;

/// Entry point for callers: serves the cached catalog while it is fresh
/// and refreshes it from the sources otherwise.
///
/// Refreshes are single-flight per service. A caller that waited on another
/// caller's refresh re-checks freshness before scraping again.
pub struct ConcertService {
    store: ConcertStore,
    scraper: ConcertScraper,
    max_age: Duration,
    refresh_lock: Mutex<()>,
}

impl ConcertService {
    pub fn new(store: ConcertStore, scraper: ConcertScraper, max_age: Duration) -> Self {
        Self {
            store,
            scraper,
            max_age,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ConcertStore::new(config.cache_path.clone()),
            ConcertScraper::from_config(config),
            config.max_age(),
        )
    }

    pub fn store(&self) -> &ConcertStore {
        &self.store
    }

    pub fn scraper(&self) -> &ConcertScraper {
        &self.scraper
    }

    /// Never fails. An empty result means either no concerts or no data;
    /// compare with [`ConcertService::catalog`] to tell them apart.
    pub fn get_concerts(&self, within_days: u32, force_refresh: bool) -> Vec<Concert> {
        if !force_refresh && !self.store.is_stale(self.max_age) {
            info!("using cached concerts");
            return self.store.load().concerts;
        }

        let _guard = self.lock_refresh();
        if !force_refresh && !self.store.is_stale(self.max_age) {
            info!("cache refreshed by a concurrent caller");
            return self.store.load().concerts;
        }

        info!(within_days, force_refresh, "refreshing concerts from sources");
        let concerts = self.scraper.scrape(within_days);
        if concerts.is_empty() {
            info!("scrape returned nothing, keeping existing cache");
        } else if let Err(err) = self.store.save(&concerts) {
            error!(error = %err, "failed to persist scraped concerts");
        }
        concerts
    }

    pub fn query(
        &self,
        within_days: u32,
        force_refresh: bool,
        criteria: &FilterCriteria,
    ) -> Vec<Concert> {
        filter_concerts(&self.get_concerts(within_days, force_refresh), criteria)
    }

    /// The persisted catalog as it currently is on disk.
    pub fn catalog(&self) -> ConcertCatalog {
        self.store.load()
    }

    fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.refresh_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
