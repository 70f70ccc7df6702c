mod config;
mod filter;
mod logging;
mod models;
pub mod scraping;
mod service;
mod store;
mod utils;

pub use config::{AppConfig, Renderer};
pub use filter::filter_concerts;
pub use logging::init_logging;
pub use models::{Concert, ConcertCatalog, FilterCriteria};
pub use scraping::{ConcertScraper, ConcertSource, ScrapeReport, SourceFailure, SourceInfo};
pub use service::ConcertService;
pub use store::{ConcertStore, StoreError};
