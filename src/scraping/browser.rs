use std::thread;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions};
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{AppConfig, Renderer};

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("browser launch failed: {0}")]
    Launch(String),
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("script evaluation failed: {0}")]
    Script(String),
    #[error("unable to read rendered page: {0}")]
    Content(String),
    #[error("http error for {url}: {reason}")]
    Http { url: String, reason: String },
}

/// Loads a URL and hands back the HTML that extraction should run over.
pub trait PageFetcher: Send + Sync {
    fn name(&self) -> &'static str;
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

pub fn fetcher_for(config: &AppConfig) -> Box<dyn PageFetcher> {
    match config.renderer {
        Renderer::Browser => Box::new(HeadlessFetcher::from_config(config)),
        Renderer::Http => Box::new(HttpFetcher::new(config.navigation_timeout())),
    }
}

/// Drives headless Chrome: navigate, let scripts settle, scroll to the
/// bottom for lazy-loaded rows, settle again, then read the DOM.
#[derive(Debug, Clone)]
pub struct HeadlessFetcher {
    headless: bool,
    navigation_timeout: Duration,
    initial_settle: Duration,
    scroll_settle: Duration,
}

impl HeadlessFetcher {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            headless: config.headless,
            navigation_timeout: config.navigation_timeout(),
            initial_settle: config.initial_settle(),
            scroll_settle: config.scroll_settle(),
        }
    }

    fn launch(&self) -> Result<Browser, FetchError> {
        let options = LaunchOptions::default_builder()
            .headless(self.headless)
            .idle_browser_timeout(
                self.navigation_timeout + self.initial_settle + self.scroll_settle,
            )
            .build()
            .map_err(|err| FetchError::Launch(err.to_string()))?;
        Browser::new(options).map_err(|err| FetchError::Launch(err.to_string()))
    }
}

impl PageFetcher for HeadlessFetcher {
    fn name(&self) -> &'static str {
        "browser"
    }

    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        // Dropping `browser` kills the Chrome process, so every early
        // return below releases it as well.
        let browser = self.launch()?;
        let navigation = |err: anyhow::Error| FetchError::Navigation {
            url: url.to_string(),
            reason: err.to_string(),
        };

        let tab = browser.new_tab().map_err(navigation)?;
        tab.set_default_timeout(self.navigation_timeout);
        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(navigation)?;
        debug!(url, "page navigated, waiting for scripts");

        thread::sleep(self.initial_settle);
        tab.evaluate(SCROLL_TO_BOTTOM, false)
            .map_err(|err| FetchError::Script(err.to_string()))?;
        thread::sleep(self.scroll_settle);

        let html = tab
            .get_content()
            .map_err(|err| FetchError::Content(err.to_string()))?;
        info!(url, bytes = html.len(), "rendered page fetched");
        Ok(html)
    }
}

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("ConcertScrape/0.1")
        .build()
        .expect("http client")
});

/// Plain GET without script execution, for listing pages that render
/// server side.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl PageFetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let http = |err: reqwest::Error| FetchError::Http {
            url: url.to_string(),
            reason: err.to_string(),
        };
        let response = CLIENT
            .get(url)
            .timeout(self.timeout)
            .send()
            .map_err(http)?
            .error_for_status()
            .map_err(http)?;
        let html = response.text().map_err(http)?;
        info!(url, bytes = html.len(), "page fetched");
        Ok(html)
    }
}
