use std::{fs, path::Path, path::PathBuf, str::FromStr, time::Duration};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::utils;

const DEFAULT_SOURCE_URL: &str = "https://www.songkick.com/metro-areas/28498-germany-hamburg";
const DEFAULT_MAX_AGE_HOURS: f64 = 6.0;
const DEFAULT_WITHIN_DAYS: u32 = 30;
const DEFAULT_INITIAL_SETTLE_SECS: u64 = 5;
const DEFAULT_SCROLL_SETTLE_SECS: u64 = 2;
const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Berlin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    /// Headless Chrome, runs the page's scripts before extraction.
    #[default]
    Browser,
    /// Plain HTTP GET of the raw markup.
    Http,
}

impl FromStr for Renderer {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "browser" => Ok(Renderer::Browser),
            "http" => Ok(Renderer::Http),
            other => Err(format!("unknown renderer: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source_url: String,
    pub cache_path: PathBuf,
    pub max_age_hours: f64,
    pub within_days: u32,
    pub initial_settle_secs: u64,
    pub scroll_settle_secs: u64,
    pub navigation_timeout_secs: u64,
    pub headless: bool,
    pub renderer: Renderer,
    pub timezone: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            cache_path: utils::cache_path(),
            max_age_hours: DEFAULT_MAX_AGE_HOURS,
            within_days: DEFAULT_WITHIN_DAYS,
            initial_settle_secs: DEFAULT_INITIAL_SETTLE_SECS,
            scroll_settle_secs: DEFAULT_SCROLL_SETTLE_SECS,
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            headless: true,
            renderer: Renderer::default(),
            timezone: DEFAULT_TIMEZONE.name().to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `config.json` from the data root when present, then applies
    /// `CONCERTS_*` environment overrides.
    pub fn load() -> Self {
        let mut config = read_config(&utils::config_path()).unwrap_or_else(|err| {
            warn!(%err, "ignoring unreadable config file");
            AppConfig::default()
        });
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("CONCERTS_SOURCE_URL") {
            self.source_url = url;
        }
        if let Ok(path) = std::env::var("CONCERTS_CACHE_PATH") {
            self.cache_path = PathBuf::from(path);
        }
        self.max_age_hours = env_parse("CONCERTS_MAX_AGE_HOURS").unwrap_or(self.max_age_hours);
        self.within_days = env_parse("CONCERTS_WITHIN_DAYS").unwrap_or(self.within_days);
        self.initial_settle_secs =
            env_parse("CONCERTS_INITIAL_SETTLE_SECS").unwrap_or(self.initial_settle_secs);
        self.scroll_settle_secs =
            env_parse("CONCERTS_SCROLL_SETTLE_SECS").unwrap_or(self.scroll_settle_secs);
        self.navigation_timeout_secs =
            env_parse("CONCERTS_NAVIGATION_TIMEOUT_SECS").unwrap_or(self.navigation_timeout_secs);
        self.headless = env_parse("CONCERTS_HEADLESS").unwrap_or(self.headless);
        self.renderer = env_parse("CONCERTS_RENDERER").unwrap_or(self.renderer);
        if let Ok(zone) = std::env::var("CONCERTS_TIMEZONE") {
            self.timezone = zone;
        }
    }

    pub fn max_age(&self) -> Duration {
        if self.max_age_hours.is_finite() && self.max_age_hours > 0.0 {
            Duration::from_secs_f64(self.max_age_hours * 3600.0)
        } else {
            Duration::from_secs_f64(DEFAULT_MAX_AGE_HOURS * 3600.0)
        }
    }

    pub fn initial_settle(&self) -> Duration {
        Duration::from_secs(self.initial_settle_secs)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_secs(self.scroll_settle_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn tz(&self) -> Tz {
        self.timezone.parse::<Tz>().unwrap_or_else(|err| {
            warn!(timezone = %self.timezone, %err, "unknown timezone, using default");
            DEFAULT_TIMEZONE
        })
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

fn read_config(path: &Path) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&contents).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"max_age_hours": 12, "renderer": "http"}"#).expect("parse");
        assert_eq!(config.max_age_hours, 12.0);
        assert_eq!(config.renderer, Renderer::Http);
        assert_eq!(config.within_days, DEFAULT_WITHIN_DAYS);
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
        assert!(config.headless);
    }

    #[test]
    fn non_positive_max_age_falls_back() {
        let config = AppConfig {
            max_age_hours: -1.0,
            ..AppConfig::default()
        };
        assert_eq!(config.max_age(), Duration::from_secs(6 * 3600));
    }

    #[test]
    fn unknown_timezone_falls_back() {
        let config = AppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.tz(), chrono_tz::Europe::Berlin);
    }

    struct EnvGuard(&'static [&'static str]);

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for key in self.0 {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn env_overrides_apply_and_bad_values_are_ignored() {
        let _guard = EnvGuard(&[
            "CONCERTS_RENDERER",
            "CONCERTS_WITHIN_DAYS",
            "CONCERTS_MAX_AGE_HOURS",
            "CONCERTS_HEADLESS",
        ]);
        std::env::set_var("CONCERTS_RENDERER", "http");
        std::env::set_var("CONCERTS_WITHIN_DAYS", " 14 ");
        std::env::set_var("CONCERTS_MAX_AGE_HOURS", "soon");
        std::env::set_var("CONCERTS_HEADLESS", "maybe");

        let mut config = AppConfig::default();
        config.apply_env();
        assert_eq!(config.renderer, Renderer::Http);
        assert_eq!(config.within_days, 14);
        assert_eq!(config.max_age_hours, DEFAULT_MAX_AGE_HOURS);
        assert!(config.headless);

        std::env::set_var("CONCERTS_RENDERER", "curl");
        let mut config = AppConfig::default();
        config.apply_env();
        assert_eq!(config.renderer, Renderer::Browser);
    }

    #[test]
    fn renderer_from_str() {
        assert_eq!("HTTP".parse::<Renderer>(), Ok(Renderer::Http));
        assert!("curl".parse::<Renderer>().is_err());
    }
}
