use std::{fs, io, path::Path, path::PathBuf, time::Duration};

use chrono::{DateTime, FixedOffset, Local};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Concert, ConcertCatalog};
use crate::utils;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// Single-slot JSON file holding the current catalog.
#[derive(Debug, Clone)]
pub struct ConcertStore {
    path: PathBuf,
}

impl ConcertStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Replaces the stored catalog wholesale, stamped with the current time.
    pub fn save(&self, concerts: &[Concert]) -> Result<(), StoreError> {
        self.save_at(concerts, Local::now().fixed_offset())
    }

    pub fn save_at(
        &self,
        concerts: &[Concert],
        now: DateTime<FixedOffset>,
    ) -> Result<(), StoreError> {
        let catalog = ConcertCatalog {
            last_updated: Some(now),
            concerts: concerts.to_vec(),
        };
        let contents =
            serde_json::to_string_pretty(&catalog).map_err(|err| StoreError::Corrupt {
                path: self.path.clone(),
                reason: err.to_string(),
            })?;

        utils::ensure_parent(&self.path);
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, contents)
            .and_then(|_| fs::rename(&staging, &self.path))
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        info!(count = concerts.len(), path = ?self.path, "concerts saved");
        Ok(())
    }

    /// Strict read: `Ok(None)` when nothing has been stored yet.
    pub fn read(&self) -> Result<Option<ConcertCatalog>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|err| StoreError::Corrupt {
                path: self.path.clone(),
                reason: err.to_string(),
            })
    }

    /// Never fails: a missing or unreadable store is an empty catalog.
    pub fn load(&self) -> ConcertCatalog {
        match self.read() {
            Ok(Some(catalog)) => {
                info!(
                    count = catalog.concerts.len(),
                    last_updated = ?catalog.last_updated,
                    "concerts loaded from store"
                );
                catalog
            }
            Ok(None) => ConcertCatalog::default(),
            Err(err) => {
                warn!(error = %err, "treating store as empty");
                ConcertCatalog::default()
            }
        }
    }

    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.is_stale_at(max_age, Local::now().fixed_offset())
    }

    /// True when there is no stored timestamp or it is more than `max_age`
    /// before `now`.
    pub fn is_stale_at(&self, max_age: Duration, now: DateTime<FixedOffset>) -> bool {
        let Some(last_updated) = self.load_quiet().and_then(|c| c.last_updated) else {
            return true;
        };
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return false;
        };
        now.signed_duration_since(last_updated) > max_age
    }

    fn load_quiet(&self) -> Option<ConcertCatalog> {
        self.read().ok().flatten()
    }
}
