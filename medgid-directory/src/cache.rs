//! Flat-file directory cache: slug → providers with a fetch timestamp.
//!
//! The whole map lives in one JSON file, read lazily on every access and
//! rewritten whole on every `put`. Freshness is re-evaluated on each read;
//! stale entries are not returned but stay in the file until overwritten.
//! A missing or unparsable file is an empty cache, not an error.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::DirectoryError;
use crate::record::ProviderRecord;

/// Hours a cached listing stays fresh.
pub const CACHE_TTL_HOURS: i64 = 3;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    time: DateTime<Utc>,
    data: Vec<ProviderRecord>,
}

type CacheFile = HashMap<String, CacheEntry>;

/// Slug-keyed provider cache persisted as one JSON file.
///
/// All file access is serialized behind an internal lock; the per-slug
/// single-flight coordination lives in [`crate::service::DirectoryService`],
/// not here.
pub struct DirectoryCache {
    path: PathBuf,
    file_lock: Mutex<()>,
}

impl DirectoryCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_lock: Mutex::new(()),
        }
    }

    /// Returns the cached providers for `slug` if the entry exists and is
    /// fresh (now − fetched < TTL). Stale or absent entries return `None`.
    pub async fn get(&self, slug: &str) -> Option<Vec<ProviderRecord>> {
        let _guard = self.file_lock.lock().await;
        let map = self.load().await;
        let entry = map.get(slug)?;
        let age = Utc::now().signed_duration_since(entry.time);
        if age < Duration::hours(CACHE_TTL_HOURS) {
            debug!(slug = %slug, providers = entry.data.len(), "Cache hit");
            Some(entry.data.clone())
        } else {
            debug!(slug = %slug, age_hours = age.num_hours(), "Cache entry stale");
            None
        }
    }

    /// Overwrites the entry for `slug` with the current timestamp and rewrites
    /// the whole file.
    pub async fn put(&self, slug: &str, providers: &[ProviderRecord]) -> Result<(), DirectoryError> {
        let _guard = self.file_lock.lock().await;
        let mut map = self.load().await;
        map.insert(
            slug.to_string(),
            CacheEntry {
                time: Utc::now(),
                data: providers.to_vec(),
            },
        );
        let json = serde_json::to_string_pretty(&map)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        tokio::fs::write(&self.path, json).await?;
        debug!(slug = %slug, providers = providers.len(), "Cache entry written");
        Ok(())
    }

    async fn load(&self) -> CacheFile {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Cache file unreadable, treating as empty");
                    CacheFile::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CacheFile::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cache file could not be read, treating as empty");
                CacheFile::new()
            }
        }
    }
}
