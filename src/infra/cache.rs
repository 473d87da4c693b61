//! Persistent on-disk caching of the reference tables with a TTL.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::TableSnapshot;

const CACHE_DIR: &str = "freight-quote";
const CACHE_FILENAME: &str = "tables_cache.json";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// A table snapshot together with when it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotCache {
    /// Unix timestamp (seconds) when this cache was created.
    pub cached_at: u64,
    pub snapshot: TableSnapshot,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl SnapshotCache {
    pub fn new(snapshot: TableSnapshot) -> Self {
        Self {
            cached_at: unix_now(),
            snapshot,
        }
    }

    pub fn age(&self) -> Duration {
        Duration::from_secs(unix_now().saturating_sub(self.cached_at))
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        let secs = self.age().as_secs();
        if secs < 60 {
            format!("{secs}s")
        } else if secs < 3600 {
            format!("{}m", secs / 60)
        } else if secs < 86400 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}d", secs / 86400)
        }
    }
}

/// Default cache file in the local data directory.
pub fn cache_path() -> PathBuf {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CACHE_DIR)
            .join(CACHE_FILENAME)
    })
    .clone()
}

/// Load a cached snapshot from `path` if one exists and is younger than `ttl`.
pub fn load_snapshot_cache(path: &Path, ttl: Duration) -> Option<SnapshotCache> {
    if !path.exists() {
        debug!(path = %path.display(), "no table cache");
        return None;
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read table cache");
            return None;
        }
    };

    match serde_json::from_str::<SnapshotCache>(&content) {
        Ok(cache) if cache.is_expired(ttl) => {
            info!(age = %cache.age_string(), "table cache expired");
            None
        }
        Ok(cache) => {
            info!(age = %cache.age_string(), "using cached reference tables");
            Some(cache)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse table cache");
            None
        }
    }
}

/// Write `cache` to `path`, creating the parent directory when needed.
pub fn save_snapshot_cache(path: &Path, cache: &SnapshotCache) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string(cache)?;
    fs::write(path, content)?;
    info!(path = %path.display(), "saved reference tables to cache");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::mock;
    use pretty_assertions::assert_eq;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn saved_snapshot_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CACHE_FILENAME);

        save_snapshot_cache(&path, &SnapshotCache::new(mock::snapshot())).unwrap();
        let loaded = load_snapshot_cache(&path, HOUR).unwrap();

        assert_eq!(loaded.snapshot, mock::snapshot());
    }

    #[test]
    fn expired_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CACHE_FILENAME);
        let mut cache = SnapshotCache::new(mock::snapshot());
        cache.cached_at -= 2 * 3600;

        save_snapshot_cache(&path, &cache).unwrap();
        assert!(load_snapshot_cache(&path, HOUR).is_none());
        assert_eq!(cache.age_string(), "2h");
    }

    #[test]
    fn corrupt_or_missing_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CACHE_FILENAME);
        assert!(load_snapshot_cache(&path, HOUR).is_none());

        fs::write(&path, "{\"cached_at\": 1").unwrap();
        assert!(load_snapshot_cache(&path, HOUR).is_none());
    }
}
