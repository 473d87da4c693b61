//! Produces the table snapshot for a session: disk cache, remote sheets or
//! the embedded mock tables.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::domain::TableSnapshot;
use crate::infra::cache::{self, SnapshotCache};
use crate::infra::mock;
use crate::infra::sheets::{LoadReport, SheetsClient, TableSource};
use crate::util::config::Settings;

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// Skip the disk cache and fetch fresh tables.
    pub refresh: bool,
    /// Never touch the network; use the embedded tables.
    pub offline: bool,
    /// Override the cache location (defaults to the local data directory).
    pub cache_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct LoadedTables {
    pub snapshot: TableSnapshot,
    pub report: LoadReport,
}

/// Load the reference tables. Never fails: anything that cannot be read
/// remotely is replaced by mock data.
pub async fn load_tables(settings: &Settings, options: &LoadOptions) -> LoadedTables {
    if options.offline {
        info!("offline mode, using embedded tables");
        return LoadedTables {
            snapshot: mock::snapshot(),
            report: LoadReport::uniform(TableSource::Mock),
        };
    }

    let cache_path = options.cache_path.clone().unwrap_or_else(cache::cache_path);

    if !options.refresh {
        if let Some(cached) = cache::load_snapshot_cache(&cache_path, settings.cache_ttl()) {
            return LoadedTables {
                snapshot: cached.snapshot,
                report: LoadReport::uniform(TableSource::Cached),
            };
        }
    }

    let (snapshot, report) = match SheetsClient::new(settings) {
        Ok(client) => client.load_snapshot().await,
        Err(error) => {
            warn!(%error, "cannot build sheets client, using embedded tables");
            (mock::snapshot(), LoadReport::uniform(TableSource::Mock))
        }
    };

    if report.is_live() {
        if let Err(error) =
            cache::save_snapshot_cache(&cache_path, &SnapshotCache::new(snapshot.clone()))
        {
            warn!(%error, "failed to save table cache");
        }
    }

    LoadedTables { snapshot, report }
}
