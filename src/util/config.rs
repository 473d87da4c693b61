//! Runtime settings: built-in defaults, an optional `settings.json` in the
//! platform config directory, then `FREIGHT_*` environment overrides.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "FreightQuote";
const APP_NAME: &str = "FreightQuote";
const SETTINGS_FILENAME: &str = "settings.json";

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets/";
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{name} must be a whole number, got `{value}`")]
    InvalidNumber { name: &'static str, value: String },
}

/// Spreadsheet ids for each reference table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetIds {
    pub zone_chart: Option<String>,
    pub ups_rates: Option<String>,
    pub dhl_rates: Option<String>,
    pub fedex_rates: Option<String>,
    pub fsc: Option<String>,
    pub interior_delivery: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub sheet_ids: SheetIds,
    pub cache_ttl_minutes: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            sheet_ids: SheetIds::default(),
            cache_ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Defaults, then the settings file if present, then the process
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = match settings_file() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        settings.apply_overrides(|name| env::var(name).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `FREIGHT_*` overrides looked up through `lookup`. Blank values
    /// are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = get("FREIGHT_SHEETS_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = get("FREIGHT_SHEETS_BASE_URL") {
            self.base_url = url;
        }

        let ids = &mut self.sheet_ids;
        for (name, slot) in [
            ("FREIGHT_ZONE_CHART_SHEET_ID", &mut ids.zone_chart),
            ("FREIGHT_UPS_RATES_SHEET_ID", &mut ids.ups_rates),
            ("FREIGHT_DHL_RATES_SHEET_ID", &mut ids.dhl_rates),
            ("FREIGHT_FEDEX_RATES_SHEET_ID", &mut ids.fedex_rates),
            ("FREIGHT_FSC_SHEET_ID", &mut ids.fsc),
            ("FREIGHT_INTERIOR_DELIVERY_SHEET_ID", &mut ids.interior_delivery),
        ] {
            if let Some(value) = get(name) {
                *slot = Some(value);
            }
        }

        for (name, slot) in [
            ("FREIGHT_CACHE_TTL_MINUTES", &mut self.cache_ttl_minutes),
            ("FREIGHT_REQUEST_TIMEOUT_SECS", &mut self.request_timeout_secs),
        ] {
            if let Some(value) = get(name) {
                *slot = value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber { name, value })?;
            }
        }

        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_minutes.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Location of `settings.json`, if the platform exposes a config directory.
pub fn settings_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILENAME))
}
