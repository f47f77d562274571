//! Runtime configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), else the override in the data dir
//!    (~/.local/share/bitescan/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Values present in a file are applied over the built-in defaults, so an
//! override file only needs the keys it changes. `BITESCAN_SYNC_URL` replaces
//! the sync endpoint after the file is applied.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::categories::ShelfLife;
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/bitescan.toml");

/// Environment variable overriding the sync endpoint
pub const SYNC_URL_ENV: &str = "BITESCAN_SYNC_URL";

/// Longest shelf life a config file may set
pub const MAX_SHELF_LIFE_DAYS: i64 = 36_500;

/// How the sync service decides whether the network is reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityMode {
    /// Always attempt the fetch
    #[default]
    AssumeOnline,
    /// Probe the endpoint with a short request first
    HttpProbe,
}

impl ConnectivityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssumeOnline => "assume_online",
            Self::HttpProbe => "http_probe",
        }
    }
}

impl std::str::FromStr for ConnectivityMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "assume_online" => Ok(Self::AssumeOnline),
            "http_probe" => Ok(Self::HttpProbe),
            _ => Err(format!("Unknown connectivity mode: {}", s)),
        }
    }
}

impl std::fmt::Display for ConnectivityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remote receipt sync settings
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub endpoint: String,
    pub connect_timeout: Duration,
    /// Upper bound for the whole request, including reading the body
    pub read_timeout: Duration,
    pub connectivity: ConnectivityMode,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/receipts".to_string(),
            connect_timeout: Duration::from_secs(15),
            read_timeout: Duration::from_secs(90),
            connectivity: ConnectivityMode::AssumeOnline,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub shelf_life: ShelfLife,
    pub sync: SyncConfig,
    /// File the config was read from, `None` for embedded defaults
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load configuration (explicit path, then data dir override, then defaults)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (content, source) = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::NotFound(format!(
                        "Config file {}",
                        path.display()
                    )));
                }
                (fs::read_to_string(path)?, Some(path.to_path_buf()))
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(default_path) => (fs::read_to_string(&default_path)?, Some(default_path)),
                None => (DEFAULT_CONFIG.to_string(), None),
            },
        };

        let mut config = parse_config(&content)?;
        config.source = source;
        config.apply_env();
        Ok(config)
    }

    /// Embedded defaults only, ignoring override files and the environment
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(SYNC_URL_ENV) {
            if !url.trim().is_empty() {
                self.sync.endpoint = url.trim().to_string();
            }
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("bitescan").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    shelf_life: Option<RawShelfLife>,
    sync: Option<RawSync>,
}

#[derive(Debug, Deserialize)]
struct RawShelfLife {
    default: Option<i64>,
    categories: Option<HashMap<String, i64>>,
}

#[derive(Debug, Deserialize)]
struct RawSync {
    endpoint: Option<String>,
    connect_timeout_secs: Option<u64>,
    read_timeout_secs: Option<u64>,
    connectivity: Option<String>,
}

/// Parse config from TOML content, applied over built-in defaults
/// Shelf life must be between 0 days and a century
fn checked_shelf_days(category: &str, days: i64) -> Result<i64> {
    if !(0..=MAX_SHELF_LIFE_DAYS).contains(&days) {
        return Err(Error::InvalidData(format!(
            "Shelf life for {} must be 0..={} days, got {}",
            category, MAX_SHELF_LIFE_DAYS, days
        )));
    }
    Ok(days)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)?;
    let mut config = Config::default();

    if let Some(shelf_life) = raw.shelf_life {
        if let Some(days) = shelf_life.default {
            config.shelf_life.default_days = checked_shelf_days("default", days)?;
        }
        for (category, days) in shelf_life.categories.unwrap_or_default() {
            let days = checked_shelf_days(&category, days)?;
            config.shelf_life.set(&category, days);
        }
    }

    if let Some(sync) = raw.sync {
        if let Some(endpoint) = sync.endpoint {
            config.sync.endpoint = endpoint;
        }
        if let Some(secs) = sync.connect_timeout_secs {
            config.sync.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = sync.read_timeout_secs {
            config.sync.read_timeout = Duration::from_secs(secs);
        }
        if let Some(mode) = sync.connectivity {
            config.sync.connectivity = mode.parse().map_err(Error::InvalidData)?;
        }
    }

    Ok(config)
}
