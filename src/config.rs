//! Runtime settings read from the environment, with defaults for local use.

use std::env;
use std::path::PathBuf;

use crate::data::catalog::DEFAULT_CATALOG_DIR;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5006";

pub const BIND_ENV: &str = "SWARM_CATALOG_BIND";
pub const CATALOG_DIR_ENV: &str = "SWARM_CATALOG_DIR";
pub const LENIENT_ENV: &str = "SWARM_CATALOG_LENIENT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub catalog_dir: PathBuf,
    /// Skip bad record files at startup instead of refusing to serve.
    pub lenient_load: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            catalog_dir: PathBuf::from(DEFAULT_CATALOG_DIR),
            lenient_load: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            bind_addr: non_empty(BIND_ENV).unwrap_or(defaults.bind_addr),
            catalog_dir: non_empty(CATALOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.catalog_dir),
            lenient_load: non_empty(LENIENT_ENV)
                .map(|value| parse_flag(&value))
                .unwrap_or(defaults.lenient_load),
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
