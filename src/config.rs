//! Server configuration.
//!
//! Settings are read once from the environment when the binary starts:
//!
//! * `MOWER_ROI_BIND_ADDR` - listen address, default `127.0.0.1:3000`
//! * `MOWER_ROI_CATALOG` - optional path to an equipment catalog JSON
//!   file; without it the built-in catalog is used

use std::path::PathBuf;

pub const BIND_ADDR_VAR: &str = "MOWER_ROI_BIND_ADDR";
pub const CATALOG_VAR: &str = "MOWER_ROI_CATALOG";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub catalog_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            catalog_path: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            bind_addr: get(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            catalog_path: get(CATALOG_VAR).map(PathBuf::from),
        }
    }
}
