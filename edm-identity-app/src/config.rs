//! Application configuration.
//!
//! Every section is optional; an empty file yields an in-memory catalog,
//! the stock provider profile and the system resolver.
//!
//! ```toml
//! [storage]
//! path = "/var/lib/edm/catalog.json"
//!
//! [provider]
//! spf_include = "_spf.edm-gateway.com"
//! mx_host = "edm-gateway.com"
//!
//! [checker]
//! nameserver = "1.1.1.1"
//! timeout_secs = 5
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use edm_identity_checker::CheckerConfig;
use edm_identity_core::error::{CoreError, CoreResult};
use edm_identity_core::types::ProviderProfile;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub provider: ProviderProfile,
    pub checker: CheckerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Snapshot file; `None` keeps the catalog in memory only
    pub path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> CoreResult<Self> {
        toml::from_str(raw).map_err(|e| CoreError::ConfigError(e.to_string()))
    }

    /// Read and parse the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::ConfigError(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&raw)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
