//! Registry configuration
//!
//! Loaded from a TOML document such as:
//!
//! ```toml
//! network_ids = [1, 4, 100]
//! storage_key_prefix = "USER_TOKEN_LIST_"
//! storage_dir = "/var/lib/token-list"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::network::{NetworkId, MAINNET, RINKEBY, XDAI};
use crate::storage::{is_safe_key, storage_key, DEFAULT_STORAGE_KEY_PREFIX};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Networks the registry is built for.
    #[serde(default = "default_network_ids")]
    pub network_ids: Vec<NetworkId>,

    /// Prefix of the storage key holding a network's user token list.
    #[serde(default = "default_storage_key_prefix")]
    pub storage_key_prefix: String,

    /// Directory for the file-backed store. Falls back to the platform
    /// config directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
}

fn default_network_ids() -> Vec<NetworkId> {
    vec![MAINNET, RINKEBY, XDAI]
}

fn default_storage_key_prefix() -> String {
    DEFAULT_STORAGE_KEY_PREFIX.to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            network_ids: default_network_ids(),
            storage_key_prefix: default_storage_key_prefix(),
            storage_dir: None,
        }
    }
}

impl RegistryConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: RegistryConfig = toml::from_str(toml)?;
        if config.network_ids.is_empty() {
            return Err(ConfigError::NoNetworks);
        }
        // The prefix becomes part of a file name in the file-backed store.
        if !is_safe_key(&storage_key(&config.storage_key_prefix, 0)) {
            return Err(ConfigError::InvalidStorageKeyPrefix(
                config.storage_key_prefix,
            ));
        }
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;

        tracing::info!(
            path,
            networks = config.network_ids.len(),
            "Loaded token list configuration"
        );

        Ok(config)
    }

    /// Directory used by the file-backed store.
    ///
    /// Returns `None` when no directory is configured and the platform has
    /// no config directory.
    pub fn resolved_storage_dir(&self) -> Option<PathBuf> {
        self.storage_dir.clone().or_else(|| {
            dirs::config_dir().map(|mut p| {
                p.push("token-list");
                p
            })
        })
    }
}
