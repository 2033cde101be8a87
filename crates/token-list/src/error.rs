use thiserror::Error;

/// Unified error type for the token list library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors raised by key/value store backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Errors while loading registry configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no network ids configured")]
    NoNetworks,

    #[error("invalid storage key prefix: {0}")]
    InvalidStorageKeyPrefix(String),

    #[error("no storage directory configured and no platform config directory")]
    NoStorageDir,
}
