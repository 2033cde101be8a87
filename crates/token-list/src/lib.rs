pub mod address;
pub mod config;
pub mod error;
pub mod network;
pub mod registry;
pub mod storage;
pub mod subscriptions;
pub mod token;

use error::{ConfigError, Error};

// Re-exports for convenience
pub use config::RegistryConfig;
pub use network::NetworkId;
pub use registry::TokenRegistry;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use subscriptions::{Observable, SubscriptionId, Subscriptions};
pub use token::{BuiltinTokenList, TokenDetails, TokenSource};

/// Open a registry over the built-in token list, persisting user tokens in
/// the configured storage directory.
pub fn open(config: &RegistryConfig) -> Result<TokenRegistry<FileStore>, Error> {
    let dir = config
        .resolved_storage_dir()
        .ok_or(ConfigError::NoStorageDir)?;
    let store = FileStore::new(dir);
    Ok(TokenRegistry::from_config(config, &BuiltinTokenList::new(), store))
}
