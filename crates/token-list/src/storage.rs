use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::network::NetworkId;
use crate::token::TokenDetails;

/// Default prefix for persisted user token lists.
pub const DEFAULT_STORAGE_KEY_PREFIX: &str = "USER_TOKEN_LIST_";

/// Minimal persistent string key/value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Replace the whole value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Whether `key` is usable as a single file name: non-empty, no path
/// separators and no `..`.
pub fn is_safe_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['/', '\\']) && !key.contains("..")
}

/// Storage key for a network's user token list.
pub fn storage_key(prefix: &str, network_id: NetworkId) -> String {
    format!("{prefix}{network_id}")
}

/// Read a persisted token list. Missing or malformed values read as empty.
pub fn load_token_list(store: &dyn KeyValueStore, key: &str) -> Vec<TokenDetails> {
    let Some(raw) = store.get(key) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(tokens) => tokens,
        Err(err) => {
            tracing::warn!(key, error = %err, "Ignoring malformed persisted token list");
            Vec::new()
        }
    }
}

/// Overwrite a persisted token list.
pub fn save_token_list(
    store: &mut dyn KeyValueStore,
    key: &str,
    tokens: &[TokenDetails],
) -> Result<(), StorageError> {
    let value = serde_json::to_string(tokens)?;
    store.set(key, &value)
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes += 1;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        if !is_safe_key(key) {
            tracing::warn!(key, "Refusing to read key outside the store directory");
            return None;
        }
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(key, error = %err, "Failed to read stored value");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if !is_safe_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(self.path_for(key), value).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("token-list-{name}-{}", std::process::id()))
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key(DEFAULT_STORAGE_KEY_PREFIX, 4), "USER_TOKEN_LIST_4");
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let mut store = MemoryStore::new();
        assert!(load_token_list(&store, "USER_TOKEN_LIST_1").is_empty());

        store.set("USER_TOKEN_LIST_1", "{not json").unwrap();
        assert!(load_token_list(&store, "USER_TOKEN_LIST_1").is_empty());

        store.set("USER_TOKEN_LIST_1", r#"{"address":"0xabc"}"#).unwrap();
        assert!(load_token_list(&store, "USER_TOKEN_LIST_1").is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let tokens = vec![
            TokenDetails::new("0xAAA", "A", "Token A", 18),
            TokenDetails::new("0xBBB", "B", "Token B", 6),
        ];
        assert!(store.is_empty());
        save_token_list(&mut store, "k", &tokens).unwrap();
        save_token_list(&mut store, "k", &tokens).unwrap();
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(load_token_list(&store, "k"), tokens);
    }

    #[test]
    fn test_file_store() {
        let dir = temp_dir("file-store");
        let _ = fs::remove_dir_all(&dir);

        let mut store = FileStore::new(&dir);
        assert_eq!(store.get("USER_TOKEN_LIST_1"), None);

        store.set("USER_TOKEN_LIST_1", "[]").unwrap();
        assert_eq!(store.get("USER_TOKEN_LIST_1").as_deref(), Some("[]"));
        assert!(dir.join("USER_TOKEN_LIST_1.json").exists());

        store.set("USER_TOKEN_LIST_1", "[1]").unwrap();
        assert_eq!(store.get("USER_TOKEN_LIST_1").as_deref(), Some("[1]"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_store_rejects_keys_leaving_dir() {
        let dir = temp_dir("file-store-keys");
        let _ = fs::remove_dir_all(&dir);
        let mut store = FileStore::new(dir.join("inner"));

        for key in ["../escape", "a/b", "a\\b", "..", ""] {
            assert!(
                matches!(store.set(key, "[]"), Err(StorageError::InvalidKey(_))),
                "{key:?}"
            );
            assert_eq!(store.get(key), None);
        }
        assert!(!dir.join("escape.json").exists());
        assert!(!dir.join("inner").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
