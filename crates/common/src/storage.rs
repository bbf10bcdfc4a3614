//! Key-value storage boundary.
//!
//! Settings and session history are persisted as opaque string values
//! under well-known keys. The store is only ever touched from the single
//! controller task, so write-through with no transaction discipline is
//! enough. Reads that fail degrade to "absent"; writes are best-effort.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::VigilResult;

/// String-keyed persistence boundary.
pub trait KeyValueStore: Send {
    /// Read the value under `key`, or `None` if absent/unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> VigilResult<()>;

    /// Remove the value under `key` if present.
    fn remove(&mut self, key: &str) -> VigilResult<()>;
}

/// File-backed store: one file per key under the VigilantEye data dir.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store rooted at the standard data directory.
    pub fn new() -> Self {
        Self {
            root: default_data_dir(),
        }
    }

    /// Store rooted at an explicit directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read stored value");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> VigilResult<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> VigilResult<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> VigilResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> VigilResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Standard data directory (`$XDG_DATA_HOME/vigilanteye` or the
/// equivalent under `$HOME`).
pub fn default_data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("vigilanteye")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("camera_fps"), None);
        store.set("camera_fps", "30").unwrap();
        assert_eq!(store.get("camera_fps").as_deref(), Some("30"));
        store.remove("camera_fps").unwrap();
        assert_eq!(store.get("camera_fps"), None);
    }

    #[test]
    fn file_store_round_trips() {
        let dir = std::env::temp_dir().join("vigilanteye_test_filestore");
        let _ = std::fs::remove_dir_all(&dir);

        let mut store = FileStore::at(&dir);
        assert_eq!(store.get("camera_resolution"), None);
        store.set("camera_resolution", "1280x720").unwrap();
        assert_eq!(
            store.get("camera_resolution").as_deref(),
            Some("1280x720")
        );

        // Removing a missing key is not an error.
        store.remove("no_such_key").unwrap();

        std::fs::remove_dir_all(&dir).ok();
    }
}
