//! File-backed storage: one file per key under a configured directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Storage, StorageError};

/// Durable storage that writes each key to `<dir>/<key>` as a plain file.
///
/// Keys come from [`super::keys`] and are already filesystem-safe; this type
/// does no escaping.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the storage directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read stored value");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Err(e) = fs::remove_file(self.path_for(key))
            && e.kind() != ErrorKind::NotFound
        {
            tracing::warn!(key, error = %e, "Failed to remove stored value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> FileStorage {
        let dir = std::env::temp_dir().join(format!("wp-storage-{}", uuid_suffix()));
        FileStorage::new(dir).expect("create storage dir")
    }

    fn uuid_suffix() -> String {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .subsec_nanos();
        format!("{}-{nanos}", std::process::id())
    }

    #[test]
    fn test_round_trip_and_remove() {
        let storage = temp_storage();

        assert!(storage.get("auth_token").is_none());
        storage.set("auth_token", "tok_123").expect("set");
        assert_eq!(storage.get("auth_token").as_deref(), Some("tok_123"));

        storage.remove("auth_token");
        assert!(storage.get("auth_token").is_none());

        // Removing again is fine.
        storage.remove("auth_token");
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = std::env::temp_dir().join(format!("wp-storage-reopen-{}", uuid_suffix()));
        {
            let storage = FileStorage::new(&dir).expect("create");
            storage.set("wealthproxies_cart", "{}").expect("set");
        }
        let reopened = FileStorage::new(&dir).expect("reopen");
        assert_eq!(reopened.get("wealthproxies_cart").as_deref(), Some("{}"));
    }
}
