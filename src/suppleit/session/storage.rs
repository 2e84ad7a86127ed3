//! Web-storage shaped key/value backends. `MemoryStorage` lives as long as the
//! process (the session-scoped store); `FileStorage` persists a JSON map and
//! replaces the file atomically on every batch.

use crate::suppleit::errors::AppError;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

pub trait Storage: Send + Sync {
    /// # Errors
    /// Returns `AppError::Storage` when the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Writes every pair or none of them.
    ///
    /// # Errors
    /// Returns `AppError::Storage` when the backend cannot be written.
    fn set_items(&self, items: &[(&str, &str)]) -> Result<(), AppError>;

    /// # Errors
    /// Returns `AppError::Storage` when the backend cannot be written.
    fn remove_items(&self, keys: &[&str]) -> Result<(), AppError>;

    /// # Errors
    /// Returns `AppError::Storage` when the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.set_items(&[(key, value)])
    }

    /// # Errors
    /// Returns `AppError::Storage` when the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), AppError> {
        self.remove_items(&[key])
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AppError> {
        self.items
            .lock()
            .map_err(|_| AppError::Storage("memory storage lock poisoned".to_string()))
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_items(&self, items: &[(&str, &str)]) -> Result<(), AppError> {
        let mut map = self.lock()?;
        for (key, value) in items {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_items(&self, keys: &[&str]) -> Result<(), AppError> {
        let mut map = self.lock()?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// Persistent storage backed by a single JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, AppError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {err}",
                    self.path.display()
                )))
            }
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|err| {
            AppError::Storage(format!("Failed to parse {}: {err}", self.path.display()))
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    AppError::Storage(format!("Failed to create {}: {err}", parent.display()))
                })?;
            }
        }

        let payload = serde_json::to_vec_pretty(map)
            .map_err(|err| AppError::Storage(format!("Failed to encode storage: {err}")))?;

        let tmp_path = self.path.with_extension("tmp");
        let mut file = open_private(&tmp_path).map_err(|err| {
            AppError::Storage(format!("Failed to open {}: {err}", tmp_path.display()))
        })?;
        file.write_all(&payload)
            .and_then(|()| file.sync_all())
            .map_err(|err| {
                AppError::Storage(format!("Failed to write {}: {err}", tmp_path.display()))
            })?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(|err| {
            AppError::Storage(format!("Failed to replace {}: {err}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), keys = map.len(), "storage written");

        Ok(())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, AppError> {
        self.lock
            .lock()
            .map_err(|_| AppError::Storage("file storage lock poisoned".to_string()))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let _guard = self.guard()?;
        Ok(self.read_map()?.remove(key))
    }

    fn set_items(&self, items: &[(&str, &str)]) -> Result<(), AppError> {
        let _guard = self.guard()?;
        let mut map = self.read_map()?;
        for (key, value) in items {
            map.insert((*key).to_string(), (*value).to_string());
        }
        self.write_map(&map)
    }

    fn remove_items(&self, keys: &[&str]) -> Result<(), AppError> {
        let _guard = self.guard()?;
        let mut map = self.read_map()?;
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() == before {
            return Ok(());
        }
        self.write_map(&map)
    }
}

// Session tokens live in this file, keep it owner-only.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::File::create(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("naverState").ok().flatten(), None);

        assert!(storage.set_item("naverState", "abc").is_ok());
        assert_eq!(
            storage.get_item("naverState").ok().flatten().as_deref(),
            Some("abc")
        );

        assert!(storage.remove_item("naverState").is_ok());
        assert_eq!(storage.get_item("naverState").ok().flatten(), None);
    }

    #[test]
    fn file_storage_persists_across_instances() -> Result<(), AppError> {
        let dir = tempfile::tempdir().map_err(|err| AppError::Storage(err.to_string()))?;
        let path = dir.path().join("nested").join("storage.json");

        FileStorage::new(&path).set_items(&[("email", "a@b.com"), ("role", "USER")])?;

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get_item("email")?.as_deref(), Some("a@b.com"));
        assert_eq!(reopened.get_item("role")?.as_deref(), Some("USER"));
        assert!(!path.with_extension("tmp").exists());
        Ok(())
    }

    #[test]
    fn file_storage_missing_file_reads_empty() -> Result<(), AppError> {
        let dir = tempfile::tempdir().map_err(|err| AppError::Storage(err.to_string()))?;
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.get_item("email")?, None);
        storage.remove_items(&["email"])?;
        assert!(!storage.path().exists());
        Ok(())
    }

    #[test]
    fn file_storage_rejects_corrupt_file() -> Result<(), AppError> {
        let dir = tempfile::tempdir().map_err(|err| AppError::Storage(err.to_string()))?;
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").map_err(|err| AppError::Storage(err.to_string()))?;

        let result = FileStorage::new(&path).get_item("email");
        assert!(matches!(result, Err(AppError::Storage(_))));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn file_storage_is_owner_only() -> Result<(), AppError> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().map_err(|err| AppError::Storage(err.to_string()))?;
        let path = dir.path().join("storage.json");
        FileStorage::new(&path).set_item("accessToken", "T")?;

        let mode = fs::metadata(&path)
            .map_err(|err| AppError::Storage(err.to_string()))?
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
        Ok(())
    }
}
