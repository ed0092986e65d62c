use crate::common::Value;
use crate::errors::{DirtyError, DirtyResult, ErrorKind};
use crate::store::KeyValueStoreProvider;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

/// Disk-backed key/value store for persistent mode.
///
/// `open` creates the database file (and any missing parent directories) if
/// it does not exist, then loads the full JSON image into memory. Every write
/// mutates the in-memory image and rewrites the file as one JSON object, so a
/// key's value is replaced atomically from the reader's point of view.
///
/// This is a development-only store: durability is a single whole-file write
/// per mutation, and no effort is made to scale beyond that.
#[derive(Clone)]
pub struct FileStore {
    inner: Arc<FileStoreInner>,
}

struct FileStoreInner {
    path: PathBuf,
    image: RwLock<HashMap<String, Value>>,
}

impl FileStore {
    /// Creates a file store over the given database file path.
    ///
    /// The file is not touched until [KeyValueStoreProvider::open] runs.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            inner: Arc::new(FileStoreInner {
                path: path.into(),
                image: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &std::path::Path {
        &self.inner.path
    }

    fn persist(&self, image: &HashMap<String, Value>) -> DirtyResult<()> {
        let encoded = serde_json::to_string(image)?;
        fs::write(&self.inner.path, encoded).map_err(|err| {
            DirtyError::new_with_cause(
                &format!("Failed to write db file {}", self.inner.path.display()),
                ErrorKind::FileAccessError,
                err.into(),
            )
        })
    }
}

impl KeyValueStoreProvider for FileStore {
    fn open(&self) -> DirtyResult<()> {
        if let Some(parent) = self.inner.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.inner.path)
            .map_err(|err| {
                DirtyError::new_with_cause(
                    &format!("Failed to open db file {}", self.inner.path.display()),
                    ErrorKind::FileAccessError,
                    err.into(),
                )
            })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let image = if contents.trim().is_empty() {
            HashMap::new()
        } else {
            serde_json::from_str(&contents)?
        };

        log::debug!(
            "loaded {} keys from db file {}",
            image.len(),
            self.inner.path.display()
        );
        *self.inner.image.write() = image;
        Ok(())
    }

    fn close(&self) -> DirtyResult<()> {
        let image = self.inner.image.read();
        self.persist(&image)
    }

    fn get(&self, key: &str) -> DirtyResult<Option<Value>> {
        Ok(self.inner.image.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> DirtyResult<()> {
        let mut image = self.inner.image.write();
        image.insert(key.to_string(), value);
        self.persist(&image)
    }

    fn remove(&self, key: &str) -> DirtyResult<()> {
        let mut image = self.inner.image.write();
        image.remove(key);
        self.persist(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_db_path(dir: &TempDir) -> PathBuf {
        dir.path().join("nested").join("dirty.db")
    }

    #[test]
    fn test_open_creates_file_and_parents() {
        let dir = TempDir::new().unwrap();
        let path = temp_db_path(&dir);
        assert!(!path.exists());

        let store = FileStore::new(&path);
        store.open().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_db_path(&dir));
        store.open().unwrap();

        store.set("k", Value::from("v")).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(Value::from("v")));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = temp_db_path(&dir);

        let store = FileStore::new(&path);
        store.open().unwrap();
        store.set("k", Value::Int(42)).unwrap();
        store.close().unwrap();
        drop(store);

        let reopened = FileStore::new(&path);
        reopened.open().unwrap();
        assert_eq!(reopened.get("k").unwrap(), Some(Value::Int(42)));
    }

    #[test]
    fn test_open_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.db");
        fs::write(&path, "").unwrap();

        let store = FileStore::new(&path);
        store.open().unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn test_open_corrupt_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.db");
        fs::write(&path, "not valid json").unwrap();

        let store = FileStore::new(&path);
        let err = store.open().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
    }
}
