//! The key/value store boundary.
//!
//! The adapter's responsibility ends at translating collection-level
//! operations into key/value operations; everything below this trait is an
//! external collaborator. Two providers ship with the crate:
//! [InMemoryStore] for the default memory-only mode and [FileStore] for
//! persistent mode.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::InMemoryStore;

use crate::common::Value;
use crate::errors::DirtyResult;
use std::ops::Deref;
use std::sync::Arc;

/// Minimal contract the adapter requires from an underlying key/value store.
///
/// `open` is the readiness signal: it must complete before any other call and
/// is observed synchronously by the adapter's initialize routine. Values are
/// whole snapshots; a successful `set` is all-or-nothing for its key.
pub trait KeyValueStoreProvider: Send + Sync {
    /// Opens the store and signals readiness.
    fn open(&self) -> DirtyResult<()>;

    /// Closes the store, releasing any held resources.
    fn close(&self) -> DirtyResult<()>;

    /// Reads the value for a key, or `None` if the key is absent.
    fn get(&self, key: &str) -> DirtyResult<Option<Value>>;

    /// Writes the value for a key, replacing any previous value atomically.
    fn set(&self, key: &str, value: Value) -> DirtyResult<()>;

    /// Removes the key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> DirtyResult<()>;
}

/// A handle to a key/value store provider.
///
/// Cheap to clone; all clones share the same underlying provider.
#[derive(Clone)]
pub struct KeyValueStore {
    inner: Arc<dyn KeyValueStoreProvider>,
}

impl KeyValueStore {
    /// Creates a new handle from a provider implementation.
    pub fn new<T: KeyValueStoreProvider + 'static>(inner: T) -> Self {
        KeyValueStore {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for KeyValueStore {
    type Target = Arc<dyn KeyValueStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
