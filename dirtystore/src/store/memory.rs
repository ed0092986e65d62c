use crate::common::Value;
use crate::errors::DirtyResult;
use crate::store::KeyValueStoreProvider;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory key/value store.
///
/// The default backing store when the adapter is not configured as
/// persistent. All data is lost when the store is closed, which is the point:
/// the adapter targets development use where the database is dropped and
/// recreated on every run.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

#[derive(Default)]
struct InMemoryStoreInner {
    entries: DashMap<String, Value>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        InMemoryStore::default()
    }
}

impl KeyValueStoreProvider for InMemoryStore {
    fn open(&self) -> DirtyResult<()> {
        // nothing to load; the store is ready immediately
        Ok(())
    }

    fn close(&self) -> DirtyResult<()> {
        self.inner.entries.clear();
        Ok(())
    }

    fn get(&self, key: &str) -> DirtyResult<Option<Value>> {
        Ok(self.inner.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: Value) -> DirtyResult<()> {
        self.inner.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> DirtyResult<()> {
        self.inner.entries.remove(key);
        Ok(())
    }
}
