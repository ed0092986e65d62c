use crate::common::{Record, Value};
use crate::errors::{DirtyError, DirtyResult, ErrorKind};
use crate::schema::Schema;
use dashmap::DashMap;
use std::sync::Arc;

/// Per-collection auto-increment counter registry.
///
/// The registry is an explicitly owned handle held by the adapter, keyed by
/// collection name. A counter is created at 1 when a collection is defined
/// and removed when it is dropped. Counters only move forward, by exactly 1
/// per assignment.
///
/// Counter state lives for the process lifetime and resets on restart; it is
/// not safe for multiple processes sharing the same underlying store. That is
/// an accepted limitation of the development-only scope, not something this
/// registry attempts to fix.
#[derive(Clone, Default)]
pub struct CounterRegistry {
    inner: Arc<DashMap<String, u64>>,
}

impl CounterRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        CounterRegistry {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Initializes the counter for a collection to 1.
    ///
    /// Re-defining a collection resets its counter.
    pub fn define(&self, collection_name: &str) {
        self.inner.insert(collection_name.to_string(), 1);
    }

    /// Removes the counter state for a dropped collection.
    pub fn remove(&self, collection_name: &str) {
        self.inner.remove(collection_name);
    }

    /// Checks whether counter state exists for the collection.
    pub fn is_defined(&self, collection_name: &str) -> bool {
        self.inner.contains_key(collection_name)
    }

    /// Returns the collection's current counter value and advances it by 1.
    ///
    /// Fails with [ErrorKind::MissingCollectionState] if the collection was
    /// never defined; the caller must define the collection before creating
    /// records.
    pub fn next(&self, collection_name: &str) -> DirtyResult<u64> {
        let mut entry = self.inner.get_mut(collection_name).ok_or_else(|| {
            log::error!("No counter state for collection '{}'", collection_name);
            DirtyError::new(
                &format!(
                    "No auto-increment state for collection '{}'; define it first",
                    collection_name
                ),
                ErrorKind::MissingCollectionState,
            )
        })?;
        let current = *entry;
        *entry += 1;
        Ok(current)
    }

    /// Assigns counter values to every auto-increment field of `values`.
    ///
    /// Considers the union of the schema's attribute names and the keys
    /// already present in `values`; for each attribute whose descriptor has
    /// the auto-increment flag, the caller-supplied value (if any) is
    /// overwritten with the next counter value.
    pub fn apply_auto_increment(
        &self,
        collection_name: &str,
        schema: &Schema,
        values: &mut Record,
    ) -> DirtyResult<()> {
        let mut attr_names: Vec<String> = schema.attribute_names().cloned().collect();
        for key in values.keys() {
            if !schema.has_attribute(key) {
                attr_names.push(key.clone());
            }
        }

        for attr in attr_names {
            let is_auto = schema
                .attribute(&attr)
                .map(|def| def.auto_increment)
                .unwrap_or(false);
            if is_auto {
                let assigned = self.next(collection_name)?;
                values.put(attr, Value::Int(assigned as i64));
            }
        }
        Ok(())
    }
}
