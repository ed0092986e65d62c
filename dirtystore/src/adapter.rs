use crate::common::{Record, Value, CREATED_AT, UPDATED_AT};
use crate::config::DirtyConfig;
use crate::counter::CounterRegistry;
use crate::criteria::{Criteria, MatchOptions};
use crate::errors::{DirtyError, DirtyResult, ErrorKind};
use crate::query_options::QueryOptions;
use crate::schema::Schema;
use crate::store::{FileStore, InMemoryStore, KeyValueStore};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;

/// Identity string under which the calling data-access layer registers this
/// adapter.
pub const ADAPTER_IDENTITY: &str = "dirty";

/// A development-only collection adapter over a simple key/value store.
///
/// The adapter persists named collections (a schema plus a row set) inside a
/// key/value store and interprets a small criteria language against
/// in-memory row snapshots. A collection's schema and row set are stored as
/// two independent values under derived keys
/// (`"<schema_prefix><name>"` / `"<data_prefix><name>"`).
///
/// Every mutation follows the same cycle: read the whole row-set snapshot,
/// mutate it in memory, write the whole snapshot back as a single value.
/// Atomicity of one operation is delegated to the store's single-value write;
/// there is no locking across operations, so two concurrent operations on the
/// same collection can interleave at the store boundary. That race is an
/// accepted limitation of the development-only scope and is deliberately not
/// fixed here.
///
/// # Examples
///
/// ```rust,ignore
/// use dirtystore::{record, AttributeDef, DirtyAdapter, DirtyConfig, QueryOptions, Schema};
///
/// let adapter = DirtyAdapter::new(DirtyConfig::default());
/// adapter.initialize()?;
///
/// let schema = Schema::new().with_attribute("id", AttributeDef::auto_increment());
/// adapter.define("users", schema)?;
///
/// let created = adapter.create("users", record! { "name" => "Ann" })?;
/// let found = adapter.find(
///     "users",
///     &QueryOptions::new().where_clause(record! { "name" => "Ann" }),
/// )?;
/// adapter.teardown()?;
/// ```
#[derive(Clone)]
pub struct DirtyAdapter {
    inner: Arc<DirtyAdapterInner>,
}

struct DirtyAdapterInner {
    config: DirtyConfig,
    store: RwLock<Option<KeyValueStore>>,
    counters: CounterRegistry,
}

impl DirtyAdapter {
    /// Creates an adapter with the given configuration.
    ///
    /// No store is touched until [DirtyAdapter::initialize] runs.
    pub fn new(config: DirtyConfig) -> Self {
        DirtyAdapter {
            inner: Arc::new(DirtyAdapterInner {
                config,
                store: RwLock::new(None),
                counters: CounterRegistry::new(),
            }),
        }
    }

    /// The adapter's identity string.
    pub fn identity(&self) -> &'static str {
        ADAPTER_IDENTITY
    }

    /// The adapter's configuration.
    pub fn config(&self) -> &DirtyConfig {
        &self.inner.config
    }

    /// Initializes the underlying store and waits for its readiness signal.
    ///
    /// In persistent mode the database file (and missing parent directories)
    /// is created before loading; otherwise a fresh in-memory store is used.
    pub fn initialize(&self) -> DirtyResult<()> {
        let store = if self.inner.config.is_persistent() {
            KeyValueStore::new(FileStore::new(self.inner.config.get_db_file_path()))
        } else {
            KeyValueStore::new(InMemoryStore::new())
        };
        store.open()?;

        log::debug!(
            "initialized dirty adapter (persistent: {})",
            self.inner.config.is_persistent()
        );
        *self.inner.store.write() = Some(store);
        Ok(())
    }

    /// Tears down the connection to the underlying store.
    ///
    /// Subsequent operations fail with [ErrorKind::StoreNotInitialized] until
    /// the adapter is initialized again.
    pub fn teardown(&self) -> DirtyResult<()> {
        if let Some(store) = self.inner.store.write().take() {
            store.close()?;
        }
        log::debug!("tore down dirty adapter");
        Ok(())
    }

    /// Fetches the schema for a collection, or `None` if it was never defined.
    pub fn describe(&self, collection_name: &str) -> DirtyResult<Option<Schema>> {
        let store = self.store()?;
        let value = store.get(&self.schema_key(collection_name)).map_err(|err| {
            DirtyError::new_with_cause(
                &format!("Failed to read schema for '{}'", collection_name),
                ErrorKind::StoreReadError,
                err,
            )
        })?;
        log::debug!("describing collection '{}'", collection_name);
        value.map(|v| Schema::from_value(&v)).transpose()
    }

    /// Creates a new collection: writes the schema and initializes the
    /// collection's auto-increment counter to 1.
    pub fn define(&self, collection_name: &str, schema: Schema) -> DirtyResult<()> {
        log::debug!("defining collection '{}' as {}", collection_name, schema);
        let store = self.store()?;
        store
            .set(&self.schema_key(collection_name), schema.to_value())
            .map_err(|err| {
                DirtyError::new_with_cause(
                    &format!("Failed to write schema for '{}'", collection_name),
                    ErrorKind::StoreWriteError,
                    err,
                )
            })?;
        self.inner.counters.define(collection_name);
        Ok(())
    }

    /// Drops an existing collection: removes its data and schema keys and
    /// resets its counter.
    ///
    /// Schema removal is attempted even when data removal fails, as
    /// best-effort cleanup; only the data-removal failure is propagated, as
    /// [ErrorKind::CollectionDropError].
    pub fn drop_collection(&self, collection_name: &str) -> DirtyResult<()> {
        log::debug!("dropping collection '{}'", collection_name);
        let store = self.store()?;

        let data_result = store.remove(&self.data_key(collection_name));
        let schema_result = store.remove(&self.schema_key(collection_name));
        self.inner.counters.remove(collection_name);

        if let Err(err) = data_result {
            return Err(DirtyError::new_with_cause(
                &format!("Could not drop collection '{}'", collection_name),
                ErrorKind::CollectionDropError,
                err,
            ));
        }
        schema_result
    }

    /// Extends the schema of an existing collection.
    ///
    /// Shallow-merges `new_attrs` over the stored schema and writes it back.
    /// Fails with [ErrorKind::CollectionNotFound] if the collection was never
    /// defined.
    pub fn alter(&self, collection_name: &str, new_attrs: Schema) -> DirtyResult<Schema> {
        log::debug!("altering collection '{}'", collection_name);
        let store = self.store()?;

        let mut schema = self.describe(collection_name)?.ok_or_else(|| {
            DirtyError::new(
                &format!("Collection '{}' does not exist", collection_name),
                ErrorKind::CollectionNotFound,
            )
        })?;
        schema.merge(&new_attrs);

        store
            .set(&self.schema_key(collection_name), schema.to_value())
            .map_err(|err| {
                DirtyError::new_with_cause(
                    &format!("Failed to write schema for '{}'", collection_name),
                    ErrorKind::StoreWriteError,
                    err,
                )
            })?;
        Ok(schema)
    }

    /// Creates a new record in the collection and returns the finalized
    /// values.
    ///
    /// Auto-increment fields are assigned from the collection counter, then
    /// `createdAt` / `updatedAt` are stamped with the current time when the
    /// schema declares those attributes, and the record is appended to the
    /// row-set snapshot (an empty set is created if none existed).
    pub fn create(&self, collection_name: &str, values: Record) -> DirtyResult<Record> {
        log::debug!("creating record in '{}': {}", collection_name, values);
        let store = self.store()?;

        let schema = self.describe(collection_name)?.ok_or_else(|| {
            DirtyError::new(
                &format!(
                    "Collection '{}' is not defined; define it before creating records",
                    collection_name
                ),
                ErrorKind::MissingCollectionState,
            )
        })?;

        let mut values = values;
        self.inner
            .counters
            .apply_auto_increment(collection_name, &schema, &mut values)?;

        let now = Utc::now();
        if schema.has_attribute(CREATED_AT) {
            values.put(CREATED_AT, Value::DateTime(now));
        }
        if schema.has_attribute(UPDATED_AT) {
            values.put(UPDATED_AT, Value::DateTime(now));
        }

        let mut rows = self.read_rows(&store, collection_name)?;
        rows.push(Value::Record(values.clone()));
        store.set(&self.data_key(collection_name), Value::Array(rows))?;

        Ok(values)
    }

    /// Finds the records matching the criteria, in stored order.
    pub fn find(&self, collection_name: &str, options: &QueryOptions) -> DirtyResult<Vec<Record>> {
        Self::check_query_options(options)?;
        let store = self.store()?;

        let criteria = Criteria::parse(options.where_clause.as_ref())?;
        let match_options = self.match_options();
        log::debug!("finding in '{}' with {}", collection_name, criteria);

        let rows = self.read_rows(&store, collection_name)?;
        let mut matched = Vec::new();
        for row in rows {
            if let Value::Record(record) = row {
                if criteria.matches(&record, &match_options) {
                    matched.push(record);
                }
            }
        }
        Ok(matched)
    }

    /// Updates every record matching the criteria by shallow-merging `values`
    /// over it, preserving stored order.
    ///
    /// Returns the merge patch, not the updated rows; callers that need the
    /// updated records must re-query.
    pub fn update(
        &self,
        collection_name: &str,
        options: &QueryOptions,
        values: Record,
    ) -> DirtyResult<Record> {
        Self::check_query_options(options)?;
        let store = self.store()?;

        let criteria = Criteria::parse(options.where_clause.as_ref())?;
        let match_options = self.match_options();
        log::debug!(
            "updating '{}' where {} with {}",
            collection_name,
            criteria,
            values
        );

        let mut rows = self.read_rows(&store, collection_name)?;
        let matched_indices: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| match row {
                Value::Record(record) => criteria.matches(record, &match_options),
                _ => false,
            })
            .map(|(index, _)| index)
            .collect();

        for index in matched_indices {
            if let Value::Record(record) = &mut rows[index] {
                record.merge(&values);
            }
        }

        store.set(&self.data_key(collection_name), Value::Array(rows))?;
        Ok(values)
    }

    /// Deletes every record matching the criteria.
    ///
    /// A criteria matching zero rows leaves the row set unchanged.
    pub fn destroy(&self, collection_name: &str, options: &QueryOptions) -> DirtyResult<()> {
        Self::check_query_options(options)?;
        let store = self.store()?;

        let criteria = Criteria::parse(options.where_clause.as_ref())?;
        let match_options = self.match_options();
        log::debug!("destroying in '{}' where {}", collection_name, criteria);

        let mut rows = self.read_rows(&store, collection_name)?;
        rows.retain(|row| match row {
            Value::Record(record) => !criteria.matches(record, &match_options),
            _ => true,
        });

        store.set(&self.data_key(collection_name), Value::Array(rows))
    }

    fn store(&self) -> DirtyResult<KeyValueStore> {
        self.inner.store.read().clone().ok_or_else(|| {
            DirtyError::new(
                "Adapter is not initialized",
                ErrorKind::StoreNotInitialized,
            )
        })
    }

    fn schema_key(&self, collection_name: &str) -> String {
        format!(
            "{}{}",
            self.inner.config.get_schema_prefix(),
            collection_name
        )
    }

    fn data_key(&self, collection_name: &str) -> String {
        format!("{}{}", self.inner.config.get_data_prefix(), collection_name)
    }

    fn match_options(&self) -> MatchOptions {
        MatchOptions {
            attributes_case_sensitive: self.inner.config.is_attributes_case_sensitive(),
        }
    }

    fn check_query_options(options: &QueryOptions) -> DirtyResult<()> {
        if options.has_unsupported_options() {
            log::error!("limit, skip and order are not implemented by the dirty adapter");
            return Err(DirtyError::new(
                "limit, skip and order are not implemented by the dirty adapter",
                ErrorKind::UnsupportedQueryOption,
            ));
        }
        Ok(())
    }

    fn read_rows(&self, store: &KeyValueStore, collection_name: &str) -> DirtyResult<Vec<Value>> {
        let value = store.get(&self.data_key(collection_name)).map_err(|err| {
            DirtyError::new_with_cause(
                &format!("Failed to read row set for '{}'", collection_name),
                ErrorKind::StoreReadError,
                err,
            )
        })?;
        match value {
            None => Ok(Vec::new()),
            Some(Value::Array(rows)) => Ok(rows),
            Some(other) => Err(DirtyError::new(
                &format!(
                    "Row set for '{}' is not an array (found {})",
                    collection_name,
                    other.type_name()
                ),
                ErrorKind::InternalError,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_options::where_clause;
    use crate::record;
    use crate::schema::AttributeDef;

    fn adapter() -> DirtyAdapter {
        let adapter = DirtyAdapter::new(DirtyConfig::default());
        adapter.initialize().unwrap();
        adapter
    }

    fn user_schema() -> Schema {
        Schema::new()
            .with_attribute("id", AttributeDef::auto_increment())
            .with_attribute("name", AttributeDef::new().with_type("string"))
    }

    #[test]
    fn test_identity() {
        let adapter = DirtyAdapter::new(DirtyConfig::default());
        assert_eq!(adapter.identity(), "dirty");
    }

    #[test]
    fn test_operations_require_initialize() {
        let adapter = DirtyAdapter::new(DirtyConfig::default());
        let err = adapter.describe("users").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::StoreNotInitialized);
    }

    #[test]
    fn test_teardown_discards_store() {
        let adapter = adapter();
        adapter.teardown().unwrap();
        let err = adapter.find("users", &QueryOptions::new()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::StoreNotInitialized);
    }

    #[test]
    fn test_define_and_describe() {
        let adapter = adapter();
        assert!(adapter.describe("users").unwrap().is_none());

        adapter.define("users", user_schema()).unwrap();
        let schema = adapter.describe("users").unwrap().unwrap();
        assert!(schema.attribute("id").unwrap().auto_increment);
    }

    #[test]
    fn test_collection_names_are_case_sensitive() {
        let adapter = adapter();
        adapter.define("Users", user_schema()).unwrap();
        assert!(adapter.describe("users").unwrap().is_none());
        assert!(adapter.describe("Users").unwrap().is_some());
    }

    #[test]
    fn test_create_assigns_auto_increment_sequence() {
        let adapter = adapter();
        adapter.define("users", user_schema()).unwrap();

        for expected in 1..=3i64 {
            let created = adapter
                .create("users", record! { "name" => "x" })
                .unwrap();
            assert_eq!(created.get("id"), Some(&Value::Int(expected)));
        }
    }

    #[test]
    fn test_create_without_define_fails() {
        let adapter = adapter();
        let err = adapter
            .create("ghosts", record! { "name" => "x" })
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MissingCollectionState);
    }

    #[test]
    fn test_create_stamps_timestamps_when_declared() {
        let adapter = adapter();
        let schema = user_schema()
            .with_attribute(CREATED_AT, AttributeDef::new())
            .with_attribute(UPDATED_AT, AttributeDef::new());
        adapter.define("users", schema).unwrap();

        let created = adapter
            .create("users", record! { "name" => "Ann" })
            .unwrap();
        assert!(matches!(created.get(CREATED_AT), Some(Value::DateTime(_))));
        assert!(matches!(created.get(UPDATED_AT), Some(Value::DateTime(_))));

        // not declared -> not stamped
        adapter.define("pets", user_schema()).unwrap();
        let created = adapter.create("pets", record! { "name" => "Rex" }).unwrap();
        assert!(created.get(CREATED_AT).is_none());
    }

    #[test]
    fn test_create_find_round_trip() {
        let adapter = adapter();
        adapter.define("users", user_schema()).unwrap();
        adapter
            .create("users", record! { "name" => "Ann" })
            .unwrap();
        adapter
            .create("users", record! { "name" => "Bob" })
            .unwrap();

        let found = adapter
            .find("users", &where_clause(record! { "name" => "Ann" }))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("name"), Some(&Value::from("Ann")));
        assert_eq!(found[0].get("id"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_find_without_criteria_returns_all_in_order() {
        let adapter = adapter();
        adapter.define("users", user_schema()).unwrap();
        for name in ["a", "b", "c"] {
            adapter.create("users", record! { "name" => name }).unwrap();
        }

        let all = adapter.find("users", &QueryOptions::new()).unwrap();
        assert_eq!(all.len(), 3);
        let ids: Vec<i64> = all.iter().map(|r| r.get("id").unwrap().as_int().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_find_on_empty_collection() {
        let adapter = adapter();
        adapter.define("users", user_schema()).unwrap();
        let found = adapter.find("users", &QueryOptions::new()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_unsupported_query_options_rejected() {
        let adapter = adapter();
        adapter.define("users", user_schema()).unwrap();

        let err = adapter
            .find("users", &QueryOptions::new().limit(10))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedQueryOption);

        let err = adapter
            .update("users", &QueryOptions::new().skip(1), record! {})
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedQueryOption);

        let err = adapter
            .destroy("users", &QueryOptions::new().order("name"))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedQueryOption);
    }

    #[test]
    fn test_update_isolates_matching_rows() {
        let adapter = adapter();
        adapter.define("users", user_schema()).unwrap();
        adapter
            .create("users", record! { "name" => "Ann" })
            .unwrap();
        adapter
            .create("users", record! { "name" => "Bob" })
            .unwrap();

        let patch = adapter
            .update(
                "users",
                &where_clause(record! { "name" => "Ann" }),
                record! { "age" => 30 },
            )
            .unwrap();
        // update returns the merge patch, not the updated rows
        assert_eq!(patch, record! { "age" => 30 });

        let aged = adapter
            .find("users", &where_clause(record! { "age" => 30 }))
            .unwrap();
        assert_eq!(aged.len(), 1);
        assert_eq!(aged[0].get("name"), Some(&Value::from("Ann")));

        let bob = adapter
            .find("users", &where_clause(record! { "name" => "Bob" }))
            .unwrap();
        assert!(bob[0].get("age").is_none());
    }

    #[test]
    fn test_destroy_removes_matching_rows() {
        let adapter = adapter();
        adapter.define("users", user_schema()).unwrap();
        for name in ["Ann", "Bob", "Ann"] {
            adapter.create("users", record! { "name" => name }).unwrap();
        }

        adapter
            .destroy("users", &where_clause(record! { "name" => "Ann" }))
            .unwrap();
        let remaining = adapter.find("users", &QueryOptions::new()).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].get("name"), Some(&Value::from("Bob")));
    }

    #[test]
    fn test_destroy_zero_matches_leaves_rows_unchanged() {
        let adapter = adapter();
        adapter.define("users", user_schema()).unwrap();
        adapter
            .create("users", record! { "name" => "Ann" })
            .unwrap();

        let before = adapter.find("users", &QueryOptions::new()).unwrap();
        adapter
            .destroy("users", &where_clause(record! { "name" => "Zed" }))
            .unwrap();
        let after = adapter.find("users", &QueryOptions::new()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_alter_merges_schema() {
        let adapter = adapter();
        adapter.define("users", user_schema()).unwrap();

        let altered = adapter
            .alter(
                "users",
                Schema::new().with_attribute("age", AttributeDef::new().with_type("integer")),
            )
            .unwrap();
        assert!(altered.has_attribute("age"));
        assert!(altered.attribute("id").unwrap().auto_increment);

        let stored = adapter.describe("users").unwrap().unwrap();
        assert_eq!(stored, altered);
    }

    #[test]
    fn test_alter_undefined_collection_fails() {
        let adapter = adapter();
        let err = adapter.alter("ghosts", Schema::new()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::CollectionNotFound);
    }

    #[test]
    fn test_drop_removes_everything() {
        let adapter = adapter();
        adapter.define("users", user_schema()).unwrap();
        adapter
            .create("users", record! { "name" => "Ann" })
            .unwrap();

        adapter.drop_collection("users").unwrap();
        assert!(adapter.describe("users").unwrap().is_none());
        assert!(adapter.find("users", &QueryOptions::new()).unwrap().is_empty());

        // counter state is gone too
        let err = adapter
            .create("users", record! { "name" => "Ann" })
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MissingCollectionState);
    }

    #[test]
    fn test_case_folding_follows_config() {
        let folded = adapter();
        folded.define("users", user_schema()).unwrap();
        folded
            .create("users", record! { "Name" => "Ann" })
            .unwrap();
        let found = folded
            .find("users", &where_clause(record! { "name" => "Ann" }))
            .unwrap();
        assert_eq!(found.len(), 1);

        let sensitive = DirtyAdapter::new(
            DirtyConfig::default().attributes_case_sensitive(true),
        );
        sensitive.initialize().unwrap();
        sensitive.define("users", user_schema()).unwrap();
        sensitive
            .create("users", record! { "Name" => "Ann" })
            .unwrap();
        let found = sensitive
            .find("users", &where_clause(record! { "name" => "Ann" }))
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let adapter = adapter();
        adapter.define("users", user_schema()).unwrap();

        let clone = adapter.clone();
        clone
            .create("users", record! { "name" => "Ann" })
            .unwrap();
        let found = adapter.find("users", &QueryOptions::new()).unwrap();
        assert_eq!(found.len(), 1);
    }
}
