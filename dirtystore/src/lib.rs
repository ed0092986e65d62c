//! # dirtystore - a development-only collection adapter
//!
//! dirtystore lets a generic data-access layer operate against a simple
//! embedded key/value store instead of a real database. It persists named
//! collections (a schema plus a row set) inside the store and provides
//! create/find/update/destroy operations that interpret a small
//! criteria language (equality, `and`, `or`, `like`, `not`) against
//! in-memory row snapshots.
//!
//! ## Key Characteristics
//!
//! - **Embedded**: no server process; the backing store is in-memory by
//!   default, or a single JSON file in persistent mode
//! - **Snapshot semantics**: a collection's row set is one atomic store
//!   value; every mutation reads the whole set, mutates in memory, and
//!   writes the whole set back
//! - **Typed criteria**: `where` clauses parse into a typed tree before
//!   evaluation, so operator keys and attribute names never collide
//! - **Auto-increment**: per-collection counters assign integer ids in
//!   creation order, starting at 1
//! - **Development only**: no indexing, transactions, pagination or
//!   cross-operation concurrency control
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dirtystore::{record, AttributeDef, DirtyAdapter, DirtyConfig, QueryOptions, Schema};
//!
//! # fn main() -> dirtystore::DirtyResult<()> {
//! let adapter = DirtyAdapter::new(DirtyConfig::default());
//! adapter.initialize()?;
//!
//! let schema = Schema::new()
//!     .with_attribute("id", AttributeDef::auto_increment())
//!     .with_attribute("name", AttributeDef::new().with_type("string"));
//! adapter.define("users", schema)?;
//!
//! let ann = adapter.create("users", record! { "name" => "Ann" })?;
//! assert_eq!(ann.get("id"), Some(&dirtystore::Value::Int(1)));
//!
//! let found = adapter.find(
//!     "users",
//!     &QueryOptions::new().where_clause(record! { "like" => record! { "name" => "nn" } }),
//! )?;
//! assert_eq!(found.len(), 1);
//!
//! adapter.teardown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`adapter`] - The collection store operations
//! - [`common`] - Records, values and shared constants
//! - [`config`] - Adapter configuration
//! - [`counter`] - Per-collection auto-increment registry
//! - [`criteria`] - The criteria-matching engine
//! - [`errors`] - Error types and result definitions
//! - [`query_options`] - Query option surface for find/update/destroy
//! - [`schema`] - Collection schema types
//! - [`store`] - Key/value store boundary and providers

pub mod adapter;
pub mod common;
pub mod config;
pub mod counter;
pub mod criteria;
pub mod errors;
pub mod query_options;
pub mod schema;
pub mod store;

pub use adapter::{DirtyAdapter, ADAPTER_IDENTITY};
pub use common::{Record, Value, CREATED_AT, UPDATED_AT};
pub use config::DirtyConfig;
pub use counter::CounterRegistry;
pub use criteria::{Criteria, MatchOptions};
pub use errors::{DirtyError, DirtyResult, ErrorKind};
pub use query_options::{where_clause, QueryOptions};
pub use schema::{AttributeDef, Schema};
pub use store::{FileStore, InMemoryStore, KeyValueStore, KeyValueStoreProvider};
