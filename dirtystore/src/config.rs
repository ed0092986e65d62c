use std::path::{Path, PathBuf};

/// Configuration for the dirty adapter.
///
/// # Examples
///
/// ```rust,ignore
/// use dirtystore::DirtyConfig;
///
/// let config = DirtyConfig::new()
///     .persistent(true)
///     .db_file_path("./.dirtystore/dirty.db")
///     .attributes_case_sensitive(false);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DirtyConfig {
    persistent: bool,
    db_file_path: PathBuf,
    schema_prefix: String,
    data_prefix: String,
    attributes_case_sensitive: bool,
}

impl Default for DirtyConfig {
    fn default() -> Self {
        DirtyConfig {
            // the db is dropped and recreated each run unless persisted to disk
            persistent: false,
            db_file_path: PathBuf::from("./.dirtystore/dirty.db"),
            schema_prefix: "schema:".to_string(),
            data_prefix: "data:".to_string(),
            // attribute names are case insensitive by default
            attributes_case_sensitive: false,
        }
    }
}

impl DirtyConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        DirtyConfig::default()
    }

    /// Keeps data on disk instead of memory-only.
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// File path for disk output in persistent mode.
    pub fn db_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_file_path = path.into();
        self
    }

    /// String preceding the key name for schema definitions.
    pub fn schema_prefix(mut self, prefix: &str) -> Self {
        self.schema_prefix = prefix.to_string();
        self
    }

    /// String preceding the key name for collection data.
    pub fn data_prefix(mut self, prefix: &str) -> Self {
        self.data_prefix = prefix.to_string();
        self
    }

    /// Disables the default case folding of attribute names in matching.
    pub fn attributes_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.attributes_case_sensitive = case_sensitive;
        self
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn get_db_file_path(&self) -> &Path {
        &self.db_file_path
    }

    pub fn get_schema_prefix(&self) -> &str {
        &self.schema_prefix
    }

    pub fn get_data_prefix(&self) -> &str {
        &self.data_prefix
    }

    pub fn is_attributes_case_sensitive(&self) -> bool {
        self.attributes_case_sensitive
    }
}
