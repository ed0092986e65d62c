use crate::common::Record;

/// Options accepted by `find`, `update` and `destroy`.
///
/// Only the `where` clause is interpreted. `limit`, `skip` and `order` are
/// part of the accepted surface for compatibility with the calling
/// data-access layer, but the adapter does not implement them: supplying any
/// of them makes the operation fail with
/// [ErrorKind::UnsupportedQueryOption](crate::errors::ErrorKind::UnsupportedQueryOption)
/// instead of silently ignoring the option.
///
/// # Examples
///
/// ```rust,ignore
/// use dirtystore::{record, QueryOptions};
///
/// let options = QueryOptions::new().where_clause(record! { "name" => "Ann" });
/// let everything = QueryOptions::new();
/// ```
#[derive(Clone, Debug, Default)]
pub struct QueryOptions {
    pub(crate) where_clause: Option<Record>,
    pub(crate) limit: Option<u64>,
    pub(crate) skip: Option<u64>,
    pub(crate) order: Option<String>,
}

impl QueryOptions {
    /// Creates options with no criteria: every record matches.
    pub fn new() -> Self {
        QueryOptions::default()
    }

    /// Sets the criteria mapping records must satisfy.
    pub fn where_clause(mut self, clause: Record) -> Self {
        self.where_clause = Some(clause);
        self
    }

    /// Sets a result limit. Accepted but rejected at execution.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets a result offset. Accepted but rejected at execution.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets a result ordering. Accepted but rejected at execution.
    pub fn order(mut self, order: &str) -> Self {
        self.order = Some(order.to_string());
        self
    }

    /// Checks whether any unimplemented pagination/ordering option is set.
    pub fn has_unsupported_options(&self) -> bool {
        self.limit.is_some() || self.skip.is_some() || self.order.is_some()
    }
}

/// Creates `QueryOptions` with the given `where` clause.
pub fn where_clause(clause: Record) -> QueryOptions {
    QueryOptions::new().where_clause(clause)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    #[test]
    fn test_default_has_no_options() {
        let options = QueryOptions::new();
        assert!(options.where_clause.is_none());
        assert!(!options.has_unsupported_options());
    }

    #[test]
    fn test_where_clause_builder() {
        let options = where_clause(record! { "name" => "Ann" });
        assert!(options.where_clause.is_some());
        assert!(!options.has_unsupported_options());
    }

    #[test]
    fn test_unsupported_options_detected() {
        assert!(QueryOptions::new().limit(10).has_unsupported_options());
        assert!(QueryOptions::new().skip(5).has_unsupported_options());
        assert!(QueryOptions::new().order("name").has_unsupported_options());
    }
}
