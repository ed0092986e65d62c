use crate::common::Record;
use crate::criteria::Criteria;

/// Options controlling how the matcher resolves attribute names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Disables the default lower-casing of attribute names on both sides.
    pub attributes_case_sensitive: bool,
}

impl Criteria {
    /// Evaluates this criteria tree against a record.
    ///
    /// Pure and deterministic; no store access happens here. Logical nodes
    /// short-circuit: an empty `and` is vacuously true, an empty `or` never
    /// matches.
    ///
    /// A field whose stored value is falsy (0, 0.0, false, the empty string,
    /// null) is treated as if the field were absent: neither `Equals` nor
    /// `Like` will ever match it, even against its own stored value. Callers
    /// that need to query such values must model them differently (for
    /// example as strings).
    pub fn matches(&self, record: &Record, options: &MatchOptions) -> bool {
        match self {
            Criteria::All => true,
            Criteria::And(terms) => terms.iter().all(|term| term.matches(record, options)),
            Criteria::Or(terms) => terms.iter().any(|term| term.matches(record, options)),
            Criteria::Not(inner) => !inner.matches(record, options),
            Criteria::Equals(attr, expected) => {
                match record.lookup(attr, options.attributes_case_sensitive) {
                    Some(actual) if actual.is_truthy() => actual == expected,
                    _ => false,
                }
            }
            Criteria::Like(pairs) => pairs.iter().all(|(attr, needle)| {
                match record.lookup(attr, options.attributes_case_sensitive) {
                    Some(value) if value.is_truthy() => value
                        .as_str()
                        .map(|s| s.contains(needle.as_str()))
                        .unwrap_or(false),
                    _ => false,
                }
            }),
        }
    }
}
