use crate::common::Value;
use indexmap::IndexMap;
use std::fmt::{Debug, Display, Formatter};

/// Represents a single row of a collection.
///
/// A record is an ordered mapping from attribute name to [Value]. Field
/// insertion order is preserved so a stored row round-trips byte-for-byte.
/// Records have no intrinsic identity beyond application-assigned fields
/// (typically an auto-incremented `id`).
///
/// Mutation is always whole-record replace-by-extend: [Record::merge] shallow
/// merges another record's fields over this one, which is how `update`
/// applies its patch.
#[derive(Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Record {
    data: IndexMap<String, Value>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Record {
            data: IndexMap::new(),
        }
    }

    /// Checks if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of fields in the record.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Associates the specified [Value] with the specified attribute name.
    ///
    /// If the attribute already exists its value is replaced in place,
    /// preserving its position in the field order.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Returns the value for the attribute, or `None` if absent.
    ///
    /// Lookup is exact; use [Record::lookup] for configurable case folding.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Returns the value for the attribute under the configured
    /// case-sensitivity rule.
    ///
    /// With `case_sensitive` set this is an exact lookup. Otherwise attribute
    /// names are lower-cased on both sides, so a record field `Name` is found
    /// by the key `name` and vice versa. The first field whose folded name
    /// matches wins.
    pub fn lookup(&self, key: &str, case_sensitive: bool) -> Option<&Value> {
        if case_sensitive {
            return self.data.get(key);
        }
        let folded = key.to_lowercase();
        self.data
            .iter()
            .find(|(name, _)| name.to_lowercase() == folded)
            .map(|(_, value)| value)
    }

    /// Checks whether the record has the attribute (exact match).
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes the attribute and returns its value, if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    /// Shallow-merges another record's fields over this one.
    ///
    /// Every field of `other` is written into this record, replacing any
    /// existing value for the same attribute name. Fields not mentioned in
    /// `other` are left untouched.
    pub fn merge(&mut self, other: &Record) {
        for (key, value) in other.iter() {
            self.data.insert(key.clone(), value.clone());
        }
    }

    /// Iterates over the attribute names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "\"{}\": {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl Debug for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Record {
            data: iter.into_iter().collect(),
        }
    }
}

/// Builds a [Record] literal.
///
/// ```text
/// let rec = record! { "name" => "Ann", "age" => 30 };
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::common::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut rec = $crate::common::Record::new();
        $(rec.put($key, $value);)+
        rec
    }};
}
