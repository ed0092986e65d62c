use crate::common::{Record, Value};
use crate::errors::{DirtyError, DirtyResult, ErrorKind};
use indexmap::IndexMap;
use std::fmt::{Debug, Display, Formatter};

/// Descriptor for a single schema attribute.
///
/// The adapter recognizes the `autoIncrement` flag, which marks a field whose
/// value is assigned by the collection counter rather than supplied by the
/// caller. Other descriptor fields (such as a declared type) are stored and
/// round-tripped but not enforced; schema validation is out of scope for this
/// adapter.
#[derive(Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AttributeDef {
    /// Value is assigned by the collection's counter on create.
    #[serde(rename = "autoIncrement", default)]
    pub auto_increment: bool,
    /// Declared attribute type, carried but not enforced.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub attr_type: Option<String>,
}

impl AttributeDef {
    /// Creates a plain attribute descriptor.
    pub fn new() -> Self {
        AttributeDef::default()
    }

    /// Creates an auto-increment attribute descriptor.
    pub fn auto_increment() -> Self {
        AttributeDef {
            auto_increment: true,
            attr_type: None,
        }
    }

    /// Sets the declared attribute type.
    pub fn with_type(mut self, attr_type: &str) -> Self {
        self.attr_type = Some(attr_type.to_string());
        self
    }
}

impl Debug for AttributeDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeDef")
            .field("auto_increment", &self.auto_increment)
            .field("attr_type", &self.attr_type)
            .finish()
    }
}

/// Schema of a collection: an ordered mapping from attribute name to
/// [AttributeDef].
///
/// Schemas are stored under `"<schema_prefix><collection>"` as a single store
/// value, independent of the collection's row set. The presence of the
/// `createdAt` / `updatedAt` attribute names triggers automatic timestamping
/// on create.
#[derive(Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Schema {
    attributes: IndexMap<String, AttributeDef>,
}

impl Schema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Schema {
            attributes: IndexMap::new(),
        }
    }

    /// Adds an attribute, replacing any existing descriptor with the same name.
    pub fn with_attribute(mut self, name: &str, def: AttributeDef) -> Self {
        self.attributes.insert(name.to_string(), def);
        self
    }

    /// Returns the descriptor for the attribute, if declared.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.get(name)
    }

    /// Checks whether the schema declares the attribute.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Iterates over declared attribute names in insertion order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &String> {
        self.attributes.keys()
    }

    /// Iterates over `(name, descriptor)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeDef)> {
        self.attributes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Shallow-merges new attribute definitions over the existing ones.
    ///
    /// This is the `alter` semantics: descriptors in `other` replace same-named
    /// descriptors wholesale, attributes only present here are kept.
    pub fn merge(&mut self, other: &Schema) {
        for (name, def) in other.iter() {
            self.attributes.insert(name.clone(), def.clone());
        }
    }

    /// Encodes the schema as a store [Value].
    ///
    /// Each attribute becomes a nested record carrying its descriptor flags,
    /// so the stored shape mirrors the schema object a caller would pass in.
    pub fn to_value(&self) -> Value {
        let mut schema_record = Record::new();
        for (name, def) in self.iter() {
            let mut descriptor = Record::new();
            if def.auto_increment {
                descriptor.put("autoIncrement", true);
            }
            if let Some(attr_type) = &def.attr_type {
                descriptor.put("type", attr_type.as_str());
            }
            schema_record.put(name.clone(), Value::Record(descriptor));
        }
        Value::Record(schema_record)
    }

    /// Decodes a schema from a store [Value].
    pub fn from_value(value: &Value) -> DirtyResult<Schema> {
        let record = value.as_record().ok_or_else(|| {
            DirtyError::new(
                &format!("Stored schema is not a record (found {})", value.type_name()),
                ErrorKind::EncodingError,
            )
        })?;

        let mut schema = Schema::new();
        for (name, descriptor) in record.iter() {
            let descriptor = descriptor.as_record().ok_or_else(|| {
                DirtyError::new(
                    &format!(
                        "Descriptor for attribute '{}' is not a record (found {})",
                        name,
                        descriptor.type_name()
                    ),
                    ErrorKind::EncodingError,
                )
            })?;

            let auto_increment = descriptor
                .get("autoIncrement")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let attr_type = descriptor
                .get("type")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());

            schema.attributes.insert(
                name.clone(),
                AttributeDef {
                    auto_increment,
                    attr_type,
                },
            );
        }
        Ok(schema)
    }
}

impl Debug for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.attributes.iter()).finish()
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}
