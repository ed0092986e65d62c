use crate::common::{Record, Value};
use crate::errors::{DirtyError, DirtyResult, ErrorKind};
use std::fmt::{Debug, Display, Formatter};

const OP_OR: &str = "or";
const OP_AND: &str = "and";
const OP_NOT: &str = "not";
const OP_LIKE: &str = "like";

/// A typed criteria tree.
///
/// Built by [Criteria::parse] from a raw `where` mapping; evaluated by
/// [Criteria::matches](crate::criteria::Criteria::matches). Multiple keys at
/// one level of a raw mapping form a conjunction, so they parse into an
/// [Criteria::And] node.
#[derive(Clone, PartialEq)]
pub enum Criteria {
    /// Matches every record. Produced by an absent or empty `where` clause.
    All,
    /// Strict equality on one attribute, no type coercion.
    Equals(String, Value),
    /// Every sub-tree must match. Empty list is vacuously true.
    And(Vec<Criteria>),
    /// At least one sub-tree must match. Empty list never matches.
    Or(Vec<Criteria>),
    /// The sub-tree must not match.
    Not(Box<Criteria>),
    /// Substring containment per attribute; all pairs must hold.
    Like(Vec<(String, String)>),
}

impl Criteria {
    /// Parses a raw `where` mapping into a typed criteria tree.
    ///
    /// An absent or empty mapping parses to [Criteria::All]. Each top-level
    /// key becomes one criterion and multiple keys combine into an implicit
    /// conjunction. Operator keys are compared case-insensitively; their
    /// values must be shaped as follows or parsing fails with
    /// [ErrorKind::InvalidCriteria]:
    ///
    /// * `or` / `and` - an array of sub-mappings
    /// * `not` - a sub-mapping
    /// * `like` - a mapping from attribute name to substring
    ///
    /// Any other key is an attribute name and its value is the equality
    /// criterion.
    pub fn parse(where_clause: Option<&Record>) -> DirtyResult<Criteria> {
        let Some(clause) = where_clause else {
            return Ok(Criteria::All);
        };
        if clause.is_empty() {
            return Ok(Criteria::All);
        }

        let mut terms = Vec::with_capacity(clause.len());
        for (key, value) in clause.iter() {
            terms.push(Self::parse_entry(key, value)?);
        }
        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(Criteria::And(terms))
        }
    }

    fn parse_entry(key: &str, value: &Value) -> DirtyResult<Criteria> {
        match key.to_lowercase().as_str() {
            OP_OR => Ok(Criteria::Or(Self::parse_branches(OP_OR, value)?)),
            OP_AND => Ok(Criteria::And(Self::parse_branches(OP_AND, value)?)),
            OP_NOT => {
                let sub = value.as_record().ok_or_else(|| {
                    DirtyError::new(
                        &format!(
                            "'not' expects a criteria mapping, found {}",
                            value.type_name()
                        ),
                        ErrorKind::InvalidCriteria,
                    )
                })?;
                Ok(Criteria::Not(Box::new(Self::parse(Some(sub))?)))
            }
            OP_LIKE => Self::parse_like(value),
            _ => Ok(Criteria::Equals(key.to_string(), value.clone())),
        }
    }

    fn parse_branches(op: &str, value: &Value) -> DirtyResult<Vec<Criteria>> {
        let items = value.as_array().ok_or_else(|| {
            DirtyError::new(
                &format!(
                    "'{}' expects an array of criteria mappings, found {}",
                    op,
                    value.type_name()
                ),
                ErrorKind::InvalidCriteria,
            )
        })?;

        items
            .iter()
            .map(|item| {
                let sub = item.as_record().ok_or_else(|| {
                    DirtyError::new(
                        &format!(
                            "'{}' branch is not a criteria mapping, found {}",
                            op,
                            item.type_name()
                        ),
                        ErrorKind::InvalidCriteria,
                    )
                })?;
                Self::parse(Some(sub))
            })
            .collect()
    }

    fn parse_like(value: &Value) -> DirtyResult<Criteria> {
        let mapping = value.as_record().ok_or_else(|| {
            DirtyError::new(
                &format!(
                    "'like' expects a mapping of attribute to substring, found {}",
                    value.type_name()
                ),
                ErrorKind::InvalidCriteria,
            )
        })?;

        let mut pairs = Vec::with_capacity(mapping.len());
        for (attr, needle) in mapping.iter() {
            let needle = needle.as_str().ok_or_else(|| {
                DirtyError::new(
                    &format!(
                        "'like' substring for attribute '{}' is not a string, found {}",
                        attr,
                        needle.type_name()
                    ),
                    ErrorKind::InvalidCriteria,
                )
            })?;
            pairs.push((attr.clone(), needle.to_string()));
        }
        Ok(Criteria::Like(pairs))
    }
}

impl Display for Criteria {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Criteria::All => write!(f, "(all)"),
            Criteria::Equals(attr, value) => write!(f, "({} == {})", attr, value),
            Criteria::And(terms) => {
                let joined: Vec<String> = terms.iter().map(|t| format!("{}", t)).collect();
                write!(f, "({})", joined.join(" && "))
            }
            Criteria::Or(terms) => {
                let joined: Vec<String> = terms.iter().map(|t| format!("{}", t)).collect();
                write!(f, "({})", joined.join(" || "))
            }
            Criteria::Not(inner) => write!(f, "(not {})", inner),
            Criteria::Like(pairs) => {
                let joined: Vec<String> = pairs
                    .iter()
                    .map(|(attr, needle)| format!("{} ~ \"{}\"", attr, needle))
                    .collect();
                write!(f, "(like {})", joined.join(" && "))
            }
        }
    }
}

impl Debug for Criteria {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}
