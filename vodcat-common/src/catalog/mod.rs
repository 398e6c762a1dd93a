//! Catalog records and the store abstraction
//!
//! A catalog table holds one record per technique. Records are located by
//! attribute equality (a scan, not a keyed lookup) and written back whole,
//! conditional on the version that was read.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::{Error, Result};

mod memory;
mod sqlite;

pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;

/// Attribute names as persisted (case-sensitive)
pub mod attr {
    pub const NUMBER: &str = "Number";
    pub const SET: &str = "Set";
    pub const WEAPON: &str = "Weapon";
    pub const DRILL_TYPE: &str = "DrillType";
    pub const ENTER: &str = "Enter";
    pub const GROUND_FLOW_NUMBER: &str = "GroundFlowNumber";
    pub const LETTER: &str = "Letter";
    pub const NAME: &str = "Name";
    pub const VARIATIONS: &str = "Variations";
}

/// Which attribute family a deployment's catalog is keyed by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScheme {
    /// Numeric and qualified indexes (`Number`, `Set`, `Weapon`, ...)
    #[default]
    Indexed,
    /// Techniques keyed by `Name`
    Named,
}

impl KeyScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyScheme::Indexed => "indexed",
            KeyScheme::Named => "named",
        }
    }
}

impl fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KeyScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "indexed" => Ok(KeyScheme::Indexed),
            "named" => Ok(KeyScheme::Named),
            other => Err(Error::Config(format!("Unknown key scheme: {}", other))),
        }
    }
}

/// One attribute-equality clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub attribute: &'static str,
    pub value: String,
}

/// Conjunction of attribute-equality clauses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Single-clause predicate `attribute == value`
    pub fn eq(attribute: &'static str, value: impl Into<String>) -> Self {
        Self {
            clauses: vec![Clause {
                attribute,
                value: value.into(),
            }],
        }
    }

    /// Add `AND attribute == value`
    pub fn and(mut self, attribute: &'static str, value: impl Into<String>) -> Self {
        self.clauses.push(Clause {
            attribute,
            value: value.into(),
        });
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Value required for `attribute`, if the predicate constrains it
    pub fn value_of(&self, attribute: &str) -> Option<&str> {
        self.clauses
            .iter()
            .find(|c| c.attribute == attribute)
            .map(|c| c.value.as_str())
    }

    /// True if every clause matches a string attribute of `attributes`
    pub fn matches(&self, attributes: &Map<String, Value>) -> bool {
        self.clauses.iter().all(|c| {
            attributes
                .get(c.attribute)
                .and_then(Value::as_str)
                .is_some_and(|v| v == c.value)
        })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{} == {:?}", clause.attribute, clause.value)?;
        }
        Ok(())
    }
}

/// A catalog record: primary attributes plus the ordered variation list
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    /// Primary key, assigned by whoever created the record
    pub id: String,
    /// Write counter; a put succeeds only against this version
    pub version: i64,
    /// Every attribute except `Variations`
    pub attributes: Map<String, Value>,
    /// Reference URLs of all known media variants
    pub variations: Vec<String>,
}

impl CatalogRecord {
    pub fn new(id: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            version: 0,
            attributes,
            variations: Vec::new(),
        }
    }

    /// Split a stored attribute document into attributes and variations
    ///
    /// A missing `Variations` attribute reads as an empty list.
    pub fn from_document(id: String, version: i64, mut document: Map<String, Value>) -> Result<Self> {
        let variations = match document.remove(attr::VARIATIONS) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(Error::InvalidInput(format!(
                        "Record {}: non-string variation {}",
                        id, other
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(Error::InvalidInput(format!(
                    "Record {}: Variations is not a list: {}",
                    id, other
                )))
            }
        };

        Ok(Self {
            id,
            version,
            attributes: document,
            variations,
        })
    }

    /// Full attribute document as persisted, `Variations` included
    pub fn to_document(&self) -> Map<String, Value> {
        let mut document = self.attributes.clone();
        document.insert(
            attr::VARIATIONS.to_string(),
            Value::Array(self.variations.iter().cloned().map(Value::String).collect()),
        );
        document
    }
}

/// Catalog storage backend
///
/// Implementations must make `put` conditional: it succeeds only when the
/// stored version still equals `record.version`, and returns the new version.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All records of `table` matching `predicate`
    async fn scan(&self, table: &str, predicate: &Predicate) -> Result<Vec<CatalogRecord>>;

    /// Write the whole record back by primary key
    async fn put(&self, table: &str, record: &CatalogRecord) -> Result<i64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_predicate_display() {
        let p = Predicate::eq(attr::ENTER, "inside").and(attr::NUMBER, "2");
        assert_eq!(p.to_string(), r#"Enter == "inside" AND Number == "2""#);
        assert_eq!(p.value_of(attr::NUMBER), Some("2"));
        assert_eq!(p.value_of(attr::SET), None);
    }

    #[test]
    fn test_predicate_matches_strings_only() {
        let p = Predicate::eq(attr::NUMBER, "3");
        assert!(p.matches(&attrs(json!({"Number": "3", "Title": "x"}))));
        assert!(!p.matches(&attrs(json!({"Number": "4"}))));
        assert!(!p.matches(&attrs(json!({"Number": 3}))));
        assert!(!p.matches(&attrs(json!({}))));
    }

    #[test]
    fn test_document_split_and_join() {
        let doc = attrs(json!({"Number": "1", "Variations": ["https://h/a/dn1.m3u8"]}));
        let record = CatalogRecord::from_document("r1".into(), 2, doc.clone()).unwrap();
        assert_eq!(record.variations, vec!["https://h/a/dn1.m3u8".to_string()]);
        assert!(!record.attributes.contains_key(attr::VARIATIONS));
        assert_eq!(record.to_document(), doc);
    }

    #[test]
    fn test_document_missing_variations_is_empty() {
        let record = CatalogRecord::from_document("r1".into(), 0, attrs(json!({"Number": "1"}))).unwrap();
        assert!(record.variations.is_empty());
    }

    #[test]
    fn test_document_rejects_bad_variations() {
        let result = CatalogRecord::from_document("r1".into(), 0, attrs(json!({"Variations": "x"})));
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = CatalogRecord::from_document("r1".into(), 0, attrs(json!({"Variations": [1]})));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_key_scheme_parse() {
        assert_eq!("indexed".parse::<KeyScheme>().unwrap(), KeyScheme::Indexed);
        assert_eq!("Named".parse::<KeyScheme>().unwrap(), KeyScheme::Named);
        assert!("numbered".parse::<KeyScheme>().is_err());
        assert_eq!(KeyScheme::default(), KeyScheme::Indexed);
    }
}
