//! Row types declared in JSON instead of code.
//!
//! A definition names the columns, the field rules, the fields that must be
//! unique across the batch, and the ordered destination entities with the
//! source of each of their fields:
//!
//! ```json
//! {
//!   "name": "employees",
//!   "columns": ["enterprise", "name", "email"],
//!   "rules": { "email": ["required", "email"] },
//!   "unique": ["email"],
//!   "entities": [
//!     { "name": "enterprises", "fields": { "name": "enterprise" }, "lookup": "name" },
//!     { "name": "employees",
//!       "fields": { "name": "name", "email": "email", "enterprise_id": { "ref": "enterprises" } } }
//!   ]
//! }
//! ```

mod row_type;
mod template;

pub use row_type::DeclarativeRowType;
pub use template::template;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SheetloadError};

fn default_starting_row() -> usize {
    2
}

/// Serialized form of a declarative row type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetDefinition {
    pub name: String,

    /// An array of field names or an object of field name to column index.
    pub columns: Value,

    #[serde(default = "default_starting_row")]
    pub starting_row: usize,

    #[serde(default)]
    pub rules: IndexMap<String, Vec<RuleSpec>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique: Vec<String>,

    #[serde(default)]
    pub entities: Vec<EntitySpec>,
}

impl SheetDefinition {
    /// Load a definition from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| SheetloadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            SheetloadError::config(format!(
                "Failed to parse sheet definition '{}': {}",
                path.display(),
                e
            ))
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A field rule as written in a definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Named(NamedRule),
    Pattern { pattern: String },
    Length { length: LengthBounds },
    OneOf { one_of: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedRule {
    Required,
    Email,
    Integer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

/// One destination entity and where each of its fields comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub name: String,

    /// Destination field to source. Empty means every row field.
    #[serde(default)]
    pub fields: IndexMap<String, SourceSpec>,

    /// Destination field identifying an existing record. When set, a record
    /// with the same value is reused instead of writing a new one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<String>,
}

/// Source of one destination field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceSpec {
    /// A row field, by name.
    Field(String),
    /// The id written for an earlier entity of the same row.
    Ref {
        #[serde(rename = "ref")]
        entity: String,
    },
    /// A constant.
    Literal { literal: Value },
}
