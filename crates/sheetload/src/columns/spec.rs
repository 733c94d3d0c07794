//! Header specifications declared by row types.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, SheetloadError};

/// How a row type names the cells of a physical row.
///
/// Either an ordered list of field names (field `i` reads cell `i`) or an
/// explicit field name to zero-based cell index association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderSpec {
    /// `[f0, f1, ..., fn]` maps `fi` to cell `i`.
    Ordered(Vec<String>),
    /// Field name to cell index, used as-is.
    Indexed(IndexMap<String, usize>),
}

impl HeaderSpec {
    /// Build an ordered specification from field names.
    ///
    /// ```
    /// use sheetload::HeaderSpec;
    ///
    /// let spec = HeaderSpec::ordered(["username", "email", "gender"]);
    /// assert_eq!(spec.len(), 3);
    /// ```
    pub fn ordered<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HeaderSpec::Ordered(fields.into_iter().map(Into::into).collect())
    }

    /// Build an indexed specification from `(field, index)` pairs.
    pub fn indexed<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        HeaderSpec::Indexed(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Interpret an untyped JSON value as a header specification.
    ///
    /// Arrays must hold strings; objects must map to non-negative integers.
    /// Any other shape is a configuration error.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => {
                let mut fields = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(name) => fields.push(name.clone()),
                        other => {
                            return Err(SheetloadError::config(format!(
                                "column names must be strings, found {}",
                                other
                            )));
                        }
                    }
                }
                Ok(HeaderSpec::Ordered(fields))
            }
            Value::Object(map) => {
                let mut fields = IndexMap::with_capacity(map.len());
                for (name, index) in map {
                    let index = index
                        .as_u64()
                        .and_then(|i| usize::try_from(i).ok())
                        .ok_or_else(|| {
                            SheetloadError::config(format!(
                                "column '{}' must map to a non-negative integer index, found {}",
                                name, index
                            ))
                        })?;
                    fields.insert(name.clone(), index);
                }
                Ok(HeaderSpec::Indexed(fields))
            }
            other => Err(SheetloadError::config(format!(
                "columns must be an array of names or an object of name to index, found {}",
                json_kind(other)
            ))),
        }
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        match self {
            HeaderSpec::Ordered(fields) => fields.len(),
            HeaderSpec::Indexed(fields) => fields.len(),
        }
    }

    /// Returns true if no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
