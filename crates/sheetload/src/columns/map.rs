//! Field name to cell index lookup.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{Result, SheetloadError};

use super::spec::HeaderSpec;

/// Decoded field values of one row, in declaration order.
///
/// Every declared field has an entry; `None` means the cell was absent.
pub type FieldValues = IndexMap<String, Option<String>>;

/// Immutable lookup from field name to zero-based cell index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    fields: IndexMap<String, usize>,
}

impl ColumnMap {
    /// Build a column map from a header specification.
    ///
    /// Fails with a configuration error when the specification is empty,
    /// names a field twice, has a blank field name, or aliases two fields to
    /// the same cell.
    pub fn new(spec: &HeaderSpec) -> Result<Self> {
        if spec.is_empty() {
            return Err(SheetloadError::config(
                "header specification declares no columns",
            ));
        }

        let mut fields = IndexMap::with_capacity(spec.len());
        match spec {
            HeaderSpec::Ordered(names) => {
                for (index, name) in names.iter().enumerate() {
                    check_name(name)?;
                    if fields.insert(name.clone(), index).is_some() {
                        return Err(SheetloadError::config(format!(
                            "column '{}' is declared more than once",
                            name
                        )));
                    }
                }
            }
            HeaderSpec::Indexed(pairs) => {
                let mut taken: HashMap<usize, &str> = HashMap::new();
                for (name, &index) in pairs {
                    check_name(name)?;
                    if let Some(other) = taken.insert(index, name) {
                        return Err(SheetloadError::config(format!(
                            "columns '{}' and '{}' both map to cell {}",
                            other, name, index
                        )));
                    }
                    fields.insert(name.clone(), index);
                }
            }
        }

        Ok(Self { fields })
    }

    /// Cell index of a field.
    pub fn index(&self, field: &str) -> Option<usize> {
        self.fields.get(field).copied()
    }

    /// Returns true if the field is declared.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Declared field names in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|s| s.as_str())
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a constructed map; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Minimum number of cells a row needs to populate every field.
    pub fn width(&self) -> usize {
        self.fields.values().max().map(|i| i + 1).unwrap_or(0)
    }

    /// Map raw cell values to field values.
    ///
    /// A field whose index lies past the end of `raw` decodes to `None`;
    /// presence is enforced later by field rules.
    ///
    /// ```
    /// use sheetload::{ColumnMap, HeaderSpec};
    ///
    /// let map = ColumnMap::new(&HeaderSpec::ordered(["username", "email"])).unwrap();
    /// let values = map.decode(&["alice"]);
    /// assert_eq!(values["username"].as_deref(), Some("alice"));
    /// assert_eq!(values["email"], None);
    /// ```
    pub fn decode<S: AsRef<str>>(&self, raw: &[S]) -> FieldValues {
        self.fields
            .iter()
            .map(|(name, &index)| {
                let value = raw.get(index).map(|s| s.as_ref().to_string());
                (name.clone(), value)
            })
            .collect()
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SheetloadError::config("column names must not be blank"));
    }
    Ok(())
}
