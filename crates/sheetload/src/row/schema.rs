//! Compiled per-row-type metadata shared by every row of a batch.

use std::sync::Arc;

use crate::columns::{ColumnMap, HeaderSpec};
use crate::error::{Result, SheetloadError};
use crate::row_type::RowType;

use super::rules::FieldRule;

/// Column map and field rules of a row type, built once per import.
#[derive(Debug, Clone)]
pub struct RowSchema {
    name: String,
    columns: ColumnMap,
    rules: Vec<FieldRule>,
}

impl RowSchema {
    /// Build a schema, checking that every rule names a declared field.
    pub fn new(
        name: impl Into<String>,
        header: &HeaderSpec,
        rules: Vec<FieldRule>,
    ) -> Result<Self> {
        let name = name.into();
        let columns = ColumnMap::new(header)?;

        if let Some(rule) = rules.iter().find(|r| !columns.contains(&r.field)) {
            return Err(SheetloadError::config(format!(
                "{}: rule {:?} refers to undeclared column '{}'",
                name, rule.check, rule.field
            )));
        }

        Ok(Self {
            name,
            columns,
            rules,
        })
    }

    /// Compile the schema of a row type.
    ///
    /// Fails with a configuration error when the row type declares no
    /// header specification.
    pub fn for_row_type<R: RowType + ?Sized>(row_type: &R) -> Result<Arc<Self>> {
        let name = row_type.name();
        let header = row_type.header_spec().ok_or_else(|| {
            SheetloadError::config(format!("{} declares no header specification", name))
        })?;
        Ok(Arc::new(Self::new(name, &header, row_type.rules())?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}
