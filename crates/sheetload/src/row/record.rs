//! A single decoded row.

use std::sync::Arc;

use crate::columns::FieldValues;
use crate::error::{Result, SheetloadError};
use crate::persist::RecordError;

use super::errors::{BASE, FieldErrors};
use super::schema::RowSchema;

/// One line of input, decoded into named fields.
///
/// Validation is recomputed on every [`Row::is_valid`] call. Errors added by
/// cross-row rules and a rejected record injected by the persistence phase
/// are kept separately and folded back in on each pass.
#[derive(Debug, Clone)]
pub struct Row {
    schema: Arc<RowSchema>,
    row_number: Option<usize>,
    fields: FieldValues,
    errors: FieldErrors,
    cross_row_errors: FieldErrors,
    record_with_error: Option<RecordError>,
    /// Index in the owning collection; never an owning reference.
    position: Option<usize>,
}

impl Row {
    /// Decode a raw cell sequence through the schema's column map.
    pub fn from_cells<S: AsRef<str>>(schema: &Arc<RowSchema>, row_number: usize, cells: &[S]) -> Self {
        Self::with_values(schema, Some(row_number), schema.columns().decode(cells))
    }

    /// Build a row from a field mapping.
    ///
    /// Keys not declared by the schema are rejected; declared fields missing
    /// from the mapping are absent.
    pub fn from_fields<I, K, V>(schema: &Arc<RowSchema>, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values: FieldValues = schema
            .columns()
            .fields()
            .map(|f| (f.to_string(), None))
            .collect();

        for (key, value) in fields {
            let key = key.into();
            match values.get_mut(&key) {
                Some(slot) => *slot = Some(value.into()),
                None => {
                    return Err(SheetloadError::config(format!(
                        "{} has no column named '{}'",
                        schema.name(),
                        key
                    )));
                }
            }
        }

        Ok(Self::with_values(schema, None, values))
    }

    fn with_values(schema: &Arc<RowSchema>, row_number: Option<usize>, fields: FieldValues) -> Self {
        Self {
            schema: Arc::clone(schema),
            row_number,
            fields,
            errors: FieldErrors::new(),
            cross_row_errors: FieldErrors::new(),
            record_with_error: None,
            position: None,
        }
    }

    /// Set the physical row number.
    pub fn with_row_number(mut self, row_number: usize) -> Self {
        self.row_number = Some(row_number);
        self
    }

    /// 1-based physical row number, when the row came from a source.
    pub fn row_number(&self) -> Option<usize> {
        self.row_number
    }

    /// Value of a field, `None` when absent or undeclared.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_deref())
    }

    pub fn fields(&self) -> &FieldValues {
        &self.fields
    }

    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    /// Index of this row in its owning collection.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = Some(position);
    }

    /// Compute the row's errors without storing them.
    ///
    /// Rules run in declaration order and every violation is collected.
    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for rule in self.schema.rules() {
            if let Some(message) = rule.apply(self.get(&rule.field)) {
                errors.add(rule.field.clone(), message);
            }
        }
        errors.merge(&self.cross_row_errors);
        if let Some(record) = &self.record_with_error {
            for message in &record.messages {
                errors.add(BASE, message.clone());
            }
        }
        errors
    }

    /// Re-run validation, replacing the stored error set.
    pub fn is_valid(&mut self) -> bool {
        self.errors = self.check();
        self.errors.is_empty()
    }

    pub fn is_invalid(&mut self) -> bool {
        !self.is_valid()
    }

    /// Errors as of the last validation pass.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Attach an error found by a cross-row rule.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        self.errors.add(field.clone(), message.clone());
        self.cross_row_errors.add(field, message);
    }

    /// Attach the rejection reported by the store for this row's record.
    pub fn set_record_with_error(&mut self, record: RecordError) {
        for message in &record.messages {
            self.errors.add(BASE, message.clone());
        }
        self.record_with_error = Some(record);
    }

    pub fn record_with_error(&self) -> Option<&RecordError> {
        self.record_with_error.as_ref()
    }
}
