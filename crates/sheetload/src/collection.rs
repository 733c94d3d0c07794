//! The batch of rows processed by one import.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::persist::RecordError;
use crate::row::{FieldErrors, Row};

/// Message attached by [`RowCollection::check_unique`].
pub const UNIQUE_MESSAGE: &str = "is unique";

/// Ordered rows plus the batch's first failure.
///
/// Once a row is recorded as the invalid row it stays recorded for the life
/// of the collection: later checks never replace or clear it, so the reported
/// failure does not depend on how often validity is queried.
#[derive(Debug, Clone, Default)]
pub struct RowCollection {
    rows: Vec<Row>,
    invalid_row: Option<usize>,
    records_written: usize,
}

/// Serializable outcome of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_rows: usize,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_row_number: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub messages: Vec<String>,
    pub records_written: usize,
}

impl RowCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row, validating it; an invalid row becomes the collection's
    /// invalid row if none is recorded yet. Returns the row's index.
    pub fn append(&mut self, mut row: Row) -> usize {
        let index = self.rows.len();
        row.set_position(index);
        let valid = row.is_valid();
        self.rows.push(row);
        if !valid {
            self.flag_invalid(index);
        }
        index
    }

    /// Validity of the whole batch.
    ///
    /// False once an invalid row is recorded. Otherwise every row is
    /// re-checked and the first one found invalid is recorded.
    pub fn is_valid(&mut self) -> bool {
        if self.invalid_row.is_some() {
            return false;
        }
        for (index, row) in self.rows.iter_mut().enumerate() {
            if !row.is_valid() {
                self.invalid_row = Some(index);
                return false;
            }
        }
        true
    }

    pub fn is_invalid(&mut self) -> bool {
        !self.is_valid()
    }

    /// Record `index` as the invalid row unless one is already recorded.
    ///
    /// Returns true if this call recorded it.
    pub fn flag_invalid(&mut self, index: usize) -> bool {
        if self.invalid_row.is_some() || index >= self.rows.len() {
            return false;
        }
        self.invalid_row = Some(index);
        true
    }

    /// Attach a store rejection to a row and flag it.
    pub fn reject(&mut self, index: usize, error: RecordError) {
        if let Some(row) = self.rows.get_mut(index) {
            row.set_record_with_error(error);
            self.flag_invalid(index);
        }
    }

    /// The recorded invalid row.
    pub fn invalid_row(&self) -> Option<&Row> {
        self.invalid_row.and_then(|i| self.rows.get(i))
    }

    pub fn invalid_index(&self) -> Option<usize> {
        self.invalid_row
    }

    /// Error set of the invalid row, empty when none is recorded.
    pub fn errors(&self) -> FieldErrors {
        self.invalid_row()
            .map(|row| row.errors().clone())
            .unwrap_or_default()
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors().full_messages()
    }

    /// Flag the first row repeating an earlier row's value of `field`.
    ///
    /// Rows are compared in append order, so the later duplicate is the one
    /// flagged. Blank values are ignored. Returns the flagged index.
    pub fn check_unique(&mut self, field: &str) -> Option<usize> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut duplicate = None;
        for (index, row) in self.rows.iter().enumerate() {
            let Some(value) = row.get(field).map(str::trim).filter(|v| !v.is_empty()) else {
                continue;
            };
            if seen.insert(value, index).is_some() {
                duplicate = Some(index);
                break;
            }
        }

        let index = duplicate?;
        self.rows[index].add_error(field, UNIQUE_MESSAGE);
        self.flag_invalid(index);
        Some(index)
    }

    /// Rows other than the one at `index`, in append order.
    pub fn siblings(&self, index: usize) -> impl Iterator<Item = &Row> {
        self.rows
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != index)
            .map(|(_, row)| row)
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Row> {
        self.rows.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Records committed by the persistence phase, counting each entity of
    /// each row once, including records reused through a lookup.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub(crate) fn set_records_written(&mut self, count: usize) {
        self.records_written = count;
    }

    /// Summarize the batch as of its last validation.
    pub fn summary(&self) -> BatchSummary {
        let invalid = self.invalid_row();
        BatchSummary {
            total_rows: self.rows.len(),
            valid: invalid.is_none(),
            invalid_row_number: invalid.and_then(Row::row_number),
            messages: self.full_messages(),
            records_written: self.records_written,
        }
    }
}

impl<'a> IntoIterator for &'a RowCollection {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
