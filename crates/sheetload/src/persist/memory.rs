//! In-memory store with presence and uniqueness constraints.

use indexmap::IndexMap;
use serde_json::Value;

use crate::row_type::{Entity, Payload};

use super::store::{RecordError, RecordId, Store, WriteError};

/// Constraints of one in-memory table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub required: Vec<String>,
    pub unique: Vec<String>,
}

impl TableSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Reject records where `field` is missing, null or blank.
    pub fn required(mut self, field: impl Into<String>) -> Self {
        self.required.push(field.into());
        self
    }

    /// Reject records repeating an existing non-null value of `field`.
    pub fn unique(mut self, field: impl Into<String>) -> Self {
        self.unique.push(field.into());
        self
    }
}

/// A record held by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub values: Payload,
}

#[derive(Debug, Clone)]
struct Table {
    spec: TableSpec,
    records: Vec<StoredRecord>,
    next_id: RecordId,
}

impl Table {
    fn violations(&self, payload: &Payload) -> Vec<String> {
        let mut messages = Vec::new();
        for field in &self.spec.required {
            if is_blank(payload.get(field)) {
                messages.push(format!("{} can't be blank", field));
            }
        }
        for field in &self.spec.unique {
            let Some(value) = payload.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            if self.records.iter().any(|r| r.values.get(field) == Some(value)) {
                messages.push(format!("{} has already been taken", field));
            }
        }
        messages
    }
}

/// Transactional in-memory store.
///
/// `begin` snapshots every table and `rollback` restores the snapshot.
/// Writing to a table that was never declared is a backend failure, the
/// way a missing table is for a database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: IndexMap<String, Table>,
    snapshot: Option<IndexMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a table.
    pub fn with_table(mut self, spec: TableSpec) -> Self {
        self.add_table(spec);
        self
    }

    pub fn add_table(&mut self, spec: TableSpec) {
        self.tables.insert(
            spec.name.clone(),
            Table {
                spec,
                records: Vec::new(),
                next_id: 1,
            },
        );
    }

    /// Committed and uncommitted records of a table.
    pub fn records(&self, table: &str) -> &[StoredRecord] {
        self.tables
            .get(table)
            .map(|t| t.records.as_slice())
            .unwrap_or(&[])
    }

    pub fn count(&self, table: &str) -> usize {
        self.records(table).len()
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    fn table_mut(&mut self, entity: &Entity) -> Result<&mut Table, WriteError> {
        self.tables
            .get_mut(entity.name())
            .ok_or_else(|| WriteError::Backend(format!("no such table: {}", entity.name())))
    }
}

impl Store for MemoryStore {
    fn begin(&mut self) -> Result<(), WriteError> {
        if self.snapshot.is_some() {
            return Err(WriteError::Backend(
                "a transaction is already open".to_string(),
            ));
        }
        self.snapshot = Some(self.tables.clone());
        Ok(())
    }

    fn write(&mut self, entity: &Entity, payload: &Payload) -> Result<RecordId, WriteError> {
        let table = self.table_mut(entity)?;

        let messages = table.violations(payload);
        if !messages.is_empty() {
            return Err(RecordError::with_messages(entity.name(), messages).into());
        }

        let id = table.next_id;
        table.next_id += 1;
        table.records.push(StoredRecord {
            id,
            values: payload.clone(),
        });
        Ok(id)
    }

    fn find(
        &mut self,
        entity: &Entity,
        field: &str,
        value: &Value,
    ) -> Result<Option<RecordId>, WriteError> {
        let table = self.table_mut(entity)?;
        Ok(table
            .records
            .iter()
            .find(|r| r.values.get(field) == Some(value))
            .map(|r| r.id))
    }

    fn commit(&mut self) -> Result<(), WriteError> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| WriteError::Backend("no transaction is open".to_string()))
    }

    fn rollback(&mut self) -> Result<(), WriteError> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| WriteError::Backend("no transaction is open".to_string()))?;
        self.tables = snapshot;
        Ok(())
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}
