//! The storage boundary consumed by the persistence phase.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::row_type::{Entity, Payload};

/// Identifier assigned by a store to a written record.
pub type RecordId = i64;

/// A record the store refused to write, with the store's reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordError {
    /// Destination entity the record was meant for.
    pub entity: String,
    /// Constraint or validation messages reported by the store.
    pub messages: Vec<String>,
}

impl RecordError {
    pub fn new(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            messages: vec![message.into()],
        }
    }

    pub fn with_messages(entity: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            entity: entity.into(),
            messages,
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.entity, self.messages.join(", "))
    }
}

/// Failure of a storage operation.
#[derive(Debug, Clone, Error)]
pub enum WriteError {
    /// The record violates a destination constraint. Bad data, not a bug.
    #[error("record rejected by {0}")]
    Rejected(RecordError),

    /// The backend itself failed.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<RecordError> for WriteError {
    fn from(error: RecordError) -> Self {
        WriteError::Rejected(error)
    }
}

/// A transactional destination for derived payloads.
///
/// The persistence phase calls `begin` once before the first write and
/// one of `commit` or `rollback` afterwards, plus `rollback` when `commit`
/// fails.
pub trait Store {
    fn begin(&mut self) -> Result<(), WriteError>;

    /// Write one payload, returning the new record's id.
    fn write(&mut self, entity: &Entity, payload: &Payload) -> Result<RecordId, WriteError>;

    /// Look up the first record of `entity` whose `field` equals `value`.
    fn find(
        &mut self,
        entity: &Entity,
        field: &str,
        value: &Value,
    ) -> Result<Option<RecordId>, WriteError>;

    fn commit(&mut self) -> Result<(), WriteError>;

    fn rollback(&mut self) -> Result<(), WriteError>;
}

/// Ids written for one row, keyed by entity name in write order.
///
/// Passed to later payload derivations of the same row so a dependent
/// entity can reference the record created just before it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenRecords {
    ids: IndexMap<String, RecordId>,
}

impl WrittenRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: impl Into<String>, id: RecordId) {
        self.ids.insert(entity.into(), id);
    }

    /// Id written for `entity`, if it has been written yet.
    pub fn get(&self, entity: &str) -> Option<RecordId> {
        self.ids.get(entity).copied()
    }

    /// Most recently written `(entity, id)`.
    pub fn last(&self) -> Option<(&str, RecordId)> {
        self.ids.last().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, RecordId)> {
        self.ids.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
