//! Per-field error sets.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key under which errors that belong to no single field are stored.
pub const BASE: &str = "base";

/// Ordered set of error messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: IndexMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Create an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field. Repeating a message is a no-op.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        let messages = self.errors.entry(field.into()).or_default();
        if !messages.contains(&message) {
            messages.push(message);
        }
    }

    /// Copy every message of `other` into this set.
    pub fn merge(&mut self, other: &FieldErrors) {
        for (field, message) in other.iter() {
            self.add(field, message);
        }
    }

    /// Messages recorded against a field.
    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Returns true if the field has the given message.
    pub fn contains(&self, field: &str, message: &str) -> bool {
        self.get(field).iter().any(|m| m == message)
    }

    /// Fields with at least one message, in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(|s| s.as_str())
    }

    /// All `(field, message)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| (field.as_str(), m.as_str())))
    }

    /// Total number of messages.
    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Human-readable messages, e.g. `"email is required"`.
    ///
    /// Messages stored under [`BASE`] are returned verbatim.
    pub fn full_messages(&self) -> Vec<String> {
        self.iter()
            .map(|(field, message)| {
                if field == BASE {
                    message.to_string()
                } else {
                    format!("{} {}", field, message)
                }
            })
            .collect()
    }
}
