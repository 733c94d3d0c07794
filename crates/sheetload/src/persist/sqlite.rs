//! SQLite-backed store.

use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params_from_iter};
use serde_json::Value;

use crate::error::Result;
use crate::row_type::{Entity, Payload};

use super::store::{RecordError, RecordId, Store, WriteError};

/// Store writing each entity to the table of the same name.
///
/// Constraint failures (NOT NULL, UNIQUE, CHECK, FOREIGN KEY) reject the
/// record; any other SQLite error is a backend failure.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, enabling foreign key enforcement.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Run a schema script (several `;`-separated statements).
    pub fn execute_script(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Number of rows in a table.
    pub fn count(&self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Get underlying connection for advanced operations.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for SqliteStore {
    fn begin(&mut self) -> std::result::Result<(), WriteError> {
        self.conn.execute_batch("BEGIN").map_err(backend)
    }

    fn write(
        &mut self,
        entity: &Entity,
        payload: &Payload,
    ) -> std::result::Result<RecordId, WriteError> {
        let table = quote_identifier(entity.name());
        let sql = if payload.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", table)
        } else {
            let columns: Vec<String> = payload.keys().map(|k| quote_identifier(k)).collect();
            let placeholders: Vec<String> =
                (1..=payload.len()).map(|i| format!("?{}", i)).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                columns.join(", "),
                placeholders.join(", ")
            )
        };

        let values: Vec<SqlValue> = payload.values().map(to_sql_value).collect();
        match self.conn.execute(&sql, params_from_iter(values.iter())) {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(failure, message))
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                let message = message.unwrap_or_else(|| failure.to_string());
                Err(WriteError::Rejected(RecordError::new(entity.name(), message)))
            }
            Err(e) => Err(backend(e)),
        }
    }

    fn find(
        &mut self,
        entity: &Entity,
        field: &str,
        value: &Value,
    ) -> std::result::Result<Option<RecordId>, WriteError> {
        let sql = format!(
            "SELECT rowid FROM {} WHERE {} = ?1 LIMIT 1",
            quote_identifier(entity.name()),
            quote_identifier(field)
        );
        self.conn
            .query_row(&sql, [to_sql_value(value)], |row| row.get(0))
            .optional()
            .map_err(backend)
    }

    fn commit(&mut self) -> std::result::Result<(), WriteError> {
        self.conn.execute_batch("COMMIT").map_err(backend)
    }

    fn rollback(&mut self) -> std::result::Result<(), WriteError> {
        self.conn.execute_batch("ROLLBACK").map_err(backend)
    }
}

fn backend(error: rusqlite::Error) -> WriteError {
    WriteError::Backend(error.to_string())
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &str = "
        CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL
        );
    ";

    fn store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store.execute_script(SCHEMA).unwrap();
        store
    }

    fn user(username: &str, email: &str) -> Payload {
        [
            ("username".to_string(), json!(username)),
            ("email".to_string(), json!(email)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_write_and_find() {
        let mut store = store();
        let users = Entity::new("users");
        let id = store.write(&users, &user("alice", "a@x.com")).unwrap();
        assert_eq!(store.find(&users, "username", &json!("alice")).unwrap(), Some(id));
        assert_eq!(store.count("users").unwrap(), 1);
    }

    #[test]
    fn test_unique_violation_is_rejection() {
        let mut store = store();
        let users = Entity::new("users");
        store.write(&users, &user("alice", "a@x.com")).unwrap();
        let err = store.write(&users, &user("alice", "b@x.com")).unwrap_err();
        match err {
            WriteError::Rejected(record) => {
                assert_eq!(record.entity, "users");
                assert!(record.messages[0].contains("UNIQUE"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_table_is_backend_failure() {
        let mut store = store();
        let err = store
            .write(&Entity::new("ghosts"), &user("a", "b"))
            .unwrap_err();
        assert!(matches!(err, WriteError::Backend(_)));
    }

    #[test]
    fn test_rollback_discards_writes() {
        let mut store = store();
        let users = Entity::new("users");
        store.begin().unwrap();
        store.write(&users, &user("alice", "a@x.com")).unwrap();
        store.rollback().unwrap();
        assert_eq!(store.count("users").unwrap(), 0);
    }
}
