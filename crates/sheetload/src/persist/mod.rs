//! Storage boundary and transactional batch persistence.

mod batch;
mod memory;
mod sqlite;
mod store;

pub use batch::{persist_batch, write_entities};
pub use memory::{MemoryStore, StoredRecord, TableSpec};
pub use sqlite::SqliteStore;
pub use store::{RecordError, RecordId, Store, WriteError, WrittenRecords};
