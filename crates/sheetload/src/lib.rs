//! Sheetload: transactional import of spreadsheet rows into record stores.
//!
//! A row type declares how a sheet's columns map to named fields, the rules
//! each row must satisfy and the records each row becomes. An import reads
//! every data row, validates the batch, and writes all of it in one
//! transaction, or none of it.
//!
//! # Core Principles
//!
//! - **All or nothing**: a batch is committed only when every row is valid
//!   and every record is accepted by the store
//! - **First failure wins**: the first invalid row is the one reported, no
//!   matter how often validity is checked afterwards
//! - **Data errors are data**: bad rows come back on the [`RowCollection`],
//!   never as an `Err`
//!
//! # Example
//!
//! ```no_run
//! use sheetload::definition::{DeclarativeRowType, SheetDefinition};
//! use sheetload::{Importer, SheetReader, SqliteStore};
//!
//! let row_type = DeclarativeRowType::new(SheetDefinition::load("users.json").unwrap()).unwrap();
//! let (sheet, _meta) = SheetReader::new().read_file("users.csv").unwrap();
//! let mut store = SqliteStore::open("app.db").unwrap();
//!
//! let mut rows = Importer::new().import(&row_type, &sheet, &mut store).unwrap();
//! if !rows.is_valid() {
//!     for message in rows.full_messages() {
//!         eprintln!("{}", message);
//!     }
//! }
//! ```

pub mod collection;
pub mod columns;
pub mod definition;
pub mod error;
pub mod input;
pub mod persist;
pub mod pipeline;
pub mod row;
pub mod row_type;

pub use collection::{BatchSummary, RowCollection, UNIQUE_MESSAGE};
pub use columns::{ColumnMap, FieldValues, HeaderSpec};
pub use definition::{DeclarativeRowType, SheetDefinition};
pub use error::{Result, SheetloadError};
pub use input::{ParserConfig, Sheet, SheetReader, SourceMetadata, TabularSource};
pub use persist::{
    MemoryStore, RecordError, RecordId, SqliteStore, Store, TableSpec, WriteError, WrittenRecords,
};
pub use pipeline::{ImportConfig, Importer, Phase, import};
pub use row::{BASE, Check, FieldErrors, FieldRule, Row, RowSchema};
pub use row_type::{Entity, Payload, RowType, row_payload};
