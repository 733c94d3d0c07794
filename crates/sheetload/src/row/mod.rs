//! Rows: decoded records, their field rules and error sets.

mod errors;
mod record;
mod rules;
mod schema;

pub use errors::{BASE, FieldErrors};
pub use record::Row;
pub use rules::{Check, FieldRule};
pub use schema::RowSchema;
