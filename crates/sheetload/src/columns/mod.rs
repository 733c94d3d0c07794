//! Column mapping: from a row type's header specification to cell positions.

mod map;
mod spec;

pub use map::{ColumnMap, FieldValues};
pub use spec::HeaderSpec;
