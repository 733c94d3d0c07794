//! Tabular input: the source boundary and a CSV/TSV reader.

mod parser;
mod source;

pub use parser::{ParserConfig, SheetReader};
pub use source::{Sheet, SourceMetadata, TabularSource};
