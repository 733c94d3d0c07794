//! Import command - validate a sheet and write it to SQLite.

use std::path::PathBuf;

use sheetload::{Importer, SqliteStore};
use tracing::info;

use super::{CommandResult, load_source, print_summary};
use crate::cli::SourceArgs;

/// Returns whether the batch was valid and committed.
pub fn run(source: SourceArgs, database: PathBuf, schema: Option<PathBuf>) -> CommandResult<bool> {
    let (row_type, sheet, meta) = load_source(&source)?;

    let mut store = SqliteStore::open(&database)?;
    if let Some(schema) = schema {
        let sql = std::fs::read_to_string(&schema)
            .map_err(|e| format!("Failed to read schema '{}': {}", schema.display(), e))?;
        store.execute_script(&sql)?;
        info!(schema = %schema.display(), "applied schema");
    }

    let rows = Importer::with_config(source.import_config()).import(&row_type, &sheet, &mut store)?;
    let summary = rows.summary();

    print_summary(&summary, &meta, source.json)?;
    Ok(summary.valid)
}
