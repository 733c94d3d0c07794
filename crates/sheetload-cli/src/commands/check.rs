//! Check command - validate a sheet without writing it.

use sheetload::Importer;

use super::{CommandResult, load_source, print_summary};
use crate::cli::SourceArgs;

pub fn run(source: SourceArgs) -> CommandResult<bool> {
    let (row_type, sheet, meta) = load_source(&source)?;

    let rows = Importer::with_config(source.import_config()).validate(&row_type, &sheet)?;
    let summary = rows.summary();

    print_summary(&summary, &meta, source.json)?;
    Ok(summary.valid)
}
