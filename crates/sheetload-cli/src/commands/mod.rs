//! CLI command implementations.

pub mod check;
pub mod import;
pub mod init;

use colored::Colorize;
use sheetload::definition::{DeclarativeRowType, SheetDefinition};
use sheetload::{BatchSummary, Sheet, SheetReader, SourceMetadata};

use crate::cli::SourceArgs;

pub type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Load the definition and read the data file named by `args`.
pub fn load_source(args: &SourceArgs) -> CommandResult<(DeclarativeRowType, Sheet, SourceMetadata)> {
    let row_type = DeclarativeRowType::new(SheetDefinition::load(&args.definition)?)?;
    let (sheet, meta) = SheetReader::with_config(args.parser_config()).read_file(&args.file)?;
    Ok((row_type, sheet, meta))
}

/// Print the outcome of a batch.
pub fn print_summary(summary: &BatchSummary, meta: &SourceMetadata, json: bool) -> CommandResult<()> {
    if json {
        let output = serde_json::json!({
            "file": meta.file,
            "hash": meta.hash,
            "format": meta.format,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {} ({}, {} rows)",
        "Sheet:".cyan().bold(),
        meta.file.white(),
        meta.format,
        summary.total_rows
    );

    if summary.valid {
        println!("{} every row is valid", "✓".green().bold());
        if summary.records_written > 0 {
            println!(
                "  Records written: {}",
                summary.records_written.to_string().green()
            );
        }
    } else {
        let row = summary
            .invalid_row_number
            .map(|n| format!("row {}", n))
            .unwrap_or_else(|| "unknown row".to_string());
        println!("{} {} is invalid", "✗".red().bold(), row.white().bold());
        for message in &summary.messages {
            println!("  - {}", message.red());
        }
        println!("{}", "Nothing was written.".yellow());
    }

    Ok(())
}
