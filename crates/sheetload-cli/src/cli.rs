//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use sheetload::{ImportConfig, ParserConfig};

/// Sheetload: validate spreadsheet rows and import them as one batch
#[derive(Parser)]
#[command(name = "sheetload")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: LogFormatChoice,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a sheet and write it to a SQLite database in one transaction
    Import {
        #[command(flatten)]
        source: SourceArgs,

        /// SQLite database file (created if missing)
        #[arg(short, long, value_name = "DB")]
        database: PathBuf,

        /// SQL script run before importing (e.g. CREATE TABLE statements)
        #[arg(long, value_name = "SQL_FILE")]
        schema: Option<PathBuf>,
    },

    /// Validate a sheet without writing anything
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Write a skeleton sheet definition
    Init {
        /// Sheet name, also used as the destination entity
        #[arg(value_name = "NAME")]
        name: String,

        /// Column names, in sheet order
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Output path (default: <NAME>.sheet.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Arguments shared by commands that read a sheet.
#[derive(Args)]
pub struct SourceArgs {
    /// Sheet definition (JSON)
    #[arg(value_name = "DEFINITION")]
    pub definition: PathBuf,

    /// Data file (CSV/TSV)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Field delimiter, a single ASCII character (auto-detected when omitted)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Stop reading at the first invalid row
    #[arg(long)]
    pub halt_on_invalid: bool,

    /// Read at most this many data rows
    #[arg(long)]
    pub max_rows: Option<usize>,

    /// First data row (overrides the definition)
    #[arg(long)]
    pub starting_row: Option<usize>,

    /// Print the batch summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl SourceArgs {
    pub fn import_config(&self) -> ImportConfig {
        ImportConfig::default()
            .with_halt_on_invalid_row(self.halt_on_invalid)
            .with_max_rows(self.max_rows)
            .with_starting_row(self.starting_row)
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            delimiter: self.delimiter,
            ..Default::default()
        }
    }
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(format!("expected a single ASCII character, found '{}'", s)),
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatChoice {
    /// Human-readable multi-field output
    Pretty,
    /// Single-line output
    Compact,
    /// JSON lines
    Json,
}
