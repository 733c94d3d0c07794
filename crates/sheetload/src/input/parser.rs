//! CSV/TSV reader with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::source::{Sheet, SourceMetadata};
use crate::error::{Result, SheetloadError};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Quote character.
    pub quote: u8,
    /// Trim surrounding whitespace from every cell.
    pub trim: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
            trim: true,
        }
    }
}

/// Reads delimited text files into a [`Sheet`].
///
/// Every physical line becomes a sheet row, the header included, so the
/// row numbers a row type sees match the line numbers a spreadsheet user
/// sees.
pub struct SheetReader {
    config: ParserConfig,
}

impl SheetReader {
    /// Create a reader with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a reader with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Read a file and return the sheet and its metadata.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<(Sheet, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| SheetloadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| SheetloadError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        let size_bytes = contents.len() as u64;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let sheet = self.read_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        debug!(
            path = %path.display(),
            rows = sheet.len(),
            format = %format,
            "read sheet"
        );

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            sheet.len(),
        );

        Ok((sheet, metadata))
    }

    /// Read delimited bytes directly.
    pub fn read_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Sheet> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .trim(if self.config.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .from_reader(bytes);

        // The csv reader skips empty lines; they still occupy a row.
        let starts = record_start_lines(bytes, self.config.quote);

        let mut sheet = Sheet::default();
        for (index, result) in reader.records().enumerate() {
            let record = result?;
            let line = starts.get(index).copied().unwrap_or(sheet.len() + 1);
            while sheet.len() + 1 < line {
                sheet.push_row(Vec::new());
            }
            sheet.push_row(record.iter().map(|s| s.to_string()).collect());
        }

        if sheet.is_empty() {
            return Err(SheetloadError::EmptyData("No rows found".to_string()));
        }

        Ok(sheet)
    }
}

impl Default for SheetReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(SheetloadError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // Consistent counts across lines beat a higher but ragged count.
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Physical line (1-based) on which each non-empty record starts.
///
/// A line is a record start when it is not inside a quoted field and holds
/// anything besides its terminator.
fn record_start_lines(bytes: &[u8], quote: u8) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut in_quotes = false;

    for (n, line) in bytes.split(|&b| b == b'\n').enumerate() {
        let content = line.strip_suffix(b"\r").unwrap_or(line);
        if !in_quotes && !content.is_empty() {
            starts.push(n + 1);
        }
        let quotes = content.iter().filter(|&&b| b == quote).count();
        if quotes % 2 == 1 {
            in_quotes = !in_quotes;
        }
    }

    starts
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
