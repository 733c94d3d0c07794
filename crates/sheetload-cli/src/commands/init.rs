//! Init command - write a skeleton sheet definition.

use std::path::{Path, PathBuf};

use colored::Colorize;
use sheetload::definition::template;

use super::CommandResult;

pub fn run(
    name: String,
    columns: Vec<String>,
    output: Option<PathBuf>,
    force: bool,
) -> CommandResult<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(format!("{}.sheet.json", name)));
    write_template(&path, &name, &columns, force)?;

    println!("{} {}", "Created".green().bold(), path.display());
    println!("Edit its rules and entities, then run:");
    println!("  sheetload check {} <FILE>", path.display());
    Ok(())
}

fn write_template(path: &Path, name: &str, columns: &[String], force: bool) -> CommandResult<()> {
    if path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }
    std::fs::write(path, template(name, columns)?)?;
    Ok(())
}
