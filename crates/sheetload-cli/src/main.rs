//! Sheetload CLI - validate spreadsheet rows and import them as one batch.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use logging::{LogConfig, init_logging};

/// Exit code for a sheet that failed validation or was rejected by the store.
const EXIT_INVALID: i32 = 2;

fn main() {
    let cli = Cli::parse();

    init_logging(&LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format.into()));

    let result = match cli.command {
        Commands::Import {
            source,
            database,
            schema,
        } => commands::import::run(source, database, schema),

        Commands::Check { source } => commands::check::run(source),

        Commands::Init {
            name,
            columns,
            output,
            force,
        } => commands::init::run(name, columns, output, force).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_INVALID),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
