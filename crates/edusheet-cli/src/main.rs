//! Edusheet CLI - spreadsheet cleaning and address annotation.

mod cli;
mod commands;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if verbose {
        "edusheet=debug,edusheet_cli=debug"
    } else {
        "edusheet=info,edusheet_cli=info"
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("Cannot open log file {}: {}", path.display(), e))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Clean {
            file,
            output,
            placeholder,
            drop_pattern,
            keep_all_rows,
            sheet,
            report,
        } => commands::clean::run(commands::clean::CleanArgs {
            file,
            output,
            placeholder,
            drop_pattern: (!keep_all_rows).then_some(drop_pattern),
            sheet,
            report,
            verbose: cli.verbose,
        }),

        Commands::Annotate {
            file,
            processed_output,
            unprocessed_output,
            api_key,
            endpoint,
            limit,
            all,
            pause_ms,
            timeout,
            sheet,
            mock,
            report,
        } => commands::annotate::run(commands::annotate::AnnotateArgs {
            file,
            processed_output,
            unprocessed_output,
            api_key,
            endpoint,
            limit: (!all).then_some(limit),
            pause_ms,
            timeout,
            sheet,
            mock,
            report,
            verbose: cli.verbose,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
