//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use edusheet::SheetSelector;
use std::path::PathBuf;

/// Edusheet: clean and geocode education-institution spreadsheets
#[derive(Parser)]
#[command(name = "edusheet")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also append log lines to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deduplicate, filter, fill, derive columns and sort a spreadsheet
    Clean {
        /// Path to the input spreadsheet (xlsx, xls, ods, csv, tsv)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (default: cleaned_sorted_<stem>_with_columns.xlsx next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Value written into blank cells and placeholder columns
        #[arg(long, default_value = "Unknown")]
        placeholder: String,

        /// Drop rows with a cell matching this pattern
        #[arg(long, default_value = "Total")]
        drop_pattern: String,

        /// Keep rows regardless of content
        #[arg(long, conflicts_with = "drop_pattern")]
        keep_all_rows: bool,

        /// Worksheet to read, by zero-based index or name
        #[arg(long, value_name = "N|NAME")]
        sheet: Option<SheetSelector>,

        /// Write a JSON report of the run
        #[arg(long, value_name = "JSON")]
        report: Option<PathBuf>,
    },

    /// Look up address suggestions for leading rows of a spreadsheet
    Annotate {
        /// Path to the cleaned spreadsheet
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output for looked-up rows (default: processed_with_address_suggestions.xlsx)
        #[arg(long)]
        processed_output: Option<PathBuf>,

        /// Output for remaining rows (default: unprocessed_rows.xlsx)
        #[arg(long)]
        unprocessed_output: Option<PathBuf>,

        /// Geoapify API key
        #[arg(long, env = "GEOAPIFY_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Search endpoint URL
        #[arg(long, env = "GEOAPIFY_ENDPOINT")]
        endpoint: Option<String>,

        /// Number of rows to look up, counted from the top
        #[arg(long, default_value = "1", conflicts_with = "all")]
        limit: usize,

        /// Look up every row
        #[arg(long)]
        all: bool,

        /// Pause after each lookup, in milliseconds
        #[arg(long, default_value = "1000")]
        pause_ms: u64,

        /// Request timeout, in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Worksheet to read, by zero-based index or name
        #[arg(long, value_name = "N|NAME")]
        sheet: Option<SheetSelector>,

        /// Use the offline mock geocoder instead of the HTTP service
        #[arg(long)]
        mock: bool,

        /// Write a JSON report of the run
        #[arg(long, value_name = "JSON")]
        report: Option<PathBuf>,
    },
}
