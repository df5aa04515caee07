//! Clean command - deduplicate, filter, fill, derive and sort a spreadsheet.

use std::path::PathBuf;

use colored::Colorize;
use edusheet::{CleanConfig, CleanJob, ParserConfig, SheetSelector};

use super::{print_saved, write_report};

pub struct CleanArgs {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub placeholder: String,
    pub drop_pattern: Option<String>,
    pub sheet: Option<SheetSelector>,
    pub report: Option<PathBuf>,
    pub verbose: bool,
}

pub fn run(args: CleanArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.file.exists() {
        return Err(format!("File not found: {}", args.file.display()).into());
    }

    println!(
        "{} {}",
        "Cleaning".cyan().bold(),
        args.file.display().to_string().white()
    );

    let mut job = CleanJob::new(&args.file)
        .with_clean_config(
            CleanConfig::default()
                .with_placeholder(args.placeholder)
                .with_drop_pattern(args.drop_pattern),
        )
        .with_parser_config(ParserConfig {
            sheet: args.sheet.unwrap_or_default(),
            ..ParserConfig::default()
        });
    if let Some(output) = args.output {
        job = job.with_output(output);
    }

    let outcome = job.run()?;

    if args.verbose {
        println!();
        println!("{}", "Operations:".yellow().bold());
        for change in &outcome.report.changes {
            println!(
                "  {} {:50} {:>6} -> {:<6} rows, {} cells",
                "•".dimmed(),
                change.description,
                change.rows_before,
                change.rows_after,
                change.values_changed
            );
        }
        println!();
    }

    println!(
        "Read {} rows, removed {}, filled {} blank cells, added {} columns",
        outcome.source.row_count.to_string().white().bold(),
        outcome.report.rows_removed.to_string().yellow(),
        outcome.report.values_filled.to_string().yellow(),
        outcome.report.columns_added.to_string().blue()
    );
    print_saved("cleaned data:", &outcome.saved);

    if let Some(path) = &args.report {
        write_report(path, &outcome)?;
    }

    if !outcome.succeeded() {
        return Err("Cleaned data could not be saved".into());
    }

    println!("{} cleaning complete", "Done:".green().bold());
    Ok(())
}
