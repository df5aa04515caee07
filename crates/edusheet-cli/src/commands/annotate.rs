//! Annotate command - look up address suggestions for spreadsheet rows.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use edusheet::{
    AnnotateConfig, AnnotateJob, GeoapifyProvider, Geocoder, GeocoderConfig, MockGeocoder,
    ParserConfig, SheetSelector,
};
use tracing::info;

use super::{print_saved, write_report};

pub struct AnnotateArgs {
    pub file: PathBuf,
    pub processed_output: Option<PathBuf>,
    pub unprocessed_output: Option<PathBuf>,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub limit: Option<usize>,
    pub pause_ms: u64,
    pub timeout: Option<u64>,
    pub sheet: Option<SheetSelector>,
    pub mock: bool,
    pub report: Option<PathBuf>,
    pub verbose: bool,
}

fn build_geocoder(args: &AnnotateArgs) -> Result<Arc<dyn Geocoder>, Box<dyn std::error::Error>> {
    if args.mock {
        info!("Using mock geocoder");
        return Ok(Arc::new(MockGeocoder::new()));
    }

    let api_key = args
        .api_key
        .clone()
        .ok_or("No API key: pass --api-key or set GEOAPIFY_API_KEY (or use --mock)")?;

    let mut config = GeocoderConfig::new(api_key);
    if let Some(endpoint) = &args.endpoint {
        config = config.with_endpoint(endpoint);
    }
    if let Some(secs) = args.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    Ok(Arc::new(GeoapifyProvider::with_config(config)?))
}

pub fn run(args: AnnotateArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.file.exists() {
        return Err(format!("File not found: {}", args.file.display()).into());
    }

    let geocoder = build_geocoder(&args)?;

    println!(
        "{} {} via {}",
        "Annotating".cyan().bold(),
        args.file.display().to_string().white(),
        geocoder.name().cyan()
    );

    let mut job = AnnotateJob::new(&args.file)
        .with_annotate_config(
            AnnotateConfig::default()
                .with_limit(args.limit)
                .with_pause(Duration::from_millis(args.pause_ms)),
        )
        .with_parser_config(ParserConfig {
            sheet: args.sheet.clone().unwrap_or_default(),
            ..ParserConfig::default()
        });
    let processed = args
        .processed_output
        .clone()
        .unwrap_or_else(|| job.processed_output.clone());
    let unprocessed = args
        .unprocessed_output
        .clone()
        .unwrap_or_else(|| job.unprocessed_output.clone());
    job = job.with_outputs(processed, unprocessed);

    let outcome = job.run(geocoder)?;

    if args.verbose {
        println!();
        println!("{}", "Suggestions:".yellow().bold());
        for (i, suggestion) in outcome.suggestions.iter().enumerate() {
            let text = suggestion.to_string();
            let text = if suggestion.is_error() {
                text.red()
            } else {
                text.normal()
            };
            println!("  {} row {:<5} [{}] {}", "•".dimmed(), i + 1, suggestion.label().cyan(), text);
        }
        println!();
    }

    let report = &outcome.report;
    println!(
        "Looked up {} rows ({} addresses, {} without suggestion, {} errors), {} left unprocessed",
        report.processed.to_string().white().bold(),
        report.addresses_found.to_string().green(),
        report.no_suggestion.to_string().yellow(),
        report.errors().to_string().red(),
        report.unprocessed.to_string().blue()
    );
    print_saved("processed rows:", &outcome.processed);
    print_saved("unprocessed rows:", &outcome.unprocessed);

    if let Some(path) = &args.report {
        write_report(path, &outcome)?;
    }

    if !outcome.succeeded() {
        return Err("One or more output files could not be saved".into());
    }

    println!("{} annotation complete", "Done:".green().bold());
    Ok(())
}
