//! CLI command implementations.

pub mod annotate;
pub mod clean;

use std::path::Path;

use colored::Colorize;
use edusheet::SavedFile;
use serde::Serialize;

/// Write `value` as pretty JSON to `path`.
pub fn write_report<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)
        .map_err(|e| format!("Cannot write report {}: {}", path.display(), e))?;
    println!(
        "  {} report written to {}",
        "•".dimmed(),
        path.display().to_string().cyan()
    );
    Ok(())
}

/// One summary line per output file.
pub fn print_saved(label: &str, saved: &SavedFile) {
    match &saved.error {
        None => println!(
            "  {} {} {} rows to {}",
            "✓".green(),
            label,
            saved.rows.to_string().white().bold(),
            saved.path.display().to_string().cyan()
        ),
        Some(error) => println!(
            "  {} {} not saved to {}: {}",
            "✗".red(),
            label,
            saved.path.display().to_string().cyan(),
            error.red()
        ),
    }
}
