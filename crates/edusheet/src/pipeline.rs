//! End-to-end jobs: load a spreadsheet, transform it, save the result.
//!
//! Loading and transforming are fatal on failure. Saving is not: every
//! output is attempted and its outcome recorded in a [`SavedFile`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::annotate::{AnnotateConfig, AnnotateReport, Annotator, Suggestion};
use crate::clean::{CleanConfig, CleanReport, Cleaner};
use crate::error::Result;
use crate::geocode::Geocoder;
use crate::input::{DataTable, Parser, ParserConfig, SourceMetadata};
use crate::output::{Writer, WriterConfig};

/// Default processed-rows file name for the annotator.
pub const PROCESSED_FILE_NAME: &str = "processed_with_address_suggestions.xlsx";

/// Default unprocessed-rows file name for the annotator.
pub const UNPROCESSED_FILE_NAME: &str = "unprocessed_rows.xlsx";

/// Outcome of writing one output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedFile {
    pub path: PathBuf,
    pub rows: usize,
    /// Why the save failed, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SavedFile {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

fn save(writer: &Writer, table: &DataTable, path: &Path, what: &str) -> SavedFile {
    info!("Saving {} to: {}", what, path.display());
    let error = match writer.write_file(table, path) {
        Ok(()) => None,
        Err(e) => {
            error!("Error saving {}: {}", what, e);
            Some(e.to_string())
        }
    };
    SavedFile {
        path: path.to_path_buf(),
        rows: table.row_count(),
        error,
    }
}

fn load(parser: &ParserConfig, input: &Path) -> Result<(DataTable, SourceMetadata)> {
    Parser::with_config(parser.clone())
        .parse_file(input)
        .inspect_err(|e| error!("Error loading spreadsheet: {}", e))
}

/// `<dir>/cleaned_sorted_<stem>_with_columns.xlsx` next to the input.
pub fn default_clean_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().replace(' ', "_"))
        .unwrap_or_else(|| "input".to_string());
    sibling(input, &format!("cleaned_sorted_{}_with_columns.xlsx", stem))
}

fn sibling(input: &Path, name: &str) -> PathBuf {
    input
        .parent()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
}

/// Load, clean and save one spreadsheet.
#[derive(Debug, Clone)]
pub struct CleanJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub parser: ParserConfig,
    pub writer: WriterConfig,
    pub clean: CleanConfig,
}

/// Result of a [`CleanJob`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanOutcome {
    pub source: SourceMetadata,
    pub report: CleanReport,
    pub saved: SavedFile,
}

impl CleanOutcome {
    pub fn succeeded(&self) -> bool {
        self.saved.is_ok()
    }
}

impl CleanJob {
    /// A job with default settings writing next to the input.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let output = default_clean_output(&input);
        Self {
            input,
            output,
            parser: ParserConfig::default(),
            writer: WriterConfig::default(),
            clean: CleanConfig::default(),
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_clean_config(mut self, clean: CleanConfig) -> Self {
        self.clean = clean;
        self
    }

    pub fn with_parser_config(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Run the job. Load and transform failures are returned as errors;
    /// a save failure is reported in the outcome.
    pub fn run(&self) -> Result<CleanOutcome> {
        let (mut table, source) = load(&self.parser, &self.input)?;

        let report = Cleaner::with_config(self.clean.clone())
            .apply(&mut table)
            .inspect_err(|e| error!("Error during data cleaning and sorting: {}", e))?;

        let saved = save(
            &Writer::with_config(self.writer.clone()),
            &table,
            &self.output,
            "cleaned data",
        );

        Ok(CleanOutcome {
            source,
            report,
            saved,
        })
    }
}

/// Load, annotate and save one spreadsheet.
#[derive(Debug, Clone)]
pub struct AnnotateJob {
    pub input: PathBuf,
    pub processed_output: PathBuf,
    pub unprocessed_output: PathBuf,
    pub parser: ParserConfig,
    pub writer: WriterConfig,
    pub annotate: AnnotateConfig,
}

/// Result of an [`AnnotateJob`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotateOutcome {
    pub source: SourceMetadata,
    pub report: AnnotateReport,
    pub suggestions: Vec<Suggestion>,
    pub processed: SavedFile,
    pub unprocessed: SavedFile,
}

impl AnnotateOutcome {
    pub fn succeeded(&self) -> bool {
        self.processed.is_ok() && self.unprocessed.is_ok()
    }
}

impl AnnotateJob {
    /// A job with default settings writing next to the input.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        Self {
            processed_output: sibling(&input, PROCESSED_FILE_NAME),
            unprocessed_output: sibling(&input, UNPROCESSED_FILE_NAME),
            input,
            parser: ParserConfig::default(),
            writer: WriterConfig::default(),
            annotate: AnnotateConfig::default(),
        }
    }

    pub fn with_outputs(
        mut self,
        processed: impl Into<PathBuf>,
        unprocessed: impl Into<PathBuf>,
    ) -> Self {
        self.processed_output = processed.into();
        self.unprocessed_output = unprocessed.into();
        self
    }

    pub fn with_annotate_config(mut self, annotate: AnnotateConfig) -> Self {
        self.annotate = annotate;
        self
    }

    pub fn with_parser_config(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Run the job against `geocoder`. Both outputs are always attempted.
    pub fn run(&self, geocoder: Arc<dyn Geocoder>) -> Result<AnnotateOutcome> {
        let (table, source) = load(&self.parser, &self.input)?;

        let annotation = Annotator::with_config(geocoder, self.annotate.clone())
            .run(&table)
            .inspect_err(|e| error!("Error during address annotation: {}", e))?;

        let writer = Writer::with_config(self.writer.clone());
        let processed = save(
            &writer,
            &annotation.processed,
            &self.processed_output,
            "file with address suggestions",
        );
        let unprocessed = save(
            &writer,
            &annotation.unprocessed,
            &self.unprocessed_output,
            "unprocessed rows",
        );

        Ok(AnnotateOutcome {
            source,
            report: annotation.report,
            suggestions: annotation.suggestions,
            processed,
            unprocessed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_clean_output() {
        assert_eq!(
            default_clean_output(Path::new("/data/py input.xlsx")),
            PathBuf::from("/data/cleaned_sorted_py_input_with_columns.xlsx")
        );
        assert_eq!(
            default_clean_output(Path::new("records.csv")),
            PathBuf::from("cleaned_sorted_records_with_columns.xlsx")
        );
    }

    #[test]
    fn test_annotate_job_defaults() {
        let job = AnnotateJob::new("/data/cleaned.xlsx");
        assert_eq!(
            job.processed_output,
            PathBuf::from("/data/processed_with_address_suggestions.xlsx")
        );
        assert_eq!(job.unprocessed_output, PathBuf::from("/data/unprocessed_rows.xlsx"));
        assert_eq!(job.annotate.limit, Some(1));
    }
}
