//! Row-by-row address annotation.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::columns;
use crate::error::Result;
use crate::geocode::Geocoder;
use crate::input::DataTable;

use super::suggestion::Suggestion;

/// Configuration for the annotator.
#[derive(Debug, Clone)]
pub struct AnnotateConfig {
    /// Columns joined into the search text, in order.
    pub query_columns: Vec<String>,
    /// Separator placed between query parts.
    pub query_separator: String,
    /// Name of the appended suggestion column.
    pub suggestion_column: String,
    /// Rows looked up, counted from the top (None = all rows).
    pub limit: Option<usize>,
    /// Pause after every lookup attempt.
    pub pause: Duration,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            query_columns: vec![
                columns::EDUCATION_INSTITUTE.to_string(),
                columns::COUNTRY_NAME.to_string(),
            ],
            query_separator: ", ".to_string(),
            suggestion_column: columns::ADDRESS_SUGGESTIONS.to_string(),
            limit: Some(1),
            pause: Duration::from_secs(1),
        }
    }
}

impl AnnotateConfig {
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }
}

/// Counts from an annotation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotateReport {
    /// Rows that were looked up.
    pub processed: usize,
    /// Rows passed through untouched.
    pub unprocessed: usize,
    pub addresses_found: usize,
    pub no_suggestion: usize,
    pub request_errors: usize,
    pub other_errors: usize,
}

impl AnnotateReport {
    fn record(&mut self, suggestion: &Suggestion) {
        self.processed += 1;
        match suggestion {
            Suggestion::Address(_) => self.addresses_found += 1,
            Suggestion::NoSuggestion => self.no_suggestion += 1,
            Suggestion::RequestError(_) => self.request_errors += 1,
            Suggestion::Error(_) => self.other_errors += 1,
        }
    }

    /// Lookups that ended in an error suggestion.
    pub fn errors(&self) -> usize {
        self.request_errors + self.other_errors
    }
}

/// Output of an annotation run.
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Looked-up rows with the suggestion column appended.
    pub processed: DataTable,
    /// Remaining rows, unmodified.
    pub unprocessed: DataTable,
    /// Suggestions in processed-row order.
    pub suggestions: Vec<Suggestion>,
    pub report: AnnotateReport,
}

/// Looks up an address suggestion for each row of a table.
pub struct Annotator {
    config: AnnotateConfig,
    geocoder: Arc<dyn Geocoder>,
}

impl Annotator {
    /// Create an annotator with default configuration.
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self::with_config(geocoder, AnnotateConfig::default())
    }

    /// Create an annotator with custom configuration.
    pub fn with_config(geocoder: Arc<dyn Geocoder>, config: AnnotateConfig) -> Self {
        Self { config, geocoder }
    }

    /// Build the search text for a row.
    pub fn build_query(&self, row: &[String], indices: &[usize]) -> String {
        indices
            .iter()
            .map(|&i| row.get(i).map(|s| s.as_str()).unwrap_or(""))
            .collect::<Vec<_>>()
            .join(&self.config.query_separator)
    }

    /// Look up the leading rows of `table` and split it into processed and
    /// unprocessed parts.
    ///
    /// Only a missing query column fails; lookup failures become error
    /// suggestions.
    pub fn run(&self, table: &DataTable) -> Result<Annotation> {
        let indices = self
            .config
            .query_columns
            .iter()
            .map(|c| table.require_column(c))
            .collect::<Result<Vec<_>>>()?;

        let cutoff = self
            .config
            .limit
            .map_or(table.row_count(), |limit| limit.min(table.row_count()));

        info!(
            "Starting address suggestions via {} for {} of {} rows",
            self.geocoder.name(),
            cutoff,
            table.row_count()
        );

        let mut report = AnnotateReport::default();
        let mut suggestions = Vec::with_capacity(cutoff);

        for (index, row) in table.rows[..cutoff].iter().enumerate() {
            let query = self.build_query(row, &indices);
            let suggestion = Suggestion::from_lookup(self.geocoder.first_suggestion(&query));

            match &suggestion {
                Suggestion::RequestError(message) => {
                    error!("Request error for address '{}': {}", query, message);
                }
                Suggestion::Error(message) => {
                    error!("Error for address '{}': {}", query, message);
                }
                Suggestion::NoSuggestion => warn!("No suggestion for address '{}'", query),
                Suggestion::Address(_) => {}
            }

            report.record(&suggestion);
            suggestions.push(suggestion);
            info!("Processed {} addresses.", index + 1);

            if !self.config.pause.is_zero() {
                thread::sleep(self.config.pause);
            }
        }

        let mut processed = DataTable::new(table.headers.clone(), table.rows[..cutoff].to_vec());
        let column = processed.add_column(self.config.suggestion_column.clone(), String::new());
        for (row, suggestion) in suggestions.iter().enumerate() {
            processed.set(row, column, suggestion.to_string());
        }

        let unprocessed = DataTable::new(table.headers.clone(), table.rows[cutoff..].to_vec());
        report.unprocessed = unprocessed.row_count();

        Ok(Annotation {
            processed,
            unprocessed,
            suggestions,
            report,
        })
    }
}
