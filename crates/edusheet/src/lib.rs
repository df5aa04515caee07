//! Edusheet: cleaning and address annotation for education-institution
//! spreadsheets.
//!
//! Two batch pipelines share one table model:
//!
//! - **Clean**: deduplicate, drop summary rows, fill blanks, derive the
//!   location columns and sort.
//! - **Annotate**: look up an address suggestion for leading rows through a
//!   geocoding service and split the table into processed and unprocessed
//!   parts.
//!
//! # Example
//!
//! ```no_run
//! use edusheet::CleanJob;
//!
//! let outcome = CleanJob::new("records.xlsx").run().unwrap();
//!
//! println!("Rows removed: {}", outcome.report.rows_removed);
//! println!("Saved to: {}", outcome.saved.path.display());
//! ```

pub mod annotate;
pub mod clean;
pub mod columns;
pub mod error;
pub mod geocode;
pub mod input;
pub mod output;

mod pipeline;

pub use crate::pipeline::{
    AnnotateJob, AnnotateOutcome, CleanJob, CleanOutcome, PROCESSED_FILE_NAME, SavedFile,
    UNPROCESSED_FILE_NAME, default_clean_output,
};
pub use annotate::{AnnotateConfig, AnnotateReport, Annotation, Annotator, Suggestion};
pub use clean::{CleanConfig, CleanReport, Cleaner, DerivedValue};
pub use error::{EdusheetError, Result};
pub use geocode::{GeoapifyProvider, Geocoder, GeocoderConfig, MockGeocoder};
pub use input::{DataTable, Parser, ParserConfig, SheetSelector, SourceMetadata};
pub use output::{Writer, WriterConfig};
