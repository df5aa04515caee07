//! Address annotation: one geocoding lookup per row, results appended as a
//! new column.

mod annotator;
mod suggestion;

pub use annotator::{AnnotateConfig, AnnotateReport, Annotation, Annotator};
pub use suggestion::Suggestion;
