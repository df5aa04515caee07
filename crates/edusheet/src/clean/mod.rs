//! Table cleaning: deduplication, row filtering, blank filling, derived
//! columns and sorting.

mod engine;
mod operations;

pub use engine::{CleanConfig, Cleaner};
pub use operations::{CleanChange, CleanOperation, CleanReport, DerivedValue};
