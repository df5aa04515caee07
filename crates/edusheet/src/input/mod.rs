//! Input parsing and data source handling.

mod parser;
mod source;

pub(crate) use parser::{extension_of, format_number};
pub use parser::{DEFAULT_NA_VALUES, Parser, ParserConfig, SheetSelector};
pub use source::{DataTable, SourceMetadata};
