//! Table writer: xlsx via rust_xlsxwriter, CSV/TSV via the csv crate.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, info};

use crate::error::{EdusheetError, Result};
use crate::input::{DataTable, extension_of, format_number};

/// Rows per worksheet, header included.
const EXCEL_MAX_ROWS: usize = 1_048_576;

/// Columns per worksheet.
const EXCEL_MAX_COLUMNS: usize = 16_384;

/// Writer configuration.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Name of the single worksheet in xlsx output.
    pub sheet_name: String,
    /// Render the header row in bold (xlsx only).
    pub bold_header: bool,
    /// Delimiter for text output (None = pick from the extension).
    pub delimiter: Option<u8>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            bold_header: true,
            delimiter: None,
        }
    }
}

/// Writes [`DataTable`]s to disk.
pub struct Writer {
    config: WriterConfig,
}

impl Writer {
    /// Create a new writer with default configuration.
    pub fn new() -> Self {
        Self {
            config: WriterConfig::default(),
        }
    }

    /// Create a writer with custom configuration.
    pub fn with_config(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Write a table, choosing the format from the file extension.
    pub fn write_file(&self, table: &DataTable, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let extension = extension_of(path);

        match extension.as_str() {
            "xlsx" => self.write_xlsx(table, path)?,
            "csv" => self.write_delimited(table, path, b',')?,
            "tsv" | "txt" => self.write_delimited(table, path, b'\t')?,
            "psv" => self.write_delimited(table, path, b'|')?,
            _ => {
                return Err(EdusheetError::UnsupportedFormat(format!(
                    "cannot write '{}' (expected xlsx, csv, tsv, txt or psv)",
                    path.display()
                )));
            }
        }

        info!("Saved {} rows to {}", table.row_count(), path.display());
        Ok(())
    }

    fn write_xlsx(&self, table: &DataTable, path: &Path) -> Result<()> {
        if table.row_count() + 1 > EXCEL_MAX_ROWS {
            return Err(EdusheetError::TooLarge(format!(
                "{} rows exceed the worksheet limit of {}",
                table.row_count(),
                EXCEL_MAX_ROWS - 1
            )));
        }
        if table.column_count() > EXCEL_MAX_COLUMNS {
            return Err(EdusheetError::TooLarge(format!(
                "{} columns exceed the worksheet limit of {}",
                table.column_count(),
                EXCEL_MAX_COLUMNS
            )));
        }

        let mut workbook = Workbook::new();
        let header_format = if self.config.bold_header {
            Format::new().set_bold()
        } else {
            Format::new()
        };

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.config.sheet_name)?;

        // Limits were checked above, so the narrowing casts below are lossless.
        for (col, header) in table.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let excel_row = (row_idx + 1) as u32;
            for (col, value) in row.iter().enumerate() {
                let excel_col = col as u16;
                match classify_cell(value) {
                    CellKind::Blank => {}
                    CellKind::Number(n) => {
                        worksheet.write_number(excel_row, excel_col, n)?;
                    }
                    CellKind::Boolean(b) => {
                        worksheet.write_boolean(excel_row, excel_col, b)?;
                    }
                    CellKind::Text => {
                        worksheet.write_string(excel_row, excel_col, value)?;
                    }
                }
            }
        }

        debug!(
            "Writing workbook with sheet '{}' to {}",
            self.config.sheet_name,
            path.display()
        );
        workbook.save(path)?;
        Ok(())
    }

    fn write_delimited(&self, table: &DataTable, path: &Path, default_delimiter: u8) -> Result<()> {
        let delimiter = self.config.delimiter.unwrap_or(default_delimiter);
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(path)?;

        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|e| EdusheetError::io(path, e))?;
        Ok(())
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

/// How a text cell is stored in a workbook.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CellKind {
    Blank,
    Number(f64),
    Boolean(bool),
    Text,
}

/// Numbers are only written as numbers when the text is exactly their
/// canonical rendering, so codes like `007` stay text.
fn classify_cell(value: &str) -> CellKind {
    if DataTable::is_blank(value) {
        return CellKind::Blank;
    }
    match value {
        "TRUE" => return CellKind::Boolean(true),
        "FALSE" => return CellKind::Boolean(false),
        _ => {}
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && format_number(n) == value => CellKind::Number(n),
        _ => CellKind::Text,
    }
}
