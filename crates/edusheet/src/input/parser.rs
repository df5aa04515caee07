//! Spreadsheet reader: xlsx/xls/ods via calamine, CSV/TSV with delimiter detection.

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::source::{DataTable, SourceMetadata};
use crate::error::{EdusheetError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Non-blank lines read when sniffing the delimiter.
const SNIFF_LINES: usize = 10;

/// Extensions read through the workbook reader.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Extensions read through the delimited-text reader.
const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt", "psv"];

/// Cell contents treated as missing on load (case-sensitive, untrimmed).
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Which worksheet of a workbook to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    /// Zero-based sheet position.
    Index(usize),
    /// Sheet name.
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl std::str::FromStr for SheetSelector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("Sheet selector cannot be empty".to_string());
        }
        Ok(match s.parse::<usize>() {
            Ok(index) => SheetSelector::Index(index),
            Err(_) => SheetSelector::Name(s.to_string()),
        })
    }
}

impl std::fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetSelector::Index(i) => write!(f, "#{}", i),
            SheetSelector::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter for text files (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Quote character for text files.
    pub quote: u8,
    /// Worksheet to read from workbooks.
    pub sheet: SheetSelector,
    /// Values converted to empty cells on load.
    pub na_values: Vec<String>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
            sheet: SheetSelector::default(),
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
            max_rows: None,
        }
    }
}

impl ParserConfig {
    /// Keep every cell verbatim, treating only truly empty cells as missing.
    pub fn without_na_values(mut self) -> Self {
        self.na_values = vec![String::new()];
        self
    }
}

/// Reads spreadsheet files into [`DataTable`]s.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();
        info!("Loading spreadsheet from: {}", path.display());

        let extension = extension_of(path);
        let contents = fs::read(path).map_err(|e| EdusheetError::io(path, e))?;
        let size_bytes = contents.len() as u64;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let (table, format) = if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            (self.parse_workbook(contents)?, extension)
        } else if DELIMITED_EXTENSIONS.contains(&extension.as_str()) {
            let delimiter = match self.config.delimiter {
                Some(d) => d,
                None => detect_delimiter(&contents)?,
            };
            let format = match delimiter {
                b'\t' => "tsv",
                b',' => "csv",
                b';' => "csv-semicolon",
                b'|' => "psv",
                _ => "delimited",
            };
            (self.parse_delimited(&contents, delimiter)?, format.to_string())
        } else {
            return Err(EdusheetError::UnsupportedFormat(format!(
                "'{}' (expected one of: {}, {})",
                path.display(),
                WORKBOOK_EXTENSIONS.join(", "),
                DELIMITED_EXTENSIONS.join(", ")
            )));
        };

        info!(
            "Spreadsheet loaded successfully: {} rows, {} columns",
            table.row_count(),
            table.column_count()
        );

        let source = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            table.row_count(),
            table.column_count(),
        );

        Ok((table, source))
    }

    /// Parse a workbook held in memory.
    fn parse_workbook(&self, bytes: Vec<u8>) -> Result<DataTable> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        let range = match &self.config.sheet {
            SheetSelector::Index(index) => workbook.worksheet_range_at(*index).ok_or_else(|| {
                EdusheetError::EmptyData(format!("Workbook has no sheet at index {}", index))
            })??,
            SheetSelector::Name(name) => workbook.worksheet_range(name)?,
        };
        debug!("Reading sheet {} ({:?} cells)", self.config.sheet, range.get_size());

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| EdusheetError::EmptyData("No header row found".to_string()))?;
        let headers = normalize_headers(header_row.iter().map(cell_text).collect());

        let body = rows
            .take(self.config.max_rows.unwrap_or(usize::MAX))
            .map(|row| {
                row.iter()
                    .map(|cell| self.normalize_missing(cell_text(cell)))
                    .collect()
            })
            .collect();

        Ok(DataTable::new(headers, body))
    }

    /// Parse delimited text held in memory.
    fn parse_delimited(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers = normalize_headers(reader.headers()?.iter().map(|s| s.to_string()).collect());
        if headers.is_empty() {
            return Err(EdusheetError::EmptyData("No columns found".to_string()));
        }

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            rows.push(
                record
                    .iter()
                    .map(|s| self.normalize_missing(s.to_string()))
                    .collect(),
            );
        }

        Ok(DataTable::new(headers, rows))
    }

    fn normalize_missing(&self, value: String) -> String {
        if self.config.na_values.iter().any(|na| *na == value) {
            String::new()
        } else {
            value
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased file extension, or an empty string.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Render a number the way it reads in a spreadsheet: whole values without a
/// fractional part, everything else in shortest round-trip form.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Text form of a workbook cell.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| format_number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Give blank headers a positional name and disambiguate repeated ones.
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, header)| {
            let base = if header.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                header
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

/// Pick the delimiter that splits a sample of the file into the most columns.
///
/// Only delimiters giving the header at least two fields are considered. One
/// that gives every sampled record the same width beats one that doesn't;
/// remaining ties go to the earlier entry in [`DELIMITERS`]. With no
/// candidate the file is read as single-column CSV.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<&[u8]> = bytes
        .split(|&b| b == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .take(SNIFF_LINES)
        .collect();

    if lines.is_empty() {
        return Err(EdusheetError::EmptyData("No lines to analyze".to_string()));
    }
    let sample = lines.join(&b'\n');

    let mut best: Option<((bool, usize), u8)> = None;
    for &delimiter in DELIMITERS {
        let widths = record_widths(&sample, delimiter);
        let Some(&header) = widths.first() else {
            continue;
        };
        if header < 2 {
            continue;
        }

        let rank = (widths.iter().all(|&w| w == header), header);
        if best.is_none_or(|(top, _)| rank > top) {
            best = Some((rank, delimiter));
        }
    }

    Ok(best.map_or(b',', |(_, delimiter)| delimiter))
}

/// Field count of each record in `sample`, honoring quotes.
fn record_widths(sample: &[u8], delimiter: u8) -> Vec<usize> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(sample)
        .records()
        .map_while(|record| record.ok())
        .map(|record| record.len())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_commas() {
        let data = b"name;city\n\"Smith, J\";Oslo\n\"Lee, K\";Bergen";
        assert_eq!(detect_delimiter(data).unwrap(), b';');
    }

    #[test]
    fn test_detect_delimiter_prefers_uniform_width() {
        // Commas appear in free text on one row only; pipes split every row evenly.
        let data = b"institute|country\nA, B and C|Norway\nD|Sweden";
        assert_eq!(detect_delimiter(data).unwrap(), b'|');
    }

    #[test]
    fn test_detect_delimiter_single_column_defaults_to_comma() {
        let data = b"Education Institute\nUiO\nKTH";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
        assert!(detect_delimiter(b"\n  \n").is_err());
    }

    #[test]
    fn test_parse_csv() {
        let parser = Parser::new();
        let data = b"name,age,city\nAlice,30,NYC\nBob,25,LA";
        let table = parser.parse_delimited(data, b',').unwrap();

        assert_eq!(table.headers, vec!["name", "age", "city"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, 0), Some("Alice"));
        assert_eq!(table.get(1, 1), Some("25"));
    }

    #[test]
    fn test_parse_csv_header_only_is_empty_table() {
        let parser = Parser::new();
        let table = parser.parse_delimited(b"a,b\n", b',').unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_na_values_become_blank() {
        let parser = Parser::new();
        let data = b"a,b,c,d\nNA,n/a,none,NULL";
        let table = parser.parse_delimited(data, b',').unwrap();
        // "none" is not a missing token; "None" is.
        assert_eq!(table.rows[0], vec!["", "", "none", ""]);
    }

    #[test]
    fn test_without_na_values_keeps_tokens() {
        let parser = Parser::with_config(ParserConfig::default().without_na_values());
        let table = parser.parse_delimited(b"a,b\nNA,\n", b',').unwrap();
        assert_eq!(table.rows[0], vec!["NA", ""]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let parser = Parser::new();
        let table = parser.parse_delimited(b"a,b,c\n1\n", b',').unwrap();
        assert_eq!(table.rows[0], vec!["1", "", ""]);
    }

    #[test]
    fn test_max_rows() {
        let config = ParserConfig {
            max_rows: Some(1),
            ..ParserConfig::default()
        };
        let table = Parser::with_config(config)
            .parse_delimited(b"a\n1\n2\n3\n", b',')
            .unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_normalize_headers() {
        let headers = normalize_headers(vec![
            "Region".into(),
            "".into(),
            "Region".into(),
            "Region".into(),
        ]);
        assert_eq!(headers, vec!["Region", "Unnamed: 1", "Region.1", "Region.2"]);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2020.0), "2020");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.1), "0.1");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Float(12.0)), "12");
        assert_eq!(cell_text(&Data::Bool(true)), "TRUE");
        assert_eq!(cell_text(&Data::String("MIT".into())), "MIT");
    }

    #[test]
    fn test_sheet_selector_from_str() {
        assert_eq!("2".parse::<SheetSelector>(), Ok(SheetSelector::Index(2)));
        assert_eq!(
            "Data".parse::<SheetSelector>(),
            Ok(SheetSelector::Name("Data".to_string()))
        );
        assert!("".parse::<SheetSelector>().is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, b"{}").unwrap();
        let err = Parser::new().parse_file(&path).unwrap_err();
        assert!(matches!(err, EdusheetError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Parser::new()
            .parse_file("/definitely/not/here.xlsx")
            .unwrap_err();
        assert!(matches!(err, EdusheetError::Io { .. }));
    }
}
