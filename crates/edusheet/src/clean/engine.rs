//! Cleaning engine: deduplicate, filter, fill, derive and sort a table.

use std::cmp::Ordering;

use indexmap::IndexSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::columns;
use crate::error::{EdusheetError, Result};
use crate::input::DataTable;

use super::operations::{CleanChange, CleanOperation, CleanReport, DerivedValue};

/// Configuration for the cleaner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanConfig {
    /// Remove exact duplicate rows.
    pub drop_duplicates: bool,
    /// Rows with a cell matching this regex are removed (None = keep all).
    pub drop_pattern: Option<String>,
    /// Replacement for blank cells.
    pub placeholder: String,
    /// Columns appended after filling, in order.
    pub derived: Vec<(String, DerivedValue)>,
    /// Sort keys, most significant first.
    pub sort_keys: Vec<String>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            drop_duplicates: true,
            drop_pattern: Some("Total".to_string()),
            placeholder: columns::PLACEHOLDER.to_string(),
            derived: vec![
                (columns::DERIVED_CONTINENT.to_string(), DerivedValue::Placeholder),
                (
                    columns::DERIVED_COUNTRY.to_string(),
                    DerivedValue::copy(columns::COUNTRY_NAME),
                ),
                (
                    columns::DERIVED_REGION.to_string(),
                    DerivedValue::copy(columns::REGION),
                ),
                (columns::DERIVED_STATE.to_string(), DerivedValue::Placeholder),
                (
                    columns::DERIVED_INSTITUTION.to_string(),
                    DerivedValue::copy(columns::EDUCATION_INSTITUTE),
                ),
                (
                    columns::DERIVED_FIELD_OF_STUDY.to_string(),
                    DerivedValue::copy(columns::FIELD_OF_STUDY),
                ),
            ],
            sort_keys: [
                columns::DERIVED_CONTINENT,
                columns::DERIVED_COUNTRY,
                columns::DERIVED_REGION,
                columns::DERIVED_STATE,
                columns::DERIVED_INSTITUTION,
                columns::DERIVED_FIELD_OF_STUDY,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl CleanConfig {
    /// Use a different fill placeholder.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Use a different row filter; `None` disables it.
    pub fn with_drop_pattern(mut self, pattern: Option<String>) -> Self {
        self.drop_pattern = pattern;
        self
    }
}

/// Applies a cleaning plan to tables.
pub struct Cleaner {
    config: CleanConfig,
}

impl Cleaner {
    /// Create a cleaner with the default plan.
    pub fn new() -> Self {
        Self::with_config(CleanConfig::default())
    }

    /// Create a cleaner with custom configuration.
    pub fn with_config(config: CleanConfig) -> Self {
        Self { config }
    }

    /// The operations [`apply`](Self::apply) runs, in order.
    pub fn plan(&self) -> Vec<CleanOperation> {
        let mut plan = Vec::new();

        if self.config.drop_duplicates {
            plan.push(CleanOperation::DropDuplicates);
        }
        if let Some(ref pattern) = self.config.drop_pattern {
            plan.push(CleanOperation::DropMatching {
                pattern: pattern.clone(),
            });
        }
        plan.push(CleanOperation::FillBlank {
            placeholder: self.config.placeholder.clone(),
        });
        for (name, value) in &self.config.derived {
            plan.push(CleanOperation::DeriveColumn {
                name: name.clone(),
                value: self.resolve(value),
            });
        }
        if !self.config.sort_keys.is_empty() {
            plan.push(CleanOperation::SortBy {
                keys: self.config.sort_keys.clone(),
            });
        }

        plan
    }

    /// Run the configured plan over `data`.
    pub fn apply(&self, data: &mut DataTable) -> Result<CleanReport> {
        self.apply_operations(&self.plan(), data)
    }

    /// Run arbitrary operations over `data`.
    ///
    /// The whole plan is checked before anything runs: a missing column or
    /// a bad pattern fails without touching the table.
    pub fn apply_operations(
        &self,
        operations: &[CleanOperation],
        data: &mut DataTable,
    ) -> Result<CleanReport> {
        let patterns = self.check_plan(operations, data)?;
        let mut patterns = patterns.into_iter();
        let mut report = CleanReport::new();

        for operation in operations {
            let rows_before = data.row_count();
            let (values_changed, column_added) = match operation {
                CleanOperation::DropDuplicates => (self.drop_duplicates(data), false),
                CleanOperation::DropMatching { .. } => {
                    let regex = patterns
                        .next()
                        .ok_or_else(|| EdusheetError::Config("Pattern missing".to_string()))?;
                    (self.drop_matching(&regex, data), false)
                }
                CleanOperation::FillBlank { placeholder } => {
                    let filled = self.fill_blank(placeholder, data);
                    report.values_filled += filled;
                    (filled, false)
                }
                CleanOperation::DeriveColumn { name, value } => {
                    self.derive_column(name, value, data)?
                }
                CleanOperation::SortBy { keys } => (self.sort_by(keys, data)?, false),
            };

            let change = CleanChange {
                description: operation.description(),
                rows_before,
                rows_after: data.row_count(),
                values_changed,
                column_added,
            };
            info!(
                "{}: {} -> {} rows, {} values changed",
                change.description, change.rows_before, change.rows_after, change.values_changed
            );
            report.add_change(change);
        }

        Ok(report)
    }

    fn resolve(&self, value: &DerivedValue) -> DerivedValue {
        match value {
            DerivedValue::Placeholder => DerivedValue::constant(&self.config.placeholder),
            other => other.clone(),
        }
    }

    /// Validate columns and compile patterns for a plan, in plan order.
    fn check_plan(&self, operations: &[CleanOperation], data: &DataTable) -> Result<Vec<Regex>> {
        let mut available: Vec<&str> = data.headers.iter().map(|h| h.as_str()).collect();
        let mut patterns = Vec::new();

        for operation in operations {
            match operation {
                CleanOperation::DropMatching { pattern } => patterns.push(Regex::new(pattern)?),
                CleanOperation::DeriveColumn { name, value } => {
                    if let DerivedValue::Copy { column } = value {
                        if !available.contains(&column.as_str()) {
                            return Err(EdusheetError::MissingColumn(column.clone()));
                        }
                    }
                    if !available.contains(&name.as_str()) {
                        available.push(name.as_str());
                    }
                }
                CleanOperation::SortBy { keys } => {
                    if let Some(key) = keys.iter().find(|k| !available.contains(&k.as_str())) {
                        return Err(EdusheetError::MissingColumn(key.clone()));
                    }
                }
                CleanOperation::DropDuplicates | CleanOperation::FillBlank { .. } => {}
            }
        }

        Ok(patterns)
    }

    /// Keep the first occurrence of each distinct row.
    fn drop_duplicates(&self, data: &mut DataTable) -> usize {
        let unique: IndexSet<Vec<String>> = data.rows.drain(..).collect();
        data.rows = unique.into_iter().collect();
        0
    }

    fn drop_matching(&self, regex: &Regex, data: &mut DataTable) -> usize {
        data.rows.retain(|row| !row.iter().any(|cell| regex.is_match(cell)));
        0
    }

    fn fill_blank(&self, placeholder: &str, data: &mut DataTable) -> usize {
        let mut filled = 0;
        for cell in data.rows.iter_mut().flatten() {
            if DataTable::is_blank(cell) {
                *cell = placeholder.to_string();
                filled += 1;
            }
        }
        filled
    }

    /// Returns (cells written, whether a new column was appended).
    fn derive_column(
        &self,
        name: &str,
        value: &DerivedValue,
        data: &mut DataTable,
    ) -> Result<(usize, bool)> {
        let values: Vec<String> = match value {
            DerivedValue::Copy { column } => {
                let source = data.require_column(column)?;
                data.column_values(source).map(str::to_string).collect()
            }
            DerivedValue::Constant { value } => vec![value.clone(); data.row_count()],
            DerivedValue::Placeholder => vec![self.config.placeholder.clone(); data.row_count()],
        };

        let (index, added) = match data.column_index(name) {
            Some(index) => {
                debug!("Overwriting existing column '{}'", name);
                (index, false)
            }
            None => (data.add_column(name.to_string(), String::new()), true),
        };

        let written = values.len();
        for (row, value) in values.into_iter().enumerate() {
            data.set(row, index, value);
        }

        Ok((written, added))
    }

    /// Stable sort; returns how many rows changed position.
    fn sort_by(&self, keys: &[String], data: &mut DataTable) -> Result<usize> {
        let key_indices = keys
            .iter()
            .map(|k| data.require_column(k))
            .collect::<Result<Vec<_>>>()?;

        let mut order: Vec<usize> = (0..data.row_count()).collect();
        order.sort_by(|&a, &b| compare_rows(&data.rows[a], &data.rows[b], &key_indices));

        let moved = order.iter().enumerate().filter(|(pos, idx)| pos != *idx).count();
        if moved > 0 {
            let mut rows: Vec<Option<Vec<String>>> = data.rows.drain(..).map(Some).collect();
            data.rows = order.into_iter().filter_map(|i| rows[i].take()).collect();
        }

        Ok(moved)
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Lexical comparison on the key columns, most significant first.
fn compare_rows(a: &[String], b: &[String], keys: &[usize]) -> Ordering {
    keys.iter()
        .map(|&k| a[k].cmp(&b[k]))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        ["Education Institute", "Country Name", "Region", "Field of Study"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> DataTable {
        DataTable::new(
            headers(),
            vec![
                row(&["Uni B", "Norway", "Oslo", "Physics"]),
                row(&["Uni A", "Norway", "", "Biology"]),
                row(&["Uni B", "Norway", "Oslo", "Physics"]),
                row(&["Total", "", "", ""]),
                row(&["Uni C", "Chile", "Grand Total", "Law"]),
                row(&["Uni D", "Austria", "Tyrol", ""]),
            ],
        )
    }

    #[test]
    fn test_default_plan() {
        let plan = Cleaner::new().plan();
        assert_eq!(plan.len(), 10);
        assert_eq!(plan[0], CleanOperation::DropDuplicates);
        assert_eq!(
            plan[3],
            CleanOperation::DeriveColumn {
                name: "continent".into(),
                value: DerivedValue::constant("Unknown"),
            }
        );
        assert!(matches!(plan[9], CleanOperation::SortBy { ref keys } if keys.len() == 6));
    }

    #[test]
    fn test_apply_default_plan() {
        let mut table = sample();
        let report = Cleaner::new().apply(&mut table).unwrap();

        assert_eq!(
            table.headers,
            vec![
                "Education Institute",
                "Country Name",
                "Region",
                "Field of Study",
                "continent",
                "country",
                "region",
                "state",
                "education institution",
                "field of study",
            ]
        );
        assert_eq!(table.row_count(), 3);
        assert_eq!(report.rows_removed, 3);
        assert_eq!(report.columns_added, 6);
        assert_eq!(report.values_filled, 2);

        // Sorted by country first, then region.
        let countries = table.column_by_name("country").unwrap();
        assert_eq!(countries, vec!["Austria", "Norway", "Norway"]);
        let regions = table.column_by_name("region").unwrap();
        assert_eq!(regions, vec!["Tyrol", "Oslo", "Unknown"]);
        assert_eq!(table.get(0, 3), Some("Unknown"));
        assert_eq!(table.get(0, 9), Some("Unknown"));
        assert!(table.column_values(4).all(|v| v == "Unknown"));
        assert!(table.column_values(7).all(|v| v == "Unknown"));
    }

    #[test]
    fn test_drop_duplicates_keeps_first_occurrence_order() {
        let mut table = DataTable::new(
            vec!["a".into()],
            vec![row(&["x"]), row(&["y"]), row(&["x"]), row(&["z"]), row(&["y"])],
        );
        Cleaner::new()
            .apply_operations(&[CleanOperation::DropDuplicates], &mut table)
            .unwrap();
        assert_eq!(table.rows, vec![row(&["x"]), row(&["y"]), row(&["z"])]);
    }

    #[test]
    fn test_drop_matching_is_case_sensitive() {
        let mut table = DataTable::new(
            vec!["a".into()],
            vec![row(&["Subtotal"]), row(&["TOTAL"]), row(&["Totals"])],
        );
        Cleaner::new()
            .apply_operations(
                &[CleanOperation::DropMatching {
                    pattern: "Total".into(),
                }],
                &mut table,
            )
            .unwrap();
        assert_eq!(table.rows, vec![row(&["Subtotal"]), row(&["TOTAL"])]);
    }

    #[test]
    fn test_derive_overwrites_existing_column() {
        let mut table = DataTable::new(
            vec!["Country Name".into(), "country".into()],
            vec![row(&["Peru", "old"])],
        );
        let report = Cleaner::new()
            .apply_operations(
                &[CleanOperation::DeriveColumn {
                    name: "country".into(),
                    value: DerivedValue::copy("Country Name"),
                }],
                &mut table,
            )
            .unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.rows[0], row(&["Peru", "Peru"]));
        assert_eq!(report.columns_added, 0);
    }

    #[test]
    fn test_custom_placeholder_flows_into_constant_columns() {
        let mut table = sample();
        Cleaner::with_config(CleanConfig::default().with_placeholder("?"))
            .apply(&mut table)
            .unwrap();
        assert!(table.column_by_name("state").unwrap().iter().all(|v| *v == "?"));
        assert!(!table.rows.iter().flatten().any(|c| c == "Unknown"));
    }

    #[test]
    fn test_missing_source_column_leaves_table_untouched() {
        let mut table = DataTable::new(vec!["Education Institute".into()], vec![row(&[""])]);
        let before = table.clone();
        let err = Cleaner::new().apply(&mut table).unwrap_err();
        assert!(matches!(err, EdusheetError::MissingColumn(ref c) if c == "Country Name"));
        assert_eq!(table, before);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let mut table = sample();
        let config = CleanConfig::default().with_drop_pattern(Some("(".into()));
        let err = Cleaner::with_config(config).apply(&mut table).unwrap_err();
        assert!(matches!(err, EdusheetError::Regex(_)));
        assert_eq!(table, sample());
    }

    #[test]
    fn test_sort_is_stable() {
        let mut table = DataTable::new(
            vec!["k".into(), "v".into()],
            vec![row(&["b", "1"]), row(&["a", "2"]), row(&["b", "3"]), row(&["a", "4"])],
        );
        let report = Cleaner::new()
            .apply_operations(&[CleanOperation::SortBy { keys: vec!["k".into()] }], &mut table)
            .unwrap();
        assert_eq!(
            table.rows,
            vec![row(&["a", "2"]), row(&["a", "4"]), row(&["b", "1"]), row(&["b", "3"])]
        );
        assert_eq!(report.changes[0].values_changed, 4);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let cleaner = Cleaner::new();
        let mut once = sample();
        cleaner.apply(&mut once).unwrap();
        let mut twice = once.clone();
        cleaner.apply(&mut twice).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_table() {
        let mut table = DataTable::empty(headers());
        let report = Cleaner::new().apply(&mut table).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 10);
        assert_eq!(report.rows_removed, 0);
    }
}
