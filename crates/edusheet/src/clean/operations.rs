//! Cleaning operations that can be applied to a table.

use serde::{Deserialize, Serialize};

/// Where a derived column takes its values from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivedValue {
    /// Copy each row's value from an existing column.
    Copy { column: String },
    /// Same constant in every row.
    Constant { value: String },
    /// The cleaner's fill placeholder in every row.
    Placeholder,
}

impl DerivedValue {
    pub fn copy(column: impl Into<String>) -> Self {
        DerivedValue::Copy {
            column: column.into(),
        }
    }

    pub fn constant(value: impl Into<String>) -> Self {
        DerivedValue::Constant {
            value: value.into(),
        }
    }
}

/// A single cleaning step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CleanOperation {
    /// Remove rows that exactly repeat an earlier row.
    DropDuplicates,

    /// Remove rows where any cell matches a regular expression.
    DropMatching { pattern: String },

    /// Replace blank cells with a placeholder.
    FillBlank { placeholder: String },

    /// Append (or overwrite) a column.
    DeriveColumn { name: String, value: DerivedValue },

    /// Stable ascending sort on the given columns, compared as strings.
    SortBy { keys: Vec<String> },
}

impl CleanOperation {
    /// Get a human-readable description of the operation.
    pub fn description(&self) -> String {
        match self {
            CleanOperation::DropDuplicates => "Remove duplicate rows".to_string(),
            CleanOperation::DropMatching { pattern } => {
                format!("Remove rows matching '{}'", pattern)
            }
            CleanOperation::FillBlank { placeholder } => {
                format!("Fill missing values with '{}'", placeholder)
            }
            CleanOperation::DeriveColumn { name, value } => match value {
                DerivedValue::Copy { column } => format!("Derive '{}' from '{}'", name, column),
                DerivedValue::Constant { value } => format!("Derive '{}' as '{}'", name, value),
                DerivedValue::Placeholder => format!("Derive '{}' as placeholder", name),
            },
            CleanOperation::SortBy { keys } => format!("Sort by {}", keys.join(", ")),
        }
    }
}

/// Result of running a cleaning plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanReport {
    /// Number of operations applied.
    pub operations_applied: usize,

    /// Rows dropped by deduplication and filtering.
    pub rows_removed: usize,

    /// Blank cells replaced by the placeholder.
    pub values_filled: usize,

    /// Columns appended to the table.
    pub columns_added: usize,

    /// One entry per operation, in order.
    pub changes: Vec<CleanChange>,
}

/// What a single operation did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanChange {
    /// Description of the change.
    pub description: String,

    /// Row count before the operation.
    pub rows_before: usize,

    /// Row count after the operation.
    pub rows_after: usize,

    /// Number of cells written.
    pub values_changed: usize,

    /// Whether the operation appended a new column.
    #[serde(default)]
    pub column_added: bool,
}

impl CleanReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a change to the report.
    pub fn add_change(&mut self, change: CleanChange) {
        self.operations_applied += 1;
        self.rows_removed += change.rows_before.saturating_sub(change.rows_after);
        if change.column_added {
            self.columns_added += 1;
        }
        self.changes.push(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description() {
        let op = CleanOperation::DeriveColumn {
            name: "country".into(),
            value: DerivedValue::copy("Country Name"),
        };
        assert_eq!(op.description(), "Derive 'country' from 'Country Name'");
        assert_eq!(
            CleanOperation::SortBy {
                keys: vec!["a".into(), "b".into()]
            }
            .description(),
            "Sort by a, b"
        );
    }

    #[test]
    fn test_operation_serialization() {
        let op = CleanOperation::FillBlank {
            placeholder: "Unknown".into(),
        };
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, r#"{"op":"fill_blank","placeholder":"Unknown"}"#);
        let back: CleanOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn test_report_accumulates() {
        let mut report = CleanReport::new();
        report.add_change(CleanChange {
            description: "drop".into(),
            rows_before: 10,
            rows_after: 7,
            values_changed: 0,
            column_added: false,
        });
        report.add_change(CleanChange {
            description: "derive".into(),
            rows_before: 7,
            rows_after: 7,
            values_changed: 7,
            column_added: true,
        });
        assert_eq!(report.operations_applied, 2);
        assert_eq!(report.rows_removed, 3);
        assert_eq!(report.columns_added, 1);
    }
}
