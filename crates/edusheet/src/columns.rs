//! Column names used by the institution spreadsheets.

/// Source columns expected in the input spreadsheet.
pub const EDUCATION_INSTITUTE: &str = "Education Institute";
pub const COUNTRY_NAME: &str = "Country Name";
pub const REGION: &str = "Region";
pub const FIELD_OF_STUDY: &str = "Field of Study";

/// Columns appended by the cleaner.
pub const DERIVED_CONTINENT: &str = "continent";
pub const DERIVED_COUNTRY: &str = "country";
pub const DERIVED_REGION: &str = "region";
pub const DERIVED_STATE: &str = "state";
pub const DERIVED_INSTITUTION: &str = "education institution";
pub const DERIVED_FIELD_OF_STUDY: &str = "field of study";

/// Column appended by the annotator.
pub const ADDRESS_SUGGESTIONS: &str = "Address Suggestions";

/// Fill value for missing or undetermined cells.
pub const PLACEHOLDER: &str = "Unknown";
