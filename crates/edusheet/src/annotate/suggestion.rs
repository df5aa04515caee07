//! Address suggestion attached to an annotated row.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EdusheetError, Result};

/// Outcome of looking up one row.
///
/// The [`Display`](fmt::Display) form is what lands in the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Suggestion {
    /// Formatted address of the first candidate.
    Address(String),
    /// The service returned no candidates.
    NoSuggestion,
    /// The request failed at the network layer.
    RequestError(String),
    /// Any other failure, such as an unusable response.
    Error(String),
}

impl Suggestion {
    /// Turn a lookup result into a suggestion. Never fails.
    pub fn from_lookup(result: Result<Option<String>>) -> Self {
        match result {
            Ok(Some(address)) => Suggestion::Address(address),
            Ok(None) => Suggestion::NoSuggestion,
            Err(EdusheetError::Request(message)) => Suggestion::RequestError(message),
            Err(other) => Suggestion::Error(other.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Suggestion::RequestError(_) | Suggestion::Error(_))
    }

    /// Short label for summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Suggestion::Address(_) => "address",
            Suggestion::NoSuggestion => "no suggestion",
            Suggestion::RequestError(_) => "request error",
            Suggestion::Error(_) => "error",
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::Address(address) => write!(f, "{}", address),
            Suggestion::NoSuggestion => write!(f, "No suggestion"),
            Suggestion::RequestError(message) => write!(f, "Request error: {}", message),
            Suggestion::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_strings() {
        assert_eq!(
            Suggestion::from_lookup(Ok(Some("Oslo, Norway".into()))).to_string(),
            "Oslo, Norway"
        );
        assert_eq!(Suggestion::from_lookup(Ok(None)).to_string(), "No suggestion");

        let request = Suggestion::from_lookup(Err(EdusheetError::Request("timed out".into())));
        assert_eq!(request.to_string(), "Request error: timed out");
        assert!(request.is_error());

        let other = Suggestion::from_lookup(Err(EdusheetError::Response("bad body".into())));
        assert_eq!(other.to_string(), "Error: Unexpected response: bad body");
        assert_eq!(other.label(), "error");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Suggestion::NoSuggestion).unwrap();
        assert_eq!(json, r#"{"kind":"no_suggestion"}"#);
        let json = serde_json::to_string(&Suggestion::Address("X".into())).unwrap();
        assert_eq!(json, r#"{"kind":"address","detail":"X"}"#);
    }
}
