//! Geocoder trait and response handling.

use std::time::Duration;

use serde_json::Value;

use crate::error::{EdusheetError, Result};

/// Default search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.geoapify.com/v1/geocode/search";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEOAPIFY_API_KEY";

/// Configuration for HTTP geocoders.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Search endpoint URL.
    pub endpoint: String,

    /// API key sent as the `apiKey` query parameter.
    pub api_key: String,

    /// Request timeout (None = the HTTP client's default).
    pub timeout: Option<Duration>,
}

impl GeocoderConfig {
    /// Configuration for the default endpoint with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            timeout: None,
        }
    }

    /// Point at a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A free-text search service returning GeoJSON-style feature collections.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait Geocoder: Send + Sync {
    /// Run a search and return the raw JSON body.
    ///
    /// Network failures, non-success statuses and bodies that are not JSON
    /// are [`EdusheetError::Request`].
    fn search(&self, text: &str) -> Result<Value>;

    /// Get the name of this provider (for logging).
    fn name(&self) -> &str;

    /// The `formatted` address of the first candidate, if any.
    fn first_suggestion(&self, text: &str) -> Result<Option<String>> {
        let body = self.search(text)?;
        first_formatted(&body)
    }
}

/// Pull `features[0].properties.formatted` out of a response body.
///
/// An absent or empty `features` (including `null`, `{}` and other empty
/// values) means no candidates, as does a first feature without
/// `properties` or a `properties` without `formatted`. A `formatted` of
/// `null` yields an empty address. Anything else that is not the expected
/// shape, such as `"properties": null`, is a [`EdusheetError::Response`].
pub fn first_formatted(body: &Value) -> Result<Option<String>> {
    let Value::Object(body) = body else {
        return Err(EdusheetError::Response(format!(
            "body is not an object: {}",
            type_name(body)
        )));
    };

    let features = match body.get("features") {
        None => return Ok(None),
        Some(value) if is_empty_value(value) => return Ok(None),
        Some(Value::Array(features)) => features,
        Some(other) => {
            return Err(EdusheetError::Response(format!(
                "'features' is not a list: {}",
                type_name(other)
            )));
        }
    };

    let Value::Object(feature) = &features[0] else {
        return Err(EdusheetError::Response(format!(
            "first feature is not an object: {}",
            type_name(&features[0])
        )));
    };

    let properties = match feature.get("properties") {
        None => return Ok(None),
        Some(Value::Object(properties)) => properties,
        Some(other) => {
            return Err(EdusheetError::Response(format!(
                "'properties' is not an object: {}",
                type_name(other)
            )));
        }
    };

    Ok(match properties.get("formatted") {
        None => None,
        Some(Value::Null) => Some(String::new()),
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    })
}

/// `null`, `false`, zero and empty strings, arrays and objects.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_formatted_takes_first_feature() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [
                {"properties": {"formatted": "77 Massachusetts Ave, Cambridge, MA, United States"}},
                {"properties": {"formatted": "second"}}
            ]
        });
        assert_eq!(
            first_formatted(&body).unwrap().as_deref(),
            Some("77 Massachusetts Ave, Cambridge, MA, United States")
        );
    }

    #[test]
    fn test_no_features() {
        assert_eq!(first_formatted(&json!({"features": []})).unwrap(), None);
        assert_eq!(first_formatted(&json!({})).unwrap(), None);
        assert_eq!(first_formatted(&json!({"features": null})).unwrap(), None);
    }

    #[test]
    fn test_missing_formatted() {
        let body = json!({"features": [{"properties": {"city": "Oslo"}}]});
        assert_eq!(first_formatted(&body).unwrap(), None);
        let body = json!({"features": [{"geometry": {}}]});
        assert_eq!(first_formatted(&body).unwrap(), None);
    }

    #[test]
    fn test_empty_features_of_any_kind() {
        for features in [json!({}), json!(""), json!(false), json!(0)] {
            assert_eq!(first_formatted(&json!({"features": features})).unwrap(), None);
        }
    }

    #[test]
    fn test_null_formatted_is_empty_address() {
        let body = json!({"features": [{"properties": {"formatted": null}}]});
        assert_eq!(first_formatted(&body).unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_null_properties_is_response_error() {
        let body = json!({"features": [{"properties": null}]});
        let err = first_formatted(&body).unwrap_err();
        assert!(matches!(err, EdusheetError::Response(_)));
        assert!(err.to_string().contains("'properties' is not an object: null"));
    }

    #[test]
    fn test_non_string_formatted_uses_json_text() {
        let body = json!({"features": [{"properties": {"formatted": 42}}]});
        assert_eq!(first_formatted(&body).unwrap().as_deref(), Some("42"));
    }

    #[test]
    fn test_bad_shapes_are_response_errors() {
        for body in [
            json!({"features": "nope"}),
            json!({"features": [7]}),
            json!({"features": [{"properties": [1, 2]}]}),
            json!({"features": {"0": {}}}),
            json!([{"features": []}]),
        ] {
            assert!(matches!(
                first_formatted(&body),
                Err(EdusheetError::Response(_))
            ));
        }
    }

    #[test]
    fn test_config_builder() {
        let config = GeocoderConfig::new("key")
            .with_endpoint("http://localhost:8080/search")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.endpoint, "http://localhost:8080/search");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(GeocoderConfig::new("k").endpoint, DEFAULT_ENDPOINT);
    }
}
