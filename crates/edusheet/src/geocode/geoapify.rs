//! Geoapify geocoding provider.

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{EdusheetError, Result};

use super::provider::{API_KEY_ENV, Geocoder, GeocoderConfig};

/// Geoapify search API client.
pub struct GeoapifyProvider {
    client: Client,
    config: GeocoderConfig,
}

impl GeoapifyProvider {
    /// Create a provider for the default endpoint with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GeocoderConfig::new(api_key))
    }

    /// Create a provider with custom configuration.
    pub fn with_config(config: GeocoderConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(EdusheetError::Config("Geocoding API key is empty".to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| EdusheetError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create from the `GEOAPIFY_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            EdusheetError::Config(format!("{} environment variable not set", API_KEY_ENV))
        })?;
        Self::new(api_key)
    }

    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }
}

impl Geocoder for GeoapifyProvider {
    fn search(&self, text: &str) -> Result<Value> {
        debug!("GET {} text={:?}", self.config.endpoint, text);

        // The request URL carries the API key, so it is stripped from errors.
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[("text", text), ("apiKey", self.config.api_key.as_str())])
            .send()
            .map_err(|e| EdusheetError::Request(e.without_url().to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| EdusheetError::Request(e.without_url().to_string()))?;

        // A body that is not JSON counts as a failed request, like a bad
        // status. A body that parses but has the wrong shape is left to
        // `first_formatted`.
        response
            .json::<Value>()
            .map_err(|e| EdusheetError::Request(e.without_url().to_string()))
    }

    fn name(&self) -> &str {
        "geoapify"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            GeoapifyProvider::new("  "),
            Err(EdusheetError::Config(_))
        ));
    }

    #[test]
    fn test_connection_refused_is_request_error() {
        // Port 9 (discard) is closed on test machines.
        let config = GeocoderConfig::new("secret-key")
            .with_endpoint("http://127.0.0.1:9/v1/geocode/search")
            .with_timeout(std::time::Duration::from_secs(5));
        let provider = GeoapifyProvider::with_config(config).unwrap();

        let err = provider.first_suggestion("MIT, United States").unwrap_err();
        assert!(err.is_request());
        assert!(!err.to_string().contains("secret-key"));
    }
}
