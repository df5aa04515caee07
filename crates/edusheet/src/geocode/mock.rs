//! Mock geocoder for testing and dry runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{Value, json};

use crate::error::{EdusheetError, Result};

use super::provider::Geocoder;

/// A scripted reply.
#[derive(Debug, Clone)]
enum Reply {
    Body(Value),
    RequestFailure(String),
    Failure(String),
}

/// Geocoder that replays scripted responses and records every query.
///
/// Once the script runs out, it answers with a single candidate whose
/// `formatted` address echoes the query.
#[derive(Debug, Default)]
pub struct MockGeocoder {
    replies: Mutex<VecDeque<Reply>>,
    queries: Mutex<Vec<String>>,
}

impl MockGeocoder {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response body.
    pub fn respond_with(self, body: Value) -> Self {
        self.push(Reply::Body(body))
    }

    /// Queue a response with one candidate per address.
    pub fn respond_with_addresses(self, addresses: &[&str]) -> Self {
        let features: Vec<Value> = addresses
            .iter()
            .map(|a| json!({"type": "Feature", "properties": {"formatted": a}}))
            .collect();
        self.respond_with(json!({"type": "FeatureCollection", "features": features}))
    }

    /// Queue a network-layer failure.
    pub fn fail_request(self, message: impl Into<String>) -> Self {
        self.push(Reply::RequestFailure(message.into()))
    }

    /// Queue a non-network failure.
    pub fn fail_response(self, message: impl Into<String>) -> Self {
        self.push(Reply::Failure(message.into()))
    }

    /// Every query received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    fn push(self, reply: Reply) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }
}

impl Geocoder for MockGeocoder {
    fn search(&self, text: &str) -> Result<Value> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(text.to_string());
        }

        let reply = self
            .replies
            .lock()
            .map_err(|_| EdusheetError::Config("Mock geocoder lock poisoned".to_string()))?
            .pop_front();

        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::RequestFailure(message)) => Err(EdusheetError::Request(message)),
            Some(Reply::Failure(message)) => Err(EdusheetError::Response(message)),
            None => Ok(json!({
                "type": "FeatureCollection",
                "features": [{"type": "Feature", "properties": {"formatted": text}}]
            })),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
