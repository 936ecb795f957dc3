//! Single-test execution against the target API.
//!
//! Resolves the test's endpoint, issues a bounded GET and evaluates the body.
//! Network and decoding errors are classified as [`ProbeError`] and become a
//! FAIL outcome here; they never reach the execution loop.

use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::checks::{evaluate, fill_placeholders};
use crate::types::{PassFail, TestCase};

/// Failure to obtain a response body for a test.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Request could not be sent or timed out
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// A 200 response whose body is not JSON
    #[error("invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result of running one Automated test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    /// PASS or FAIL
    pub status: PassFail,
    /// Empty on pass, diagnostic text on fail
    pub notes: String,
}

impl TestOutcome {
    /// Returns true for a FAIL outcome.
    pub fn failed(&self) -> bool {
        self.status == PassFail::Fail
    }
}

/// HTTP prober bound to one target service.
#[derive(Clone)]
pub struct Probe {
    client: Client,
    base_url: String,
    placeholders: Arc<HashMap<String, String>>,
}

impl Probe {
    /// Create a prober. `client` should carry the per-request timeout.
    pub fn new(client: Client, base_url: &str, placeholders: HashMap<String, String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            placeholders: Arc::new(placeholders),
        }
    }

    /// Full URL for a templated endpoint.
    ///
    /// The endpoint is appended to the base URL as written; no separator is
    /// inserted, so `?q=1` stays a query on the base URL.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!(
            "{}{}",
            self.base_url,
            fill_placeholders(endpoint, &self.placeholders)
        )
    }

    /// GET the endpoint. Non-200 responses yield an empty object.
    pub async fn fetch(&self, endpoint: &str) -> Result<Value, ProbeError> {
        let url = self.url_for(endpoint);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            debug!(url = %url, status = %status, "Non-200 response treated as empty body");
            return Ok(Value::Object(Map::new()));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Run one test and produce its outcome.
    pub async fn run(&self, test: &TestCase) -> TestOutcome {
        match self.fetch(&test.api_endpoint).await {
            Ok(body) => {
                let passed = evaluate(&body, &test.expected_response, test.check_type.as_ref());
                TestOutcome {
                    status: PassFail::from_passed(passed),
                    notes: if passed {
                        String::new()
                    } else {
                        format!("Unexpected response: {body}")
                    },
                }
            }
            Err(e) => TestOutcome {
                status: PassFail::Fail,
                notes: format!("Error calling API: {e}"),
            },
        }
    }
}
