//! Usage: One-shot attribution lookup against the metrics endpoint.
//!
//! Request: `GET <endpoint>?b=<app_id>&t=<hex(sha256(salt:app_id))>`.
//! Response: JSON object with a required `URL`, optional `is_organic`, and extra string fields.

use super::types::AttributionResult;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;

const FIELD_URL: &str = "URL";
const FIELD_IS_ORGANIC: &str = "is_organic";
const MAX_RESPONSE_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributionError {
    #[error("ATTRIBUTION_NETWORK: {0}")]
    Network(String),
    #[error("ATTRIBUTION_INVALID_RESPONSE: {0}")]
    InvalidResponse(String),
}

impl AttributionError {
    pub fn code(&self) -> &'static str {
        match self {
            AttributionError::Network(_) => "network",
            AttributionError::InvalidResponse(_) => "invalid-response",
        }
    }
}

#[async_trait]
pub trait AttributionSource: Send + Sync {
    async fn fetch_attribution(
        &self,
        app_id: &str,
        salt: &str,
        tracking_id: Option<&str>,
    ) -> Result<AttributionResult, AttributionError>;
}

/// Non-secret correlation token: lowercase hex SHA-256 of `salt:app_id`.
pub fn correlation_token(salt: &str, app_id: &str) -> String {
    hex::encode(Sha256::digest(format!("{salt}:{app_id}")))
}

pub fn parse_attribution(body: &[u8]) -> Result<AttributionResult, AttributionError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AttributionError::InvalidResponse(format!("malformed JSON: {e}")))?;
    let Value::Object(object) = value else {
        return Err(AttributionError::InvalidResponse(
            "body is not a JSON object".to_string(),
        ));
    };
    attribution_from_object(object)
}

fn attribution_from_object(object: Map<String, Value>) -> Result<AttributionResult, AttributionError> {
    let raw_url = object
        .get(FIELD_URL)
        .and_then(Value::as_str)
        .map(str::trim)
        .ok_or_else(|| AttributionError::InvalidResponse(format!("missing `{FIELD_URL}`")))?;
    let destination_url = reqwest::Url::parse(raw_url).map_err(|e| {
        AttributionError::InvalidResponse(format!("invalid `{FIELD_URL}`={raw_url}: {e}"))
    })?;

    let is_organic = object
        .get(FIELD_IS_ORGANIC)
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let parameters: BTreeMap<String, String> = object
        .into_iter()
        .filter(|(key, _)| key != FIELD_URL && key != FIELD_IS_ORGANIC)
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            _ => None,
        })
        .collect();

    Ok(AttributionResult {
        is_organic,
        destination_url,
        parameters,
    })
}

#[derive(Debug, Clone)]
pub struct MetricsClient {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    timeout: Duration,
}

impl MetricsClient {
    pub fn new(client: reqwest::Client, endpoint: &str, timeout: Duration) -> Result<Self, String> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err("SEC_INVALID_INPUT: metrics_endpoint is required".to_string());
        }
        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|e| format!("SEC_INVALID_INPUT: invalid metrics_endpoint={endpoint}: {e}"))?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn request_url(&self, app_id: &str, salt: &str) -> reqwest::Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("b", app_id)
            .append_pair("t", &correlation_token(salt, app_id));
        url
    }
}

#[async_trait]
impl AttributionSource for MetricsClient {
    async fn fetch_attribution(
        &self,
        app_id: &str,
        salt: &str,
        tracking_id: Option<&str>,
    ) -> Result<AttributionResult, AttributionError> {
        let url = self.request_url(app_id, salt);
        tracing::debug!(
            endpoint = %self.endpoint,
            app_id = %app_id,
            has_tracking_id = tracking_id.is_some(),
            "fetching attribution"
        );

        let mut resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AttributionError::Network(format!("HTTP_ERROR: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AttributionError::Network(format!(
                "unexpected status {}",
                status.as_u16()
            )));
        }

        let mut body = Vec::<u8>::new();
        loop {
            match resp.chunk().await {
                Ok(Some(chunk)) => {
                    if body.len().saturating_add(chunk.len()) > MAX_RESPONSE_BYTES {
                        return Err(AttributionError::InvalidResponse(format!(
                            "body exceeds {MAX_RESPONSE_BYTES} bytes"
                        )));
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    return Err(AttributionError::Network(format!("STREAM_READ_ERROR: {e}")));
                }
            }
        }

        let result = parse_attribution(&body)?;
        tracing::info!(
            is_organic = result.is_organic,
            parameter_count = result.parameters.len(),
            "attribution received"
        );
        Ok(result)
    }
}
