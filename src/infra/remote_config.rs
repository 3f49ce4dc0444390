//! Usage: Remote feature-flag source (the raw boolean behind the bootstrap redirect gate).

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CACHE_CONTROL};
use std::time::Duration;

#[async_trait]
pub trait RemoteConfigSource: Send + Sync {
    /// Fetches the current flag value, bypassing any intermediate cache.
    async fn fetch_flag(&self) -> Result<bool, String>;
}

/// Reads `flag_key` from a JSON object document served at `url`.
#[derive(Debug, Clone)]
pub struct HttpRemoteConfig {
    client: reqwest::Client,
    url: reqwest::Url,
    flag_key: String,
    timeout: Duration,
}

impl HttpRemoteConfig {
    pub fn new(
        client: reqwest::Client,
        url: &str,
        flag_key: &str,
        timeout: Duration,
    ) -> Result<Self, String> {
        let url = url.trim();
        let url = reqwest::Url::parse(url)
            .map_err(|e| format!("SEC_INVALID_INPUT: invalid remote_config_url={url}: {e}"))?;
        let flag_key = flag_key.trim();
        if flag_key.is_empty() {
            return Err("SEC_INVALID_INPUT: remote_config_flag_key is required".to_string());
        }
        Ok(Self {
            client,
            url,
            flag_key: flag_key.to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl RemoteConfigSource for HttpRemoteConfig {
    async fn fetch_flag(&self) -> Result<bool, String> {
        // Zero expiration: always ask the origin.
        let resp = self
            .client
            .get(self.url.clone())
            .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| format!("REMOTE_CONFIG_HTTP_ERROR: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("REMOTE_CONFIG_HTTP_STATUS: {}", status.as_u16()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| format!("REMOTE_CONFIG_READ_ERROR: {e}"))?;
        let doc: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| format!("REMOTE_CONFIG_INVALID_JSON: {e}"))?;

        doc.get(&self.flag_key)
            .and_then(serde_json::Value::as_bool)
            .ok_or_else(|| format!("REMOTE_CONFIG_MISSING_KEY: {}", self.flag_key))
    }
}
