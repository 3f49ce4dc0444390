//! Usage: Cached bootstrap config (feature flag + redirect URL) over the preferences store.
//!
//! The flag is fetched remotely at most once per install: the first result (or the fail-open
//! default) is persisted and every later read is served from disk.

use super::kv_store::KvStore;
use super::remote_config::RemoteConfigSource;
use crate::blocking;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub const FEATURE_ENABLED_KEY: &str = "feature_enabled";
pub const REDIRECT_URL_KEY: &str = "redirect_url";

const FEATURE_ENABLED_FAIL_OPEN: bool = true;

pub struct ConfigStore {
    kv: Arc<KvStore>,
    remote: Arc<dyn RemoteConfigSource>,
    feature_flag: OnceCell<bool>,
}

impl ConfigStore {
    pub fn new(kv: Arc<KvStore>, remote: Arc<dyn RemoteConfigSource>) -> Self {
        Self {
            kv,
            remote,
            feature_flag: OnceCell::new(),
        }
    }

    pub async fn fetch_feature_flag(&self) -> bool {
        *self
            .feature_flag
            .get_or_init(|| async {
                if let Some(cached) = self.kv.get_bool(FEATURE_ENABLED_KEY) {
                    tracing::debug!(enabled = cached, "feature flag served from cache");
                    return cached;
                }

                let enabled = match self.remote.fetch_flag().await {
                    Ok(v) => v,
                    Err(err) => {
                        tracing::warn!(
                            "remote config fetch failed, failing open: {}",
                            err
                        );
                        FEATURE_ENABLED_FAIL_OPEN
                    }
                };

                let kv = self.kv.clone();
                if let Err(err) = blocking::run("config_store_persist_feature_flag", move || {
                    kv.set_bool(FEATURE_ENABLED_KEY, enabled)
                })
                .await
                {
                    tracing::warn!("failed to persist feature flag: {}", err);
                }
                tracing::info!(enabled, "feature flag resolved");
                enabled
            })
            .await
    }

    pub fn cached_redirect_url(&self) -> Option<String> {
        self.kv
            .get_string(REDIRECT_URL_KEY)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn save_redirect_url(&self, url: &str) -> Result<(), String> {
        self.kv.set_string(REDIRECT_URL_KEY, url)
    }
}
