//! Usage: Persisted application settings (schema + read/write helpers).

use crate::bootstrap::{BootstrapConfig, NATIVE_FALLBACK_DELAY, PERMISSION_CHECK_DEBOUNCE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SCHEMA_VERSION: u32 = 1;
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const DEFAULT_BUNDLE_ID: &str = "com.egghatchplanner.app";
pub const DEFAULT_METRICS_ENDPOINT: &str = "https://metrics.egghatchplanner.app/v1/attribution";
const DEFAULT_METRICS_SALT: &str = "egg-hatch-planner";
const DEFAULT_METRICS_REQUEST_TIMEOUT_SECONDS: u32 = 15;
pub const DEFAULT_REMOTE_CONFIG_URL: &str = "https://config.egghatchplanner.app/v1/remote.json";
const DEFAULT_REMOTE_CONFIG_FLAG_KEY: &str = "is_enabled";
const DEFAULT_REMOTE_CONFIG_TIMEOUT_SECONDS: u32 = 10;
const MAX_REQUEST_TIMEOUT_SECONDS: u32 = 120;
const MAX_NATIVE_FALLBACK_DELAY_MS: u64 = 30_000;
const MAX_PERMISSION_CHECK_DEBOUNCE_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub schema_version: u32,
    pub bundle_id: String,
    pub metrics_endpoint: String,
    pub metrics_salt: String,
    pub metrics_request_timeout_seconds: u32,
    pub remote_config_url: String,
    pub remote_config_flag_key: String,
    pub remote_config_timeout_seconds: u32,
    pub native_fallback_delay_ms: u64,
    pub permission_check_debounce_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            bundle_id: DEFAULT_BUNDLE_ID.to_string(),
            metrics_endpoint: DEFAULT_METRICS_ENDPOINT.to_string(),
            metrics_salt: DEFAULT_METRICS_SALT.to_string(),
            metrics_request_timeout_seconds: DEFAULT_METRICS_REQUEST_TIMEOUT_SECONDS,
            remote_config_url: DEFAULT_REMOTE_CONFIG_URL.to_string(),
            remote_config_flag_key: DEFAULT_REMOTE_CONFIG_FLAG_KEY.to_string(),
            remote_config_timeout_seconds: DEFAULT_REMOTE_CONFIG_TIMEOUT_SECONDS,
            native_fallback_delay_ms: NATIVE_FALLBACK_DELAY.as_millis() as u64,
            permission_check_debounce_ms: PERMISSION_CHECK_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl AppSettings {
    pub fn metrics_request_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.metrics_request_timeout_seconds))
    }

    pub fn remote_config_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.remote_config_timeout_seconds))
    }

    pub fn permission_check_debounce(&self) -> Duration {
        Duration::from_millis(self.permission_check_debounce_ms)
    }

    pub fn bootstrap_config(&self) -> BootstrapConfig {
        BootstrapConfig {
            bundle_id: self.bundle_id.clone(),
            metrics_salt: self.metrics_salt.clone(),
            native_fallback_delay: Duration::from_millis(self.native_fallback_delay_ms),
        }
    }
}

fn sanitize_timeouts(settings: &mut AppSettings) -> bool {
    let mut changed = false;

    if settings.metrics_request_timeout_seconds == 0
        || settings.metrics_request_timeout_seconds > MAX_REQUEST_TIMEOUT_SECONDS
    {
        settings.metrics_request_timeout_seconds = DEFAULT_METRICS_REQUEST_TIMEOUT_SECONDS;
        changed = true;
    }
    if settings.remote_config_timeout_seconds == 0
        || settings.remote_config_timeout_seconds > MAX_REQUEST_TIMEOUT_SECONDS
    {
        settings.remote_config_timeout_seconds = DEFAULT_REMOTE_CONFIG_TIMEOUT_SECONDS;
        changed = true;
    }

    changed
}

fn sanitize_delays(settings: &mut AppSettings) -> bool {
    let mut changed = false;

    if settings.native_fallback_delay_ms > MAX_NATIVE_FALLBACK_DELAY_MS {
        settings.native_fallback_delay_ms = MAX_NATIVE_FALLBACK_DELAY_MS;
        changed = true;
    }
    if settings.permission_check_debounce_ms > MAX_PERMISSION_CHECK_DEBOUNCE_MS {
        settings.permission_check_debounce_ms = MAX_PERMISSION_CHECK_DEBOUNCE_MS;
        changed = true;
    }

    changed
}

fn sanitize_identity(settings: &mut AppSettings) -> bool {
    let mut changed = false;

    let trimmed = settings.bundle_id.trim();
    if trimmed.is_empty() {
        settings.bundle_id = DEFAULT_BUNDLE_ID.to_string();
        changed = true;
    } else if trimmed.len() != settings.bundle_id.len() {
        settings.bundle_id = trimmed.to_string();
        changed = true;
    }

    if settings.remote_config_flag_key.trim().is_empty() {
        settings.remote_config_flag_key = DEFAULT_REMOTE_CONFIG_FLAG_KEY.to_string();
        changed = true;
    }

    changed
}

fn repair_schema_version(settings: &mut AppSettings, schema_version_present: bool) -> bool {
    // A missing field must still be written once, even though serde filled in the current version.
    let mut changed = !schema_version_present;

    if settings.schema_version != SCHEMA_VERSION {
        settings.schema_version = SCHEMA_VERSION;
        changed = true;
    }

    changed
}

fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SETTINGS_FILE_NAME)
}

fn parse_settings_json(content: &str) -> Result<(AppSettings, bool), String> {
    let raw: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| format!("SETTINGS_PARSE: failed to parse settings.json: {e}"))?;
    let schema_version_present = raw.get("schema_version").is_some();
    let settings: AppSettings = serde_json::from_value(raw)
        .map_err(|e| format!("SETTINGS_PARSE: failed to parse settings.json: {e}"))?;
    Ok((settings, schema_version_present))
}

fn validate(settings: &AppSettings) -> Result<(), String> {
    reqwest::Url::parse(settings.metrics_endpoint.trim())
        .map_err(|e| format!("metrics_endpoint must be a valid URL: {e}"))?;
    reqwest::Url::parse(settings.remote_config_url.trim())
        .map_err(|e| format!("remote_config_url must be a valid URL: {e}"))?;
    if settings.bundle_id.trim().is_empty() {
        return Err("bundle_id is required".to_string());
    }
    if settings.metrics_request_timeout_seconds == 0
        || settings.metrics_request_timeout_seconds > MAX_REQUEST_TIMEOUT_SECONDS
    {
        return Err(format!(
            "metrics_request_timeout_seconds must be between 1 and {MAX_REQUEST_TIMEOUT_SECONDS}"
        ));
    }
    if settings.remote_config_timeout_seconds == 0
        || settings.remote_config_timeout_seconds > MAX_REQUEST_TIMEOUT_SECONDS
    {
        return Err(format!(
            "remote_config_timeout_seconds must be between 1 and {MAX_REQUEST_TIMEOUT_SECONDS}"
        ));
    }
    if settings.native_fallback_delay_ms > MAX_NATIVE_FALLBACK_DELAY_MS {
        return Err(format!(
            "native_fallback_delay_ms must be <= {MAX_NATIVE_FALLBACK_DELAY_MS}"
        ));
    }
    if settings.permission_check_debounce_ms > MAX_PERMISSION_CHECK_DEBOUNCE_MS {
        return Err(format!(
            "permission_check_debounce_ms must be <= {MAX_PERMISSION_CHECK_DEBOUNCE_MS}"
        ));
    }
    Ok(())
}

pub fn read(data_dir: &Path) -> Result<AppSettings, String> {
    let path = settings_path(data_dir);

    if !path.exists() {
        let settings = AppSettings::default();
        // Best-effort: create default settings.json on first read to make the config discoverable/editable.
        let _ = write(data_dir, &settings);
        return Ok(settings);
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("SETTINGS_IO: failed to read settings: {e}"))?;
    let (mut settings, schema_version_present) = parse_settings_json(&content)?;

    let mut repaired = false;
    repaired |= repair_schema_version(&mut settings, schema_version_present);
    repaired |= sanitize_identity(&mut settings);
    repaired |= sanitize_timeouts(&mut settings);
    repaired |= sanitize_delays(&mut settings);

    validate(&settings).map_err(|e| format!("SETTINGS_INVALID: {e}"))?;

    if repaired {
        // Best-effort: persist repaired values while keeping read semantics.
        let _ = write(data_dir, &settings);
    }

    Ok(settings)
}

pub fn write(data_dir: &Path, settings: &AppSettings) -> Result<AppSettings, String> {
    validate(settings).map_err(|e| format!("SEC_INVALID_INPUT: {e}"))?;

    let content = serde_json::to_vec_pretty(settings)
        .map_err(|e| format!("SETTINGS_ENCODE: failed to serialize settings: {e}"))?;
    crate::shared::fs::write_file_atomic(&settings_path(data_dir), &content)
        .map_err(|e| format!("SETTINGS_IO: failed to write settings: {e}"))?;

    Ok(settings.clone())
}
