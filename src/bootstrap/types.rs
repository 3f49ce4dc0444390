//! Usage: Value types shared by the bootstrap services and the UI host.

use serde::Serialize;
use std::collections::BTreeMap;

/// Terminal-once launch decision observed by the UI host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum Decision {
    Pending,
    ShowNative,
    ShowRedirect(String),
}

impl Decision {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Decision::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    Unresolved,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_resolved(self) -> bool {
        !matches!(self, PermissionState::Unresolved)
    }

    pub fn from_granted(granted: bool) -> Self {
        if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingResolution {
    pub state: PermissionState,
    /// Only present when `state == Granted`.
    pub identifier: Option<String>,
}

impl TrackingResolution {
    pub fn granted(identifier: Option<String>) -> Self {
        Self {
            state: PermissionState::Granted,
            identifier: identifier.filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn denied() -> Self {
        Self {
            state: PermissionState::Denied,
            identifier: None,
        }
    }
}

/// Server-side attribution decision for this install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionResult {
    pub is_organic: bool,
    pub destination_url: reqwest::Url,
    /// String-valued extra fields; never contains `is_organic` or `URL`.
    pub parameters: BTreeMap<String, String>,
}

/// Opaque id from the push/analytics SDK attached to outbound redirect URLs.
pub trait CorrelationIdSource: Send + Sync {
    fn correlation_id(&self) -> Option<String>;
}

/// Correlation source for hosts without a push SDK.
#[derive(Debug, Clone, Default)]
pub struct StaticCorrelationId(pub Option<String>);

impl CorrelationIdSource for StaticCorrelationId {
    fn correlation_id(&self) -> Option<String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_serializes_with_kind_tag() {
        assert_eq!(
            serde_json::to_value(Decision::ShowRedirect("https://x.test/".to_string()))
                .expect("json"),
            serde_json::json!({ "kind": "show_redirect", "url": "https://x.test/" })
        );
        assert_eq!(
            serde_json::to_value(Decision::ShowNative).expect("json"),
            serde_json::json!({ "kind": "show_native" })
        );
        assert!(!Decision::Pending.is_terminal());
        assert!(Decision::ShowNative.is_terminal());
    }

    #[test]
    fn granted_tracking_drops_blank_identifier() {
        assert_eq!(TrackingResolution::granted(Some("  ".to_string())).identifier, None);
        assert_eq!(
            TrackingResolution::granted(Some("IDFA1".to_string())).identifier.as_deref(),
            Some("IDFA1")
        );
    }
}
