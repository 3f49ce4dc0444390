//! Usage: Launch-time decision between the native UI and the attribution redirect webview.
//!
//! Services (config store, permissions, attribution, correlation id) are constructed by the host
//! and injected into [`BootstrapCoordinator`]; the coordinator's event loop owns all state.

pub mod attribution;
mod coordinator;
pub mod permissions;
pub mod redirect_url;
pub mod state;
pub mod types;


use std::time::Duration;

pub use attribution::{AttributionError, AttributionSource, MetricsClient};
pub use coordinator::{BootstrapCoordinator, BootstrapHandle, BootstrapServices};
pub use permissions::{OsAuthorization, PermissionCoordinator, PermissionPlatform};
pub use state::{BootstrapState, Phase};
pub use types::{
    AttributionResult, CorrelationIdSource, Decision, PermissionState, StaticCorrelationId,
    TrackingResolution,
};

/// Grace period before falling back to the native UI (lets the splash finish).
pub const NATIVE_FALLBACK_DELAY: Duration = Duration::from_secs(2);
/// Minimum spacing between foreground-triggered permission checks.
pub const PERMISSION_CHECK_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// App bundle identifier; sent as `b` and appended as `bundle`.
    pub bundle_id: String,
    pub metrics_salt: String,
    pub native_fallback_delay: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            bundle_id: crate::infra::settings::DEFAULT_BUNDLE_ID.to_string(),
            metrics_salt: String::new(),
            native_fallback_delay: NATIVE_FALLBACK_DELAY,
        }
    }
}
