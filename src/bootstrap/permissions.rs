//! Usage: One-shot resolution of the notification and ad-tracking permissions.
//!
//! Each permission resolves at most once per coordinator; concurrent callers share the in-flight
//! resolution and later callers get the cached terminal state. Tracking always waits for the
//! notification prompt first so the two system sheets never overlap.

use super::types::{PermissionState, TrackingResolution};
use crate::blocking;
use crate::infra::kv_store::KvStore;
use crate::shared::mutex_ext::MutexExt;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;

pub const NOTIFICATIONS_ENABLED_KEY: &str = "notifications_enabled";

/// OS-level authorization status before any prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsAuthorization {
    NotDetermined,
    Authorized,
    Denied,
}

#[async_trait]
pub trait PermissionPlatform: Send + Sync {
    async fn notification_authorization(&self) -> Result<OsAuthorization, String>;
    /// Shows the system prompt; resolves with the user's answer.
    async fn request_notification_authorization(&self) -> Result<bool, String>;
    async fn tracking_authorization(&self) -> Result<OsAuthorization, String>;
    /// Shows the system prompt; resolves with the user's answer.
    async fn request_tracking_authorization(&self) -> Result<bool, String>;
    async fn tracking_identifier(&self) -> Option<String>;
}

pub struct PermissionCoordinator {
    platform: Arc<dyn PermissionPlatform>,
    prefs: Option<Arc<KvStore>>,
    notification: OnceCell<PermissionState>,
    tracking: OnceCell<TrackingResolution>,
    debounce: Duration,
    last_foreground_check: Mutex<Option<Instant>>,
}

impl PermissionCoordinator {
    pub fn new(platform: Arc<dyn PermissionPlatform>, debounce: Duration) -> Self {
        Self {
            platform,
            prefs: None,
            notification: OnceCell::new(),
            tracking: OnceCell::new(),
            debounce,
            last_foreground_check: Mutex::new(None),
        }
    }

    /// Mirrors the resolved notification permission into `notifications_enabled`.
    pub fn with_preferences(mut self, prefs: Arc<KvStore>) -> Self {
        self.prefs = Some(prefs);
        self
    }

    pub async fn resolve_notification_permission(&self) -> PermissionState {
        *self
            .notification
            .get_or_init(|| async {
                let state = match self.platform.notification_authorization().await {
                    Ok(OsAuthorization::Authorized) => PermissionState::Granted,
                    Ok(OsAuthorization::Denied) => PermissionState::Denied,
                    Ok(OsAuthorization::NotDetermined) => {
                        match self.platform.request_notification_authorization().await {
                            Ok(granted) => PermissionState::from_granted(granted),
                            Err(err) => {
                                tracing::warn!("notification permission request failed: {}", err);
                                PermissionState::Denied
                            }
                        }
                    }
                    Err(err) => {
                        tracing::warn!("notification permission status failed: {}", err);
                        PermissionState::Denied
                    }
                };

                if let Some(prefs) = self.prefs.clone() {
                    let granted = state == PermissionState::Granted;
                    let persisted = blocking::run("permissions_persist_notifications", move || {
                        prefs.set_bool(NOTIFICATIONS_ENABLED_KEY, granted)
                    })
                    .await;
                    if let Err(err) = persisted {
                        tracing::warn!("failed to persist notifications_enabled: {}", err);
                    }
                }
                tracing::info!(state = ?state, "notification permission resolved");
                state
            })
            .await
    }

    pub async fn resolve_tracking_permission(&self) -> TrackingResolution {
        self.resolve_notification_permission().await;

        self.tracking
            .get_or_init(|| async {
                let granted = match self.platform.tracking_authorization().await {
                    Ok(OsAuthorization::Authorized) => true,
                    Ok(OsAuthorization::Denied) => false,
                    Ok(OsAuthorization::NotDetermined) => {
                        match self.platform.request_tracking_authorization().await {
                            Ok(granted) => granted,
                            Err(err) => {
                                tracing::warn!("tracking permission request failed: {}", err);
                                false
                            }
                        }
                    }
                    Err(err) => {
                        tracing::warn!("tracking permission status failed: {}", err);
                        false
                    }
                };

                let resolution = if granted {
                    TrackingResolution::granted(self.platform.tracking_identifier().await)
                } else {
                    TrackingResolution::denied()
                };
                tracing::info!(
                    state = ?resolution.state,
                    has_identifier = resolution.identifier.is_some(),
                    "tracking permission resolved"
                );
                resolution
            })
            .await
            .clone()
    }

    /// Returns true when a foreground-triggered check may run now; calls inside the debounce
    /// window of the last accepted check are rejected.
    pub fn foreground_check_due(&self, now: Instant) -> bool {
        let mut last = self.last_foreground_check.lock_or_recover();
        if let Some(prev) = *last {
            if now.saturating_duration_since(prev) < self.debounce {
                return false;
            }
        }
        *last = Some(now);
        true
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakePlatform;
    use super::*;
    use crate::shared::test_dirs::unique_tmp_dir;

    fn coordinator(platform: Arc<FakePlatform>) -> PermissionCoordinator {
        PermissionCoordinator::new(platform, Duration::from_millis(500))
    }

    #[tokio::test]
    async fn undetermined_permissions_prompt_once_in_order() {
        let platform = Arc::new(FakePlatform::undetermined(true, true));
        let permissions = coordinator(platform.clone());

        let tracking = permissions.resolve_tracking_permission().await;
        assert_eq!(tracking, TrackingResolution::granted(Some("IDFA-TEST".to_string())));
        assert_eq!(
            permissions.resolve_notification_permission().await,
            PermissionState::Granted
        );

        let again = permissions.resolve_tracking_permission().await;
        assert_eq!(again, tracking);
        assert_eq!(
            permissions.resolve_notification_permission().await,
            PermissionState::Granted
        );

        assert_eq!(platform.prompts(), (1, 1));
        assert_eq!(
            *platform.events.lock_or_recover(),
            vec!["notification_prompt", "tracking_prompt"]
        );
    }

    #[tokio::test]
    async fn determined_permissions_never_prompt() {
        let mut fake = FakePlatform::undetermined(true, true);
        fake.notification_status = Ok(OsAuthorization::Denied);
        fake.tracking_status = Ok(OsAuthorization::Authorized);
        let platform = Arc::new(fake);
        let permissions = coordinator(platform.clone());

        let tracking = permissions.resolve_tracking_permission().await;
        assert_eq!(tracking.state, PermissionState::Granted);
        assert_eq!(
            permissions.resolve_notification_permission().await,
            PermissionState::Denied
        );
        assert_eq!(platform.prompts(), (0, 0));
    }

    #[tokio::test]
    async fn platform_errors_resolve_to_denied_without_identifier() {
        let mut fake = FakePlatform::undetermined(true, true);
        fake.notification_answer = Err("UNUserNotificationCenter failed".to_string());
        fake.tracking_status = Err("ATT unavailable".to_string());
        let permissions = coordinator(Arc::new(fake));

        let tracking = permissions.resolve_tracking_permission().await;
        assert_eq!(tracking, TrackingResolution::denied());
        assert_eq!(
            permissions.resolve_notification_permission().await,
            PermissionState::Denied
        );
    }

    #[tokio::test]
    async fn concurrent_resolutions_share_one_prompt() {
        let mut fake = FakePlatform::undetermined(false, false);
        fake.prompt_delay = Duration::from_millis(20);
        let platform = Arc::new(fake);
        let permissions = coordinator(platform.clone());

        let (a, b, c) = tokio::join!(
            permissions.resolve_tracking_permission(),
            permissions.resolve_tracking_permission(),
            permissions.resolve_notification_permission()
        );
        assert_eq!(a, TrackingResolution::denied());
        assert_eq!(a, b);
        assert_eq!(c, PermissionState::Denied);
        assert_eq!(platform.prompts(), (1, 1));
    }

    #[tokio::test]
    async fn notification_result_is_mirrored_into_preferences() {
        let dir = unique_tmp_dir("permissions");
        let prefs = Arc::new(KvStore::open_in(&dir).expect("open kv"));
        let permissions = coordinator(Arc::new(FakePlatform::undetermined(true, false)))
            .with_preferences(prefs.clone());

        permissions.resolve_notification_permission().await;
        assert_eq!(prefs.get_bool(NOTIFICATIONS_ENABLED_KEY), Some(true));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test(start_paused = true)]
    async fn foreground_checks_are_debounced() {
        let permissions = coordinator(Arc::new(FakePlatform::undetermined(true, true)));
        let start = Instant::now();

        assert!(permissions.foreground_check_due(start));
        assert!(!permissions.foreground_check_due(start + Duration::from_millis(100)));
        assert!(!permissions.foreground_check_due(start + Duration::from_millis(499)));
        assert!(permissions.foreground_check_due(start + Duration::from_millis(500)));
        assert!(!permissions.foreground_check_due(start + Duration::from_millis(600)));
    }
}
