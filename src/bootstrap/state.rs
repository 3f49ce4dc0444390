//! Usage: Pure launch state machine; every completion is folded in through `apply`.
//!
//! `apply` returns at most one effect for the event loop to run. Side-effecting transitions only
//! leave `WaitingOnPermissionsAndConfig`, `FetchingAttribution` and `FallbackScheduled` once, so
//! the attribution request and the terminal decision each happen at most once per state.

use super::types::{Decision, PermissionState, TrackingResolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitingOnPermissionsAndConfig,
    FetchingAttribution,
    FallbackScheduled,
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    ConfigFetched {
        enabled: bool,
        cached_url: Option<String>,
    },
    NotificationResolved(PermissionState),
    TrackingResolved(TrackingResolution),
    /// Built redirect URL, or `None` when the fetch or the build failed.
    AttributionFinished(Option<String>),
    FallbackElapsed,
    AppForeground,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Effect {
    CheckPermissions,
    FetchAttribution { tracking_id: Option<String> },
    ScheduleNativeFallback,
    PublishRedirect(String),
    PublishNative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapState {
    pub phase: Phase,
    pub is_config_fetched: bool,
    pub is_feature_enabled: bool,
    pub notification_state: PermissionState,
    pub tracking_state: PermissionState,
    pub tracking_id: Option<String>,
    pub cached_url: Option<String>,
    pub resolved_url: Option<String>,
    pub decision: Decision,
}

impl Default for BootstrapState {
    fn default() -> Self {
        Self {
            phase: Phase::WaitingOnPermissionsAndConfig,
            is_config_fetched: false,
            is_feature_enabled: false,
            notification_state: PermissionState::Unresolved,
            tracking_state: PermissionState::Unresolved,
            tracking_id: None,
            cached_url: None,
            resolved_url: None,
            decision: Decision::Pending,
        }
    }
}

impl BootstrapState {
    pub fn permissions_resolved(&self) -> bool {
        self.notification_state.is_resolved() && self.tracking_state.is_resolved()
    }

    pub(crate) fn apply(&mut self, event: Event) -> Option<Effect> {
        if self.phase == Phase::Terminal {
            return None;
        }

        match event {
            Event::ConfigFetched {
                enabled,
                cached_url,
            } => {
                if self.is_config_fetched {
                    return None;
                }
                self.is_config_fetched = true;
                self.is_feature_enabled = enabled;
                self.cached_url = cached_url;
            }
            Event::NotificationResolved(state) => {
                if !self.notification_state.is_resolved() {
                    self.notification_state = state;
                }
            }
            Event::TrackingResolved(resolution) => {
                if !self.tracking_state.is_resolved() {
                    self.tracking_state = resolution.state;
                    self.tracking_id = resolution.identifier;
                }
            }
            Event::AttributionFinished(built) => {
                if self.phase != Phase::FetchingAttribution {
                    return None;
                }
                return match built {
                    Some(url) => Some(self.finish_redirect(url)),
                    None => Some(self.schedule_native()),
                };
            }
            Event::FallbackElapsed => {
                if self.phase != Phase::FallbackScheduled {
                    return None;
                }
                self.phase = Phase::Terminal;
                self.decision = Decision::ShowNative;
                return Some(Effect::PublishNative);
            }
            Event::AppForeground => {
                if self.phase == Phase::WaitingOnPermissionsAndConfig
                    && !self.permissions_resolved()
                {
                    return Some(Effect::CheckPermissions);
                }
                return None;
            }
        }

        self.evaluate()
    }

    fn evaluate(&mut self) -> Option<Effect> {
        if self.phase != Phase::WaitingOnPermissionsAndConfig {
            return None;
        }
        if !self.is_config_fetched || !self.permissions_resolved() {
            return None;
        }

        if !self.is_feature_enabled {
            return Some(self.schedule_native());
        }

        if let Some(cached) = self.cached_url.clone() {
            return Some(self.finish_redirect(cached));
        }

        self.phase = Phase::FetchingAttribution;
        Some(Effect::FetchAttribution {
            tracking_id: self.tracking_id.clone(),
        })
    }

    fn schedule_native(&mut self) -> Effect {
        self.phase = Phase::FallbackScheduled;
        Effect::ScheduleNativeFallback
    }

    fn finish_redirect(&mut self, url: String) -> Effect {
        self.phase = Phase::Terminal;
        self.resolved_url = Some(url.clone());
        self.decision = Decision::ShowRedirect(url.clone());
        Effect::PublishRedirect(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted_both(state: &mut BootstrapState) -> Option<Effect> {
        assert_eq!(
            state.apply(Event::NotificationResolved(PermissionState::Granted)),
            None
        );
        state.apply(Event::TrackingResolved(TrackingResolution::granted(Some(
            "IDFA1".to_string(),
        ))))
    }

    fn config(enabled: bool, cached_url: Option<&str>) -> Event {
        Event::ConfigFetched {
            enabled,
            cached_url: cached_url.map(str::to_string),
        }
    }

    #[test]
    fn disabled_config_wins_over_cached_url() {
        let mut state = BootstrapState::default();
        assert_eq!(state.apply(config(false, Some("https://x.test/c"))), None);
        assert_eq!(granted_both(&mut state), Some(Effect::ScheduleNativeFallback));
        assert_eq!(state.resolved_url, None);

        assert_eq!(state.apply(Event::FallbackElapsed), Some(Effect::PublishNative));
        assert_eq!(state.decision, Decision::ShowNative);
    }

    #[test]
    fn disabled_waits_for_permissions_then_schedules_native() {
        let mut state = BootstrapState::default();
        assert_eq!(state.apply(config(false, None)), None);
        assert_eq!(granted_both(&mut state), Some(Effect::ScheduleNativeFallback));
        assert_eq!(state.phase, Phase::FallbackScheduled);
        assert_eq!(state.decision, Decision::Pending);

        assert_eq!(state.apply(Event::FallbackElapsed), Some(Effect::PublishNative));
        assert_eq!(state.decision, Decision::ShowNative);
        assert_eq!(state.phase, Phase::Terminal);
    }

    #[test]
    fn permissions_first_then_config_is_order_independent() {
        let mut state = BootstrapState::default();
        assert_eq!(granted_both(&mut state), None);
        assert_eq!(
            state.apply(config(true, None)),
            Some(Effect::FetchAttribution {
                tracking_id: Some("IDFA1".to_string())
            })
        );
        assert_eq!(state.phase, Phase::FetchingAttribution);
    }

    #[test]
    fn cached_url_redirects_immediately_once_permissions_resolve() {
        let mut state = BootstrapState::default();
        assert_eq!(state.apply(config(true, Some("https://x.test/c"))), None);
        assert_eq!(
            state.apply(Event::NotificationResolved(PermissionState::Denied)),
            None
        );
        assert_eq!(
            state.apply(Event::TrackingResolved(TrackingResolution::denied())),
            Some(Effect::PublishRedirect("https://x.test/c".to_string()))
        );
        assert_eq!(
            state.decision,
            Decision::ShowRedirect("https://x.test/c".to_string())
        );
        assert_eq!(state.resolved_url.as_deref(), Some("https://x.test/c"));
    }

    #[test]
    fn attribution_is_requested_once_despite_repeated_events() {
        let mut state = BootstrapState::default();
        assert_eq!(state.apply(config(true, None)), None);
        assert!(matches!(
            granted_both(&mut state),
            Some(Effect::FetchAttribution { .. })
        ));

        assert_eq!(state.apply(config(true, None)), None);
        assert_eq!(
            state.apply(Event::NotificationResolved(PermissionState::Granted)),
            None
        );
        assert_eq!(
            state.apply(Event::TrackingResolved(TrackingResolution::denied())),
            None
        );
        assert_eq!(state.apply(Event::AppForeground), None);
        assert_eq!(state.tracking_id.as_deref(), Some("IDFA1"));
    }

    #[test]
    fn attribution_failure_falls_back_to_native_and_ignores_late_events() {
        let mut state = BootstrapState::default();
        state.apply(config(true, None));
        granted_both(&mut state);

        assert_eq!(
            state.apply(Event::AttributionFinished(None)),
            Some(Effect::ScheduleNativeFallback)
        );
        assert_eq!(state.apply(Event::AttributionFinished(None)), None);
        assert_eq!(state.apply(Event::FallbackElapsed), Some(Effect::PublishNative));

        assert_eq!(
            state.apply(Event::AttributionFinished(Some("https://late.test/".to_string()))),
            None
        );
        assert_eq!(state.apply(Event::FallbackElapsed), None);
        assert_eq!(state.decision, Decision::ShowNative);
    }

    #[test]
    fn attribution_success_is_terminal() {
        let mut state = BootstrapState::default();
        state.apply(config(true, None));
        granted_both(&mut state);

        assert_eq!(
            state.apply(Event::AttributionFinished(Some("https://x.test/r".to_string()))),
            Some(Effect::PublishRedirect("https://x.test/r".to_string()))
        );
        assert_eq!(state.phase, Phase::Terminal);
        assert_eq!(state.apply(Event::FallbackElapsed), None);
    }

    #[test]
    fn foreground_requests_permission_check_only_while_unresolved() {
        let mut state = BootstrapState::default();
        assert_eq!(state.apply(Event::AppForeground), Some(Effect::CheckPermissions));
        granted_both(&mut state);
        assert_eq!(state.apply(Event::AppForeground), None);
    }

    #[test]
    fn fallback_elapsed_before_scheduling_is_ignored() {
        let mut state = BootstrapState::default();
        assert_eq!(state.apply(Event::FallbackElapsed), None);
        assert_eq!(state.decision, Decision::Pending);
    }
}
