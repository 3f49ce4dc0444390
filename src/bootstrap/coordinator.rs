//! Usage: Event loop that drives `BootstrapState` and runs its effects.
//!
//! All state mutation happens on the loop task. Async work (config fetch, permission prompts,
//! attribution, fallback timer) runs in spawned tasks that report back over the event channel;
//! once the loop is gone those sends fail and the late completion is dropped.

use super::attribution::AttributionSource;
use super::permissions::PermissionCoordinator;
use super::state::{BootstrapState, Effect, Event};
use super::types::{CorrelationIdSource, Decision};
use super::{redirect_url, BootstrapConfig};
use crate::blocking;
use crate::infra::config_store::ConfigStore;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct BootstrapServices {
    pub config_store: Arc<ConfigStore>,
    pub permissions: Arc<PermissionCoordinator>,
    pub attribution: Arc<dyn AttributionSource>,
    pub correlation: Arc<dyn CorrelationIdSource>,
}

pub struct BootstrapCoordinator {
    services: BootstrapServices,
    config: BootstrapConfig,
}

impl BootstrapCoordinator {
    pub fn new(services: BootstrapServices, config: BootstrapConfig) -> Self {
        Self { services, config }
    }

    /// Kicks off the launch sequence; consuming `self` keeps the initial kickoff single-shot.
    pub fn start(self) -> BootstrapHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (decision_tx, decision_rx) = watch::channel(Decision::Pending);
        let task = tokio::spawn(self.run(events_tx.clone(), events_rx, decision_tx));
        BootstrapHandle {
            events_tx,
            decision_rx,
            task,
        }
    }

    async fn run(
        self,
        events_tx: mpsc::UnboundedSender<Event>,
        mut events_rx: mpsc::UnboundedReceiver<Event>,
        decision_tx: watch::Sender<Decision>,
    ) {
        tracing::info!(bundle_id = %self.config.bundle_id, "bootstrap started");
        self.spawn_config_fetch(events_tx.clone());
        self.spawn_permission_chain(events_tx.clone());

        let mut state = BootstrapState::default();
        while let Some(event) = events_rx.recv().await {
            tracing::debug!(event = ?event, phase = ?state.phase, "bootstrap event");
            let Some(effect) = state.apply(event) else {
                continue;
            };

            match effect {
                Effect::CheckPermissions => {
                    let now = tokio::time::Instant::now();
                    if self.services.permissions.foreground_check_due(now) {
                        self.spawn_permission_chain(events_tx.clone());
                    }
                }
                Effect::FetchAttribution { tracking_id } => {
                    self.spawn_attribution(tracking_id, events_tx.clone());
                }
                Effect::ScheduleNativeFallback => {
                    self.spawn_fallback_timer(events_tx.clone());
                }
                Effect::PublishRedirect(url) => {
                    self.persist_redirect_url(&url).await;
                    tracing::info!(url = %url, "bootstrap decided: redirect");
                    decision_tx.send_replace(Decision::ShowRedirect(url));
                    break;
                }
                Effect::PublishNative => {
                    tracing::info!("bootstrap decided: native");
                    decision_tx.send_replace(Decision::ShowNative);
                    break;
                }
            }
        }
    }

    fn spawn_config_fetch(&self, tx: mpsc::UnboundedSender<Event>) {
        let store = self.services.config_store.clone();
        tokio::spawn(async move {
            let enabled = store.fetch_feature_flag().await;
            let cached_url = store.cached_redirect_url();
            let _ = tx.send(Event::ConfigFetched {
                enabled,
                cached_url,
            });
        });
    }

    fn spawn_permission_chain(&self, tx: mpsc::UnboundedSender<Event>) {
        let permissions = self.services.permissions.clone();
        tokio::spawn(async move {
            let notification = permissions.resolve_notification_permission().await;
            if tx.send(Event::NotificationResolved(notification)).is_err() {
                return;
            }
            let tracking = permissions.resolve_tracking_permission().await;
            let _ = tx.send(Event::TrackingResolved(tracking));
        });
    }

    fn spawn_attribution(&self, tracking_id: Option<String>, tx: mpsc::UnboundedSender<Event>) {
        let services = self.services.clone();
        let config = self.config.clone();
        tokio::spawn(async move {
            let built = match services
                .attribution
                .fetch_attribution(&config.bundle_id, &config.metrics_salt, tracking_id.as_deref())
                .await
            {
                Ok(result) => {
                    let correlation_id = services.correlation.correlation_id();
                    let url = redirect_url::build(
                        &result,
                        tracking_id.as_deref(),
                        &config.bundle_id,
                        correlation_id.as_deref(),
                    );
                    if url.is_none() {
                        tracing::warn!(
                            destination = %result.destination_url,
                            "redirect URL could not be built; falling back to native"
                        );
                    }
                    url.map(String::from)
                }
                Err(err) => {
                    tracing::warn!(
                        code = err.code(),
                        "attribution fetch failed; falling back to native: {}",
                        err
                    );
                    None
                }
            };
            let _ = tx.send(Event::AttributionFinished(built));
        });
    }

    fn spawn_fallback_timer(&self, tx: mpsc::UnboundedSender<Event>) {
        let delay = self.config.native_fallback_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Event::FallbackElapsed);
        });
    }

    async fn persist_redirect_url(&self, url: &str) {
        let store = self.services.config_store.clone();
        let url = url.to_string();
        if let Err(err) = blocking::run("bootstrap_save_redirect_url", move || {
            store.save_redirect_url(&url)
        })
        .await
        {
            tracing::warn!("failed to persist redirect url: {}", err);
        }
    }
}

/// Host-side view of a running launch sequence. Dropping it stops the event loop.
pub struct BootstrapHandle {
    events_tx: mpsc::UnboundedSender<Event>,
    decision_rx: watch::Receiver<Decision>,
    task: JoinHandle<()>,
}

impl BootstrapHandle {
    pub fn decision(&self) -> Decision {
        self.decision_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Decision> {
        self.decision_rx.clone()
    }

    /// Resolves with the terminal decision, or the last known value if the loop stopped early.
    pub async fn wait_for_decision(&self) -> Decision {
        let mut rx = self.decision_rx.clone();
        let result = rx.wait_for(Decision::is_terminal).await.map(|d| d.clone());
        match result {
            Ok(decision) => decision,
            Err(_) => rx.borrow().clone(),
        }
    }

    /// Forwards an app-foreground transition; ignored once the decision is terminal.
    pub fn app_did_become_active(&self) {
        let _ = self.events_tx.send(Event::AppForeground);
    }
}

impl Drop for BootstrapHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
