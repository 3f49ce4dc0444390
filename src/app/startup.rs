//! Usage: Startup wiring: build the bootstrap services from settings, start the launch sequence,
//! and forward its decision to the webview.

use super::app_state::{ensure_services, AppServices, LaunchState, ServicesState};
use super::shell_permissions::ShellPermissions;
use crate::blocking;
use crate::bootstrap::{
    BootstrapCoordinator, BootstrapServices, Decision, MetricsClient, PermissionCoordinator,
    StaticCorrelationId,
};
use crate::infra::config_store::ConfigStore;
use crate::infra::remote_config::HttpRemoteConfig;
use crate::infra::settings::{self, AppSettings};
use std::sync::Arc;
use tauri::{Emitter, Manager};

pub(crate) const DECISION_EVENT: &str = "bootstrap:decision";
const MAIN_WINDOW_LABEL: &str = "main";

fn build_services(
    app: &tauri::AppHandle,
    services: &AppServices,
    settings: &AppSettings,
) -> Result<BootstrapServices, String> {
    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| format!("HTTP_CLIENT_INIT: {e}"))?;

    let remote = HttpRemoteConfig::new(
        client.clone(),
        &settings.remote_config_url,
        &settings.remote_config_flag_key,
        settings.remote_config_timeout(),
    )?;
    let metrics = MetricsClient::new(
        client,
        &settings.metrics_endpoint,
        settings.metrics_request_timeout(),
    )?;
    let permissions = PermissionCoordinator::new(
        Arc::new(ShellPermissions::new(app.clone())),
        settings.permission_check_debounce(),
    )
    .with_preferences(services.prefs.clone());

    Ok(BootstrapServices {
        config_store: Arc::new(ConfigStore::new(services.prefs.clone(), Arc::new(remote))),
        permissions: Arc::new(permissions),
        attribution: Arc::new(metrics),
        correlation: Arc::new(StaticCorrelationId(None)),
    })
}

fn apply_decision(app: &tauri::AppHandle, decision: &Decision) {
    let _ = app.emit(DECISION_EVENT, decision.clone());

    let Decision::ShowRedirect(url) = decision else {
        return;
    };
    let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) else {
        tracing::warn!("main window missing; redirect not shown");
        return;
    };
    match url.parse::<tauri::Url>() {
        Ok(parsed) => {
            if let Err(err) = window.navigate(parsed) {
                tracing::error!(url = %url, "failed to navigate to redirect: {}", err);
            }
        }
        Err(err) => tracing::error!(url = %url, "redirect url rejected by webview: {}", err),
    }
}

pub(crate) async fn start_bootstrap(app: tauri::AppHandle) {
    let services = match ensure_services(app.clone(), app.state::<ServicesState>().inner()).await {
        Ok(services) => services,
        Err(err) => {
            tracing::error!("services init failed, showing native UI: {}", err);
            let _ = app.emit(DECISION_EVENT, Decision::ShowNative);
            return;
        }
    };

    if let Err(err) = super::logging::init(&services.data_dir) {
        eprintln!("logging init failed: {err}");
    }

    let settings = match blocking::run("startup_read_settings", {
        let data_dir = services.data_dir.clone();
        move || settings::read(&data_dir)
    })
    .await
    {
        Ok(cfg) => cfg,
        Err(err) => {
            tracing::warn!("settings read failed, using defaults: {}", err);
            AppSettings::default()
        }
    };

    let bootstrap_services = match build_services(&app, &services, &settings) {
        Ok(v) => v,
        Err(err) => {
            tracing::error!("bootstrap services invalid, showing native UI: {}", err);
            let _ = app.emit(DECISION_EVENT, Decision::ShowNative);
            return;
        }
    };

    let handle = BootstrapCoordinator::new(bootstrap_services, settings.bootstrap_config()).start();
    let mut rx = handle.subscribe();
    if app.state::<LaunchState>().0.set(handle).is_err() {
        tracing::warn!("bootstrap already started");
        return;
    }

    while rx.changed().await.is_ok() {
        let decision = rx.borrow_and_update().clone();
        if decision.is_terminal() {
            apply_decision(&app, &decision);
            break;
        }
    }
}
