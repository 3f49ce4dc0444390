//! Usage: Launch decision and lifecycle commands.

use crate::app_state::{ensure_services, LaunchState, ServicesState};
use crate::blocking;
use crate::bootstrap::permissions::NOTIFICATIONS_ENABLED_KEY;
use crate::bootstrap::Decision;

#[tauri::command]
pub(crate) fn bootstrap_decision_get(launch: tauri::State<'_, LaunchState>) -> Decision {
    launch
        .0
        .get()
        .map(|handle| handle.decision())
        .unwrap_or(Decision::Pending)
}

/// Forwarded by the webview on `visibilitychange`; re-checks permissions while undecided.
#[tauri::command]
pub(crate) fn bootstrap_app_foreground(launch: tauri::State<'_, LaunchState>) -> bool {
    match launch.0.get() {
        Some(handle) => {
            handle.app_did_become_active();
            true
        }
        None => false,
    }
}

#[tauri::command]
pub(crate) async fn notifications_enabled_get(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
) -> Result<bool, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("notifications_enabled_get", move || {
        Ok(services
            .prefs
            .get_bool(NOTIFICATIONS_ENABLED_KEY)
            .unwrap_or(false))
    })
    .await
}
