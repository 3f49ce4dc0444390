//! Usage: Settings read/write commands.

use crate::app_state::{ensure_services, ServicesState};
use crate::{blocking, settings};

#[tauri::command]
pub(crate) async fn settings_get(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
) -> Result<settings::AppSettings, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("settings_get", move || settings::read(&services.data_dir)).await
}

/// Takes effect on the next launch; the running bootstrap keeps its config.
#[tauri::command]
pub(crate) async fn settings_set(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
    update: settings::AppSettings,
) -> Result<settings::AppSettings, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("settings_set", move || {
        settings::write(&services.data_dir, &update)
    })
    .await
}
