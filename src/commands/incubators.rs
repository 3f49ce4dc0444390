//! Usage: Incubator record commands.

use crate::app_state::{ensure_services, ServicesState};
use crate::{blocking, incubators};

#[tauri::command]
pub(crate) async fn incubators_list(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
) -> Result<Vec<incubators::Incubator>, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("incubators_list", move || incubators::list(&services.prefs)).await
}

#[tauri::command]
pub(crate) async fn incubator_get(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
    incubator_id: u64,
) -> Result<Option<incubators::Incubator>, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("incubator_get", move || {
        incubators::get(&services.prefs, incubator_id)
    })
    .await
}

#[tauri::command]
pub(crate) async fn incubator_create(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
    input: incubators::IncubatorInput,
) -> Result<incubators::Incubator, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("incubator_create", move || {
        incubators::create(&services.prefs, input)
    })
    .await
}

#[tauri::command]
pub(crate) async fn incubator_update(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
    incubator_id: u64,
    input: incubators::IncubatorInput,
) -> Result<incubators::Incubator, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("incubator_update", move || {
        incubators::update(&services.prefs, incubator_id, input)
    })
    .await
}

#[tauri::command]
pub(crate) async fn incubator_delete(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
    incubator_id: u64,
) -> Result<bool, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("incubator_delete", move || {
        incubators::delete(&services.prefs, incubator_id)
    })
    .await
}
