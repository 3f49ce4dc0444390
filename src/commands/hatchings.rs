//! Usage: Hatching log commands.

use crate::app_state::{ensure_services, ServicesState};
use crate::{blocking, hatchings};

#[tauri::command]
pub(crate) async fn hatchings_list(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
) -> Result<Vec<hatchings::Hatching>, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("hatchings_list", move || hatchings::list(&services.prefs)).await
}

#[tauri::command]
pub(crate) async fn hatching_get(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
    hatching_id: u64,
) -> Result<Option<hatchings::Hatching>, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("hatching_get", move || {
        hatchings::get(&services.prefs, hatching_id)
    })
    .await
}

#[tauri::command]
pub(crate) async fn hatching_create(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
    input: hatchings::HatchingInput,
) -> Result<hatchings::Hatching, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("hatching_create", move || {
        hatchings::create(&services.prefs, input)
    })
    .await
}

#[tauri::command]
pub(crate) async fn hatching_update(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
    hatching_id: u64,
    input: hatchings::HatchingInput,
) -> Result<hatchings::Hatching, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("hatching_update", move || {
        hatchings::update(&services.prefs, hatching_id, input)
    })
    .await
}

#[tauri::command]
pub(crate) async fn hatching_delete(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
    hatching_id: u64,
) -> Result<bool, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("hatching_delete", move || {
        hatchings::delete(&services.prefs, hatching_id)
    })
    .await
}

#[tauri::command]
pub(crate) async fn hatching_statistics_get(
    app: tauri::AppHandle,
    services_state: tauri::State<'_, ServicesState>,
) -> Result<hatchings::HatchingStatistics, String> {
    let services = ensure_services(app, services_state.inner()).await?;
    blocking::run("hatching_statistics_get", move || {
        hatchings::statistics(&services.prefs)
    })
    .await
}
