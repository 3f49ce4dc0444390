pub mod app;
pub mod bootstrap;
#[cfg(feature = "app-shell")]
mod commands;
pub mod domain;
pub mod infra;
mod shared;

pub(crate) use shared::blocking;

#[cfg(feature = "app-shell")]
pub(crate) use app::app_state;
#[cfg(feature = "app-shell")]
pub(crate) use domain::{hatchings, incubators};
#[cfg(feature = "app-shell")]
pub(crate) use infra::settings;

#[cfg(feature = "app-shell")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use app_state::{LaunchState, ServicesState};
    use commands::*;

    let builder = tauri::Builder::default()
        .manage(ServicesState::default())
        .manage(LaunchState::default())
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_notification::init());

    builder
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::Focused(true) = event {
                use tauri::Manager;
                if let Some(handle) = window.state::<LaunchState>().0.get() {
                    handle.app_did_become_active();
                }
            }
        })
        .setup(|app| {
            let app_handle = app.handle().clone();
            tauri::async_runtime::spawn(app::startup::start_bootstrap(app_handle));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            bootstrap_decision_get,
            bootstrap_app_foreground,
            notifications_enabled_get,
            settings_get,
            settings_set,
            incubators_list,
            incubator_get,
            incubator_create,
            incubator_update,
            incubator_delete,
            hatchings_list,
            hatching_get,
            hatching_create,
            hatching_update,
            hatching_delete,
            hatching_statistics_get
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
