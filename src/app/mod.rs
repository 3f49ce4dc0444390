//! Usage: Application layer (logging, Tauri-managed state, startup wiring).

pub mod logging;

#[cfg(feature = "app-shell")]
pub(crate) mod app_state;
#[cfg(feature = "app-shell")]
pub(crate) mod shell_permissions;
#[cfg(feature = "app-shell")]
pub(crate) mod startup;
