//! Usage: Tauri command handlers exposed to the webview.

mod bootstrap;
mod hatchings;
mod incubators;
mod settings;

pub(crate) use bootstrap::*;
pub(crate) use hatchings::*;
pub(crate) use incubators::*;
pub(crate) use settings::*;
