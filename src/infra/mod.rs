//! Usage: Infrastructure adapters (filesystem paths, persistence, remote config, settings).

pub mod app_paths;
pub mod config_store;
pub mod kv_store;
pub mod remote_config;
pub mod settings;
