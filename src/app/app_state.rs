//! Usage: Shared Tauri state types and the services initialization gate used by `commands/*`.

use crate::blocking;
use crate::bootstrap::BootstrapHandle;
use crate::infra::app_paths;
use crate::infra::kv_store::KvStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub(crate) struct AppServices {
    pub(crate) data_dir: PathBuf,
    pub(crate) prefs: Arc<KvStore>,
}

#[derive(Default)]
pub(crate) struct ServicesState(pub(crate) OnceCell<Result<Arc<AppServices>, String>>);

/// Running launch sequence; empty until startup has built the coordinator.
#[derive(Default)]
pub(crate) struct LaunchState(pub(crate) OnceCell<BootstrapHandle>);

pub(crate) async fn ensure_services(
    app: tauri::AppHandle,
    state: &ServicesState,
) -> Result<Arc<AppServices>, String> {
    state
        .0
        .get_or_init(|| async move {
            blocking::run("services_init", move || {
                let data_dir = app_paths::app_data_dir(&app)?;
                let prefs = KvStore::open_in(&data_dir)?;
                Ok(Arc::new(AppServices {
                    data_dir,
                    prefs: Arc::new(prefs),
                }))
            })
            .await
        })
        .await
        .clone()
}
