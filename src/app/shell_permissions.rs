//! Usage: `PermissionPlatform` backed by the Tauri notification plugin.

use crate::bootstrap::{OsAuthorization, PermissionPlatform};
use async_trait::async_trait;
use tauri::plugin::PermissionState as PluginPermission;
use tauri_plugin_notification::NotificationExt;

pub(crate) struct ShellPermissions {
    app: tauri::AppHandle,
}

impl ShellPermissions {
    pub(crate) fn new(app: tauri::AppHandle) -> Self {
        Self { app }
    }
}

fn to_os_authorization(state: PluginPermission) -> OsAuthorization {
    match state {
        PluginPermission::Granted => OsAuthorization::Authorized,
        PluginPermission::Denied => OsAuthorization::Denied,
        _ => OsAuthorization::NotDetermined,
    }
}

#[async_trait]
impl PermissionPlatform for ShellPermissions {
    async fn notification_authorization(&self) -> Result<OsAuthorization, String> {
        self.app
            .notification()
            .permission_state()
            .map(to_os_authorization)
            .map_err(|e| format!("NOTIFICATION_PERMISSION_ERROR: {e}"))
    }

    async fn request_notification_authorization(&self) -> Result<bool, String> {
        self.app
            .notification()
            .request_permission()
            .map(|state| matches!(state, PluginPermission::Granted))
            .map_err(|e| format!("NOTIFICATION_PERMISSION_ERROR: {e}"))
    }

    // No ad-tracking prompt exists on this shell.
    async fn tracking_authorization(&self) -> Result<OsAuthorization, String> {
        Ok(OsAuthorization::Denied)
    }

    async fn request_tracking_authorization(&self) -> Result<bool, String> {
        Ok(false)
    }

    async fn tracking_identifier(&self) -> Option<String> {
        None
    }
}
