//! Usage: Resolve per-user app data directory and related path helpers.

#[cfg(feature = "app-shell")]
use std::path::PathBuf;

const APP_PROFILE_ENV: &str = "EGG_HATCH_PLANNER_PROFILE";

fn is_safe_profile_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    if name.contains('/') || name.contains('\\') {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}

/// Optional profile sub-directory (dev/QA isolation) taken from `EGG_HATCH_PLANNER_PROFILE`.
pub fn profile_from_env() -> Option<String> {
    std::env::var(APP_PROFILE_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| is_safe_profile_name(v))
}

#[cfg(feature = "app-shell")]
pub fn app_data_dir(app: &tauri::AppHandle) -> Result<PathBuf, String> {
    use tauri::Manager;

    let base = app
        .path()
        .app_data_dir()
        .map_err(|e| format!("failed to resolve app data dir: {e}"))?;

    let dir = match profile_from_env() {
        Some(profile) => base.join("profiles").join(profile),
        None => base,
    };
    std::fs::create_dir_all(&dir).map_err(|e| format!("failed to create app dir: {e}"))?;

    Ok(dir)
}

/// Logs directory under the given data dir.
pub fn logs_dir(data_dir: &std::path::Path) -> std::path::PathBuf {
    data_dir.join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_profile_names() {
        assert!(is_safe_profile_name("dev"));
        assert!(is_safe_profile_name("qa-1.2_b"));
        assert!(!is_safe_profile_name(""));
        assert!(!is_safe_profile_name(".."));
        assert!(!is_safe_profile_name("a/b"));
        assert!(!is_safe_profile_name("a\\b"));
        assert!(!is_safe_profile_name("spaced name"));
    }

    #[test]
    fn logs_dir_is_nested_under_data_dir() {
        let dir = std::path::Path::new("/tmp/ehp");
        assert_eq!(logs_dir(dir), dir.join("logs"));
    }
}
