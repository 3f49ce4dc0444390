//! Usage: Durable key-value preferences file (`preferences.json`) shared by the config and record stores.
//!
//! The whole map is kept in memory and written through on every change, so reads never touch disk.
//! Writes are serialized by the inner mutex and skipped when the value is unchanged.

use crate::shared::fs::{read_optional_file, write_file_atomic_if_changed};
use crate::shared::mutex_ext::MutexExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

#[derive(Debug)]
pub struct KvStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl KvStore {
    pub fn open_in(data_dir: &Path) -> Result<Self, String> {
        Self::open(data_dir.join(PREFERENCES_FILE_NAME))
    }

    pub fn open(path: PathBuf) -> Result<Self, String> {
        let entries = match read_optional_file(&path).map_err(|e| format!("KV_IO: {e}"))? {
            None => Map::new(),
            Some(bytes) if bytes.iter().all(|b| b.is_ascii_whitespace()) => Map::new(),
            Some(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(format!(
                        "KV_CORRUPT: {} is not a JSON object",
                        path.display()
                    ))
                }
                Err(e) => return Err(format!("KV_CORRUPT: {}: {e}", path.display())),
            },
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.entries.lock_or_recover().get(key).and_then(Value::as_bool)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.entries
            .lock_or_recover()
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, String> {
        let value = match self.entries.lock_or_recover().get(key) {
            Some(v) => v.clone(),
            None => return Ok(None),
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| format!("KV_DECODE: key={key}: {e}"))
    }

    pub fn set_bool(&self, key: &str, value: bool) -> Result<(), String> {
        self.set_value(key, Value::Bool(value))
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<(), String> {
        self.set_value(key, Value::String(value.to_string()))
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), String> {
        let value =
            serde_json::to_value(value).map_err(|e| format!("KV_ENCODE: key={key}: {e}"))?;
        self.set_value(key, value)
    }

    pub fn set_value(&self, key: &str, value: Value) -> Result<(), String> {
        let mut entries = self.entries.lock_or_recover();
        if entries.get(key) == Some(&value) {
            return Ok(());
        }
        let previous = entries.insert(key.to_string(), value);
        if let Err(err) = self.persist(&entries) {
            match previous {
                Some(v) => entries.insert(key.to_string(), v),
                None => entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    /// Runs `f` against the whole map under the store lock and persists once on success.
    /// On any error (from `f` or from the write) the in-memory map is left untouched.
    pub fn update<R>(
        &self,
        f: impl FnOnce(&mut Map<String, Value>) -> Result<R, String>,
    ) -> Result<R, String> {
        let mut entries = self.entries.lock_or_recover();
        let mut draft = entries.clone();
        let out = f(&mut draft)?;
        if draft != *entries {
            self.persist(&draft)?;
            *entries = draft;
        }
        Ok(out)
    }

    fn persist(&self, entries: &Map<String, Value>) -> Result<(), String> {
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| format!("KV_ENCODE: failed to serialize preferences: {e}"))?;
        write_file_atomic_if_changed(&self.path, &bytes).map_err(|e| format!("KV_IO: {e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_dirs::unique_tmp_dir;

    #[test]
    fn values_survive_reopen() {
        let dir = unique_tmp_dir("kv");
        {
            let kv = KvStore::open_in(&dir).expect("open");
            kv.set_bool("feature_enabled", false).expect("set bool");
            kv.set_string("redirect_url", "https://x.test/a").expect("set string");
            kv.set_json("numbers", &vec![1, 2, 3]).expect("set json");
        }

        let kv = KvStore::open_in(&dir).expect("reopen");
        assert_eq!(kv.get_bool("feature_enabled"), Some(false));
        assert_eq!(
            kv.get_string("redirect_url").as_deref(),
            Some("https://x.test/a")
        );
        assert_eq!(
            kv.get_json::<Vec<u32>>("numbers").expect("decode"),
            Some(vec![1, 2, 3])
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn typed_getters_ignore_mismatched_types() {
        let dir = unique_tmp_dir("kv");
        let kv = KvStore::open_in(&dir).expect("open");
        kv.set_string("flag", "true").expect("set");
        assert_eq!(kv.get_bool("flag"), None);
        assert_eq!(
            kv.get_json::<Value>("flag").expect("decode"),
            Some(Value::from("true"))
        );
        assert_eq!(kv.get_string("missing"), None);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn update_commits_all_keys_or_none() {
        let dir = unique_tmp_dir("kv");
        let kv = KvStore::open_in(&dir).expect("open");

        kv.update(|map| {
            map.insert("a".to_string(), Value::from(1));
            map.insert("b".to_string(), Value::from(2));
            Ok(())
        })
        .expect("update");

        let err = kv
            .update::<()>(|map| {
                map.insert("a".to_string(), Value::from(10));
                Err("SEC_INVALID_INPUT: rejected".to_string())
            })
            .unwrap_err();
        assert!(err.starts_with("SEC_INVALID_INPUT:"), "{err}");
        assert_eq!(kv.get_json::<i64>("a").expect("decode"), Some(1));

        let reopened = KvStore::open_in(&dir).expect("reopen");
        assert_eq!(reopened.get_json::<i64>("b").expect("decode"), Some(2));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn open_rejects_non_object_file() {
        let dir = unique_tmp_dir("kv");
        std::fs::write(dir.join(PREFERENCES_FILE_NAME), "[1,2]").expect("write");
        let err = KvStore::open_in(&dir).unwrap_err();
        assert!(err.starts_with("KV_CORRUPT:"), "{err}");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn open_treats_blank_file_as_empty() {
        let dir = unique_tmp_dir("kv");
        std::fs::write(dir.join(PREFERENCES_FILE_NAME), "  \n").expect("write");
        let kv = KvStore::open_in(&dir).expect("open");
        assert_eq!(kv.get_json::<Value>("anything").expect("decode"), None);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
