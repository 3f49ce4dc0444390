//! Usage: JSON-array record collections stored under one preferences key, with monotonic ids.

use crate::infra::kv_store::KvStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

pub(crate) trait Record {
    fn id(&self) -> u64;
}

fn next_id_key(key: &str) -> String {
    format!("{key}_next_id")
}

fn decode_records<T: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &str,
) -> Result<Vec<T>, String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| format!("RECORD_DECODE: key={key}: {e}")),
    }
}

pub(crate) fn list<T: DeserializeOwned>(kv: &KvStore, key: &str) -> Result<Vec<T>, String> {
    Ok(kv.get_json::<Vec<T>>(key)?.unwrap_or_default())
}

/// Id allocator handed to `mutate`; never returns an id that was used before in this collection.
pub(crate) struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub(crate) fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Read-modify-write of one collection; the array and its id counter are committed together.
pub(crate) fn mutate<T, R>(
    kv: &KvStore,
    key: &str,
    f: impl FnOnce(&mut Vec<T>, &mut IdAllocator) -> Result<R, String>,
) -> Result<R, String>
where
    T: Record + Serialize + DeserializeOwned,
{
    let counter_key = next_id_key(key);
    kv.update(|map| {
        let mut records: Vec<T> = decode_records(map, key)?;
        let stored_next = map.get(&counter_key).and_then(Value::as_u64).unwrap_or(1);
        let after_max = records
            .iter()
            .map(Record::id)
            .max()
            .map_or(1, |id| id.saturating_add(1));
        let mut ids = IdAllocator {
            next: stored_next.max(after_max).max(1),
        };

        let out = f(&mut records, &mut ids)?;

        let encoded = serde_json::to_value(&records)
            .map_err(|e| format!("RECORD_ENCODE: key={key}: {e}"))?;
        map.insert(key.to_string(), encoded);
        map.insert(counter_key.clone(), Value::from(ids.next));
        Ok(out)
    })
}

pub(crate) fn not_found(kind: &str, id: u64) -> String {
    format!("RECORD_NOT_FOUND: {kind} id={id}")
}

/// Trims and drops empty optional text fields.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_dirs::unique_tmp_dir;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u64,
        name: String,
    }

    impl Record for Item {
        fn id(&self) -> u64 {
            self.id
        }
    }

    fn push(kv: &KvStore, name: &str) -> u64 {
        mutate::<Item, _>(kv, "items", |items, ids| {
            let id = ids.allocate();
            items.push(Item {
                id,
                name: name.to_string(),
            });
            Ok(id)
        })
        .expect("push")
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let dir = unique_tmp_dir("records");
        let kv = KvStore::open_in(&dir).expect("open");

        assert_eq!(push(&kv, "a"), 1);
        assert_eq!(push(&kv, "b"), 2);
        mutate::<Item, _>(&kv, "items", |items, _| {
            items.retain(|i| i.id != 2);
            Ok(())
        })
        .expect("delete");
        assert_eq!(push(&kv, "c"), 3);

        let names: Vec<String> = list::<Item>(&kv, "items")
            .expect("list")
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn counter_catches_up_with_existing_ids() {
        let dir = unique_tmp_dir("records");
        let kv = KvStore::open_in(&dir).expect("open");
        kv.set_json(
            "items",
            &vec![Item {
                id: 41,
                name: "legacy".to_string(),
            }],
        )
        .expect("seed");

        assert_eq!(push(&kv, "next"), 42);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_collection_is_reported_not_overwritten() {
        let dir = unique_tmp_dir("records");
        let kv = KvStore::open_in(&dir).expect("open");
        kv.set_string("items", "not an array").expect("seed");

        let err = mutate::<Item, _>(&kv, "items", |_, _| Ok(())).unwrap_err();
        assert!(err.starts_with("RECORD_DECODE:"), "{err}");
        assert_eq!(kv.get_string("items").as_deref(), Some("not an array"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn normalize_optional_drops_blank() {
        assert_eq!(normalize_optional(Some("  ".to_string())), None);
        assert_eq!(
            normalize_optional(Some(" Speedy ".to_string())).as_deref(),
            Some("Speedy")
        );
        assert_eq!(normalize_optional(None), None);
    }
}
