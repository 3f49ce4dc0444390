//! Usage: Hatch log entries and their summary statistics.

use super::records::{self, normalize_optional, Record};
use crate::infra::kv_store::KvStore;
use crate::shared::time::now_unix_seconds;
use serde::{Deserialize, Serialize};

pub const HATCHINGS_KEY: &str = "hatchings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hatching {
    pub id: u64,
    pub chick_name: Option<String>,
    pub tag: Option<String>,
    /// Unix seconds.
    pub hatch_date: i64,
    pub note: Option<String>,
    pub created_at: i64,
}

impl Record for Hatching {
    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HatchingInput {
    #[serde(default)]
    pub chick_name: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    /// Defaults to now when absent.
    #[serde(default)]
    pub hatch_date: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HatchingStatistics {
    pub total_hatchings: u64,
    /// Every entry counts as one egg until entries carry their own egg count.
    pub total_eggs: u64,
    /// Percent; every logged hatching counts as a success.
    pub success_rate: f64,
}

impl HatchingStatistics {
    pub fn from_hatchings(items: &[Hatching]) -> Self {
        let total = items.len() as u64;
        Self {
            total_hatchings: total,
            total_eggs: total,
            success_rate: if items.is_empty() { 0.0 } else { 100.0 },
        }
    }
}

pub fn list(kv: &KvStore) -> Result<Vec<Hatching>, String> {
    records::list(kv, HATCHINGS_KEY)
}

pub fn get(kv: &KvStore, id: u64) -> Result<Option<Hatching>, String> {
    Ok(list(kv)?.into_iter().find(|h| h.id == id))
}

pub fn create(kv: &KvStore, input: HatchingInput) -> Result<Hatching, String> {
    let now = now_unix_seconds();
    let created = records::mutate(kv, HATCHINGS_KEY, |items: &mut Vec<Hatching>, ids| {
        let item = Hatching {
            id: ids.allocate(),
            chick_name: normalize_optional(input.chick_name),
            tag: normalize_optional(input.tag),
            hatch_date: input.hatch_date.unwrap_or(now),
            note: normalize_optional(input.note),
            created_at: now,
        };
        items.push(item.clone());
        Ok(item)
    })?;
    tracing::info!(id = created.id, "hatching recorded");
    Ok(created)
}

/// Replaces the editable fields; an absent `hatch_date` keeps the stored one.
pub fn update(kv: &KvStore, id: u64, input: HatchingInput) -> Result<Hatching, String> {
    records::mutate(kv, HATCHINGS_KEY, |items: &mut Vec<Hatching>, _| {
        let Some(item) = items.iter_mut().find(|h| h.id == id) else {
            return Err(records::not_found("hatching", id));
        };
        item.chick_name = normalize_optional(input.chick_name);
        item.tag = normalize_optional(input.tag);
        if let Some(hatch_date) = input.hatch_date {
            item.hatch_date = hatch_date;
        }
        item.note = normalize_optional(input.note);
        Ok(item.clone())
    })
}

pub fn delete(kv: &KvStore, id: u64) -> Result<bool, String> {
    records::mutate(kv, HATCHINGS_KEY, |items: &mut Vec<Hatching>, _| {
        let before = items.len();
        items.retain(|h| h.id != id);
        Ok(items.len() != before)
    })
}

pub fn statistics(kv: &KvStore) -> Result<HatchingStatistics, String> {
    Ok(HatchingStatistics::from_hatchings(&list(kv)?))
}
