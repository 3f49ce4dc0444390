//! Usage: Incubation batches (species, start date, egg count, care reminders) persisted in preferences.

use super::records::{self, normalize_optional, Record};
use crate::infra::kv_store::KvStore;
use crate::shared::time::{now_unix_seconds, whole_days_between, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};

pub const INCUBATORS_KEY: &str = "saved_incubators";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BirdSpecies {
    #[serde(rename = "CHICKEN")]
    Chicken,
    #[serde(rename = "DUCK")]
    Duck,
    #[serde(rename = "GOOSE")]
    Goose,
    #[serde(rename = "TURKEY")]
    Turkey,
    #[serde(rename = "GUINEA FOWL")]
    GuineaFowl,
}

impl BirdSpecies {
    pub fn incubation_days(self) -> i64 {
        match self {
            BirdSpecies::Chicken => 21,
            BirdSpecies::Duck => 28,
            BirdSpecies::Goose => 30,
            BirdSpecies::Turkey => 28,
            BirdSpecies::GuineaFowl => 27,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderType {
    #[serde(rename = "TURN EGGS")]
    TurnEggs,
    #[serde(rename = "CHECK TEMPERATURE")]
    CheckTemperature,
    #[serde(rename = "CHECK HUMIDITY")]
    CheckHumidity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incubator {
    pub id: u64,
    pub species: BirdSpecies,
    /// Unix seconds.
    pub start_date: i64,
    /// Unix seconds; always `start_date + species.incubation_days()` days.
    pub hatching_date: i64,
    pub number_of_eggs: u32,
    pub reminders: Vec<ReminderType>,
    pub note: String,
    pub created_at: i64,
}

impl Record for Incubator {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Incubator {
    /// Whole days until hatching; negative once the date has passed.
    pub fn remaining_days(&self, now: i64) -> i64 {
        whole_days_between(now, self.hatching_date)
    }

    pub fn is_hatched(&self, now: i64) -> bool {
        now >= self.hatching_date
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncubatorInput {
    pub species: BirdSpecies,
    pub start_date: i64,
    pub number_of_eggs: u32,
    #[serde(default)]
    pub reminders: Vec<ReminderType>,
    pub note: String,
}

pub fn hatching_date_for(species: BirdSpecies, start_date: i64) -> i64 {
    start_date.saturating_add(species.incubation_days() * SECONDS_PER_DAY)
}

struct Validated {
    species: BirdSpecies,
    start_date: i64,
    hatching_date: i64,
    number_of_eggs: u32,
    reminders: Vec<ReminderType>,
    note: String,
}

fn validate(input: IncubatorInput) -> Result<Validated, String> {
    if input.number_of_eggs < 1 {
        return Err("SEC_INVALID_INPUT: number_of_eggs must be >= 1".to_string());
    }
    let Some(note) = normalize_optional(Some(input.note)) else {
        return Err("SEC_INVALID_INPUT: note is required".to_string());
    };

    let mut reminders = Vec::with_capacity(input.reminders.len());
    for reminder in input.reminders {
        if !reminders.contains(&reminder) {
            reminders.push(reminder);
        }
    }

    Ok(Validated {
        species: input.species,
        start_date: input.start_date,
        hatching_date: hatching_date_for(input.species, input.start_date),
        number_of_eggs: input.number_of_eggs,
        reminders,
        note,
    })
}

pub fn list(kv: &KvStore) -> Result<Vec<Incubator>, String> {
    records::list(kv, INCUBATORS_KEY)
}

pub fn get(kv: &KvStore, id: u64) -> Result<Option<Incubator>, String> {
    Ok(list(kv)?.into_iter().find(|i| i.id == id))
}

pub fn create(kv: &KvStore, input: IncubatorInput) -> Result<Incubator, String> {
    let v = validate(input)?;
    let created = records::mutate(kv, INCUBATORS_KEY, |items: &mut Vec<Incubator>, ids| {
        let item = Incubator {
            id: ids.allocate(),
            species: v.species,
            start_date: v.start_date,
            hatching_date: v.hatching_date,
            number_of_eggs: v.number_of_eggs,
            reminders: v.reminders,
            note: v.note,
            created_at: now_unix_seconds(),
        };
        items.push(item.clone());
        Ok(item)
    })?;
    tracing::info!(id = created.id, species = ?created.species, "incubator created");
    Ok(created)
}

pub fn update(kv: &KvStore, id: u64, input: IncubatorInput) -> Result<Incubator, String> {
    let v = validate(input)?;
    records::mutate(kv, INCUBATORS_KEY, |items: &mut Vec<Incubator>, _| {
        let Some(item) = items.iter_mut().find(|i| i.id == id) else {
            return Err(records::not_found("incubator", id));
        };
        item.species = v.species;
        item.start_date = v.start_date;
        item.hatching_date = v.hatching_date;
        item.number_of_eggs = v.number_of_eggs;
        item.reminders = v.reminders;
        item.note = v.note;
        Ok(item.clone())
    })
}

/// Returns false when no incubator had this id.
pub fn delete(kv: &KvStore, id: u64) -> Result<bool, String> {
    let removed = records::mutate(kv, INCUBATORS_KEY, |items: &mut Vec<Incubator>, _| {
        let before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() != before)
    })?;
    if removed {
        tracing::info!(id, "incubator deleted");
    }
    Ok(removed)
}
