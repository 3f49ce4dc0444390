//! Usage: Incubation and hatching records kept in the shared preferences store.

pub mod hatchings;
pub mod incubators;
mod records;
