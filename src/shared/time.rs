//! Usage: Wall-clock helpers (unix seconds) used by persisted records.

use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

pub(crate) fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Whole days from `from` to `to`, truncated toward zero (negative when `to` is in the past).
pub(crate) fn whole_days_between(from: i64, to: i64) -> i64 {
    to.saturating_sub(from) / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_days_between_truncates_partial_days() {
        assert_eq!(whole_days_between(0, SECONDS_PER_DAY * 3 - 1), 2);
        assert_eq!(whole_days_between(0, SECONDS_PER_DAY * 3), 3);
        assert_eq!(whole_days_between(SECONDS_PER_DAY * 2 + 10, 0), -2);
    }

    #[test]
    fn now_unix_seconds_is_after_2020() {
        assert!(now_unix_seconds() > 1_577_836_800);
    }
}
