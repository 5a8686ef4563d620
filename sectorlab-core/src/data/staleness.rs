//! Month-based staleness policy for snapshots.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default maximum snapshot age, in whole months.
pub const DEFAULT_MAX_AGE_MONTHS: u32 = 3;

/// Decides whether a snapshot's creation date is too old.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalenessPolicy {
    pub max_age_months: u32,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self {
            max_age_months: DEFAULT_MAX_AGE_MONTHS,
        }
    }
}

impl StalenessPolicy {
    pub fn new(max_age_months: u32) -> Self {
        Self { max_age_months }
    }

    /// True when more than `max_age_months` whole months separate `created` from `now`.
    pub fn is_stale(&self, now: NaiveDate, created: NaiveDate) -> bool {
        elapsed_full_months(created, now) > self.max_age_months
    }
}

/// Whole calendar months from `from` to `to`.
///
/// The largest `n` with `from + n months <= to`, where month addition clamps to
/// the last day of a short month (Oct 31 + 4 months = Feb 28). Zero when `to`
/// is not after `from`.
pub fn elapsed_full_months(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }

    let span = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    let mut months = span.max(0) as u32;
    while months > 0 {
        match from.checked_add_months(Months::new(months)) {
            Some(d) if d <= to => break,
            _ => months -= 1,
        }
    }
    months
}
