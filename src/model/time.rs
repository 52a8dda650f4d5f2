//! Temporal encoding of the gazetteer.
//!
//! Every time bound in the raw tables is a Julian day number scaled by 10,
//! with the low digit reserved for tie-break/flag semantics. Unresolved
//! bounds carry the `TIME_MIN`/`TIME_MAX` sentinels instead.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// Sentinel substituted for a missing `time_begin`.
pub const TIME_MIN: i64 = -2_147_483_648;

/// Sentinel substituted for a missing `time_end`.
pub const TIME_MAX: i64 = 2_147_483_647;

/// A closed validity interval in scaled-Julian encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    pub begin: i64,
    pub end: i64,
}

impl TimeSpan {
    pub fn new(begin: i64, end: i64) -> Self {
        Self { begin, end }
    }

    /// Span for a row with missing bounds replaced by the sentinels.
    pub fn from_bounds(begin: Option<i64>, end: Option<i64>) -> Self {
        Self {
            begin: begin.unwrap_or(TIME_MIN),
            end: end.unwrap_or(TIME_MAX),
        }
    }

    /// Unbounded span (both sentinels).
    pub fn unbounded() -> Self {
        Self { begin: TIME_MIN, end: TIME_MAX }
    }

    /// True if this span overlaps the closed interval `[tmin, tmax]`.
    pub fn overlaps(&self, tmin: i64, tmax: i64) -> bool {
        self.begin <= tmax && self.end >= tmin
    }
}

impl Default for TimeSpan {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// The `(first day, last day)` interval of every calendar year 1..=3000,
/// in the scaled encoding.
///
/// Day 1721426 is 0001-01-01 (noon). Each year spans 365 days plus one for
/// Gregorian leap years. Relation rows whose validity equals one of these
/// intervals carry a "valid since" annotation, not a one-year window; the
/// graph builder treats them as an open-ended lower bound.
pub fn julian_year_spans() -> HashSet<(i64, i64)> {
    let mut new_years_day: i64 = 1_721_426;
    let mut years = HashSet::with_capacity(3000);
    for y in 1i64..=3000 {
        let leap = (y % 4 == 0 && (y % 100 != 0 || y % 400 == 0)) as i64;
        let new_years_eve = new_years_day + 364 + leap;
        years.insert((new_years_day * 10, new_years_eve * 10));
        new_years_day = new_years_eve + 1;
    }
    years
}
