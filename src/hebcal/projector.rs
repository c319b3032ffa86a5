//! Projection of a Hebrew anchor onto a range of solar years.

use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::convert::{solar_date_for_key_in_year, HebrewKey};

/// One concrete appearance of a recurring event on the solar calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Occurrence {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub date: NaiveDate,
}

impl Occurrence {
    fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            date,
        }
    }
}

/// Project a Hebrew key onto every solar year in `start_year..=end_year`.
///
/// Years where the keyed day/month has no valid mapping are absent from the
/// result rather than being clamped or substituted. The result is sorted by
/// year with at most one entry per year.
pub fn project(key: &HebrewKey, start_year: i32, end_year: i32) -> Vec<Occurrence> {
    project_missing(key, start_year, end_year, &std::collections::HashSet::new())
}

/// Like [`project`], but skips years already present in `existing` before
/// any conversion work is done. This is what makes horizon backfill cheap
/// to re-run: covered years cost a set lookup, not a calendar search.
pub fn project_missing(
    key: &HebrewKey,
    start_year: i32,
    end_year: i32,
    existing: &std::collections::HashSet<i32>,
) -> Vec<Occurrence> {
    let mut occurrences = Vec::new();
    let mut year = start_year;
    while year <= end_year {
        if !existing.contains(&year) {
            if let Some(date) = solar_date_for_key_in_year(key, year) {
                occurrences.push(Occurrence::from_date(date));
            }
        }
        year += 1;
    }
    occurrences
}

/// First solar year a recurring event may occur in.
///
/// Never before the current year or the anchor's own year; for death events
/// with a known burial date, never before the year after burial.
pub fn projection_start(current_year: i32, anchor: NaiveDate, burial: Option<NaiveDate>) -> i32 {
    let floor = match burial {
        Some(b) => b.year() + 1,
        None => anchor.year(),
    };
    current_year.max(anchor.year()).max(floor)
}
