//! Year-independent Hebrew anchor keys and the key-to-solar search.
//!
//! An anniversary anchored to the Hebrew calendar is stored as a
//! [`HebrewKey`]: the day and month of its anchor date, with the year
//! stripped. Projecting the anniversary onto a solar year then searches the
//! Hebrew years overlapping that solar year for a date carrying the key.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::dates::{
    self, hebrew_from_solar, month_length, solar_from_hebrew, HebrewDate, HebrewMonth,
};

/// Year-independent Hebrew day/month key, e.g. "Av 15".
///
/// Two solar dates falling on the same Hebrew day and month yield equal
/// keys regardless of the Hebrew year involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HebrewKey {
    pub month: HebrewMonth,
    pub day: u8,
}

impl fmt::Display for HebrewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.day)
    }
}

impl HebrewKey {
    /// Resolve this key's month within a concrete Hebrew year.
    ///
    /// The single Adar of a common year and Adar II of a leap year count as
    /// the same month for anniversary purposes; Adar I exists only in leap
    /// years and resolves to nothing elsewhere.
    fn month_in_year(&self, h_year: i32) -> Option<HebrewMonth> {
        let leap = dates::is_leap_year(h_year);
        match (self.month, leap) {
            (HebrewMonth::Adar, true) | (HebrewMonth::AdarII, true) => Some(HebrewMonth::AdarII),
            (HebrewMonth::Adar, false) | (HebrewMonth::AdarII, false) => Some(HebrewMonth::Adar),
            (HebrewMonth::AdarI, true) => Some(HebrewMonth::AdarI),
            (HebrewMonth::AdarI, false) => None,
            (month, _) => Some(month),
        }
    }
}

/// The year-independent Hebrew key of a solar date.
pub fn hebrew_key_for(date: NaiveDate) -> HebrewKey {
    let h = hebrew_from_solar(date);
    HebrewKey {
        month: h.month,
        day: h.day,
    }
}

/// Human-readable Hebrew rendering of a solar date, e.g. "15 Av 5785".
///
/// Display only; matching always goes through [`hebrew_key_for`].
pub fn hebrew_display(date: NaiveDate) -> String {
    hebrew_from_solar(date).to_string()
}

// A solar year overlaps exactly two Hebrew years: the one ending around
// September/October and the one beginning there.
const YEAR_OFFSET: i32 = 3760;

/// Solar date within `solar_year` on which the keyed Hebrew day/month falls.
///
/// Returns `None` when no Hebrew year overlapping `solar_year` contains
/// that day/month: day 30 of Cheshvan or Kislev in years where the month
/// runs 29 days, or Adar I outside leap years. When the day/month occurs
/// twice within one solar year (possible near the solar year boundary) the
/// earlier occurrence wins.
pub fn solar_date_for_key_in_year(key: &HebrewKey, solar_year: i32) -> Option<NaiveDate> {
    for h_year in [solar_year + YEAR_OFFSET, solar_year + YEAR_OFFSET + 1] {
        let Some(month) = key.month_in_year(h_year) else {
            continue;
        };
        if key.day == 0 || key.day > month_length(h_year, month) {
            continue;
        }
        let candidate = HebrewDate {
            year: h_year,
            month,
            day: key.day,
        };
        if let Some(date) = solar_from_hebrew(&candidate) {
            if date.year() == solar_year {
                return Some(date);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solar(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_key_is_year_independent() {
        // Tu B'Av 5784 and 5785 fall on different solar dates but share a key.
        let k1 = hebrew_key_for(solar(2024, 8, 19));
        let k2 = hebrew_key_for(solar(2025, 8, 9));
        assert_eq!(k1, k2);
        assert_eq!(k1.month, HebrewMonth::Av);
        assert_eq!(k1.day, 15);
    }

    #[test]
    fn test_round_trip_anchor_year() {
        for date in [
            solar(2024, 4, 23),
            solar(2025, 3, 14),
            solar(2025, 8, 9),
            solar(2025, 12, 15),
            solar(2024, 10, 3),
            solar(2025, 6, 1),
        ] {
            let key = hebrew_key_for(date);
            assert_eq!(
                solar_date_for_key_in_year(&key, date.year()),
                Some(date),
                "round trip failed for {date}"
            );
        }
    }

    #[test]
    fn test_missing_day_in_short_month() {
        // 30 Cheshvan exists in 5785 (complete year) but not in 5786.
        let key = hebrew_key_for(solar(2024, 12, 1));
        assert_eq!(key.month, HebrewMonth::Cheshvan);
        assert_eq!(key.day, 30);

        assert_eq!(solar_date_for_key_in_year(&key, 2024), Some(solar(2024, 12, 1)));
        assert_eq!(solar_date_for_key_in_year(&key, 2025), None);
    }

    #[test]
    fn test_adar_maps_to_adar_ii_in_leap_years() {
        // Purim-day anchor from a common year.
        let key = hebrew_key_for(solar(2025, 3, 14));
        assert_eq!(key.month, HebrewMonth::Adar);

        // 5784 is leap: 14 Adar II 5784 was March 24, 2024.
        assert_eq!(solar_date_for_key_in_year(&key, 2024), Some(solar(2024, 3, 24)));
    }

    #[test]
    fn test_adar_i_skipped_in_common_years() {
        // 5784 is a leap year; pick a date inside Adar I.
        let anchor = solar(2024, 2, 20);
        let key = hebrew_key_for(anchor);
        assert_eq!(key.month, HebrewMonth::AdarI);

        assert_eq!(solar_date_for_key_in_year(&key, 2024), Some(anchor));
        // 5785/5786 are common years with no Adar I at all.
        assert_eq!(solar_date_for_key_in_year(&key, 2025), None);
    }

    #[test]
    fn test_display_rendering() {
        assert_eq!(hebrew_display(solar(2025, 8, 9)), "15 Av 5785");
        let key = hebrew_key_for(solar(2025, 8, 9));
        assert_eq!(key.to_string(), "Av 15");
    }

    #[test]
    fn test_autumn_dates_resolve_in_the_later_hebrew_year() {
        // Hanukkah 5786: the key must land in December 2025 even though the
        // earlier overlapping Hebrew year (5785) also contains 25 Kislev.
        let key = HebrewKey {
            month: HebrewMonth::Kislev,
            day: 25,
        };
        assert_eq!(solar_date_for_key_in_year(&key, 2025), Some(solar(2025, 12, 15)));
    }
}
