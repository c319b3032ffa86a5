//! Hebrew lunisolar calendar arithmetic.
//!
//! Implements the fixed (molad-based) Hebrew calendar: 19-year leap cycle,
//! the elapsed-days formula with its postponement rules, and the variable
//! month lengths that follow from them. Dates are bridged to the solar
//! calendar through rata-die day numbers, which line up with chrono's
//! `num_days_from_ce`.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Months of the Hebrew calendar, in civil (Tishrei-first) order.
///
/// `Adar` is the single Adar of a common year; `AdarI`/`AdarII` exist only
/// in leap years. All three are distinct so that an anniversary anchored in
/// a leap year keeps its identity across year shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HebrewMonth {
    Tishrei,
    Cheshvan,
    Kislev,
    Tevet,
    Shevat,
    AdarI,
    Adar,
    AdarII,
    Nisan,
    Iyar,
    Sivan,
    Tammuz,
    Av,
    Elul,
}

impl HebrewMonth {
    /// English name of the month.
    pub fn name(&self) -> &'static str {
        match self {
            HebrewMonth::Tishrei => "Tishrei",
            HebrewMonth::Cheshvan => "Cheshvan",
            HebrewMonth::Kislev => "Kislev",
            HebrewMonth::Tevet => "Tevet",
            HebrewMonth::Shevat => "Shevat",
            HebrewMonth::AdarI => "Adar I",
            HebrewMonth::Adar => "Adar",
            HebrewMonth::AdarII => "Adar II",
            HebrewMonth::Nisan => "Nisan",
            HebrewMonth::Iyar => "Iyar",
            HebrewMonth::Sivan => "Sivan",
            HebrewMonth::Tammuz => "Tammuz",
            HebrewMonth::Av => "Av",
            HebrewMonth::Elul => "Elul",
        }
    }
}

impl fmt::Display for HebrewMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A date on the Hebrew calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HebrewDate {
    pub year: i32,
    pub month: HebrewMonth,
    pub day: u8,
}

impl fmt::Display for HebrewDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.day, self.month, self.year)
    }
}

const COMMON_MONTHS: [HebrewMonth; 12] = [
    HebrewMonth::Tishrei,
    HebrewMonth::Cheshvan,
    HebrewMonth::Kislev,
    HebrewMonth::Tevet,
    HebrewMonth::Shevat,
    HebrewMonth::Adar,
    HebrewMonth::Nisan,
    HebrewMonth::Iyar,
    HebrewMonth::Sivan,
    HebrewMonth::Tammuz,
    HebrewMonth::Av,
    HebrewMonth::Elul,
];

const LEAP_MONTHS: [HebrewMonth; 13] = [
    HebrewMonth::Tishrei,
    HebrewMonth::Cheshvan,
    HebrewMonth::Kislev,
    HebrewMonth::Tevet,
    HebrewMonth::Shevat,
    HebrewMonth::AdarI,
    HebrewMonth::AdarII,
    HebrewMonth::Nisan,
    HebrewMonth::Iyar,
    HebrewMonth::Sivan,
    HebrewMonth::Tammuz,
    HebrewMonth::Av,
    HebrewMonth::Elul,
];

// Offset between the elapsed-days count and rata-die day numbers
// (1 Tishrei AM 1 falls on rata die -1373427).
const EPOCH_OFFSET: i64 = 1_373_428;

/// Whether the given Hebrew year has a leap month.
pub fn is_leap_year(h_year: i32) -> bool {
    (7 * i64::from(h_year) + 1).rem_euclid(19) < 7
}

/// Days from the calendar epoch to Rosh Hashanah of the given year,
/// including the classical postponements (dehiyyot).
fn elapsed_days(h_year: i32) -> i64 {
    let year = i64::from(h_year);
    let months_elapsed = (235 * (year - 1) + 1).div_euclid(19);
    let parts_elapsed = 204 + 793 * (months_elapsed % 1080);
    let hours_elapsed =
        5 + 12 * months_elapsed + 793 * (months_elapsed / 1080) + parts_elapsed / 1080;
    let conjunction_day = 1 + 29 * months_elapsed + hours_elapsed / 24;
    let conjunction_parts = 1080 * (hours_elapsed % 24) + parts_elapsed % 1080;

    let mut day = conjunction_day;
    // Molad at or after noon, or the gatarad / betutakpat rules.
    if conjunction_parts >= 19440
        || (conjunction_day % 7 == 2 && conjunction_parts >= 9924 && !is_leap_year(h_year))
        || (conjunction_day % 7 == 1 && conjunction_parts >= 16789 && is_leap_year(h_year - 1))
    {
        day += 1;
    }
    // Rosh Hashanah may not fall on Sunday, Wednesday, or Friday.
    if matches!(day % 7, 0 | 3 | 5) {
        day += 1;
    }
    day
}

/// Rata-die day number of 1 Tishrei in the given Hebrew year.
pub fn new_year_rata_die(h_year: i32) -> i64 {
    elapsed_days(h_year) - EPOCH_OFFSET
}

/// Number of days in the given Hebrew year (353-355 or 383-385).
pub fn year_length(h_year: i32) -> i64 {
    new_year_rata_die(h_year + 1) - new_year_rata_die(h_year)
}

fn long_cheshvan(h_year: i32) -> bool {
    year_length(h_year) % 10 == 5
}

fn short_kislev(h_year: i32) -> bool {
    year_length(h_year) % 10 == 3
}

/// Months of the given year in civil order.
pub fn months_of_year(h_year: i32) -> &'static [HebrewMonth] {
    if is_leap_year(h_year) {
        &LEAP_MONTHS
    } else {
        &COMMON_MONTHS
    }
}

/// Whether the month exists in the given year.
pub fn month_in_year(h_year: i32, month: HebrewMonth) -> bool {
    match month {
        HebrewMonth::AdarI | HebrewMonth::AdarII => is_leap_year(h_year),
        HebrewMonth::Adar => !is_leap_year(h_year),
        _ => true,
    }
}

/// Length in days of the month within the given year.
///
/// Only Cheshvan and Kislev vary with the year shape; the caller must not
/// pass a month absent from that year (see [`month_in_year`]).
pub fn month_length(h_year: i32, month: HebrewMonth) -> u8 {
    match month {
        HebrewMonth::Tishrei
        | HebrewMonth::Shevat
        | HebrewMonth::AdarI
        | HebrewMonth::Nisan
        | HebrewMonth::Sivan
        | HebrewMonth::Av => 30,
        HebrewMonth::Cheshvan => {
            if long_cheshvan(h_year) {
                30
            } else {
                29
            }
        }
        HebrewMonth::Kislev => {
            if short_kislev(h_year) {
                29
            } else {
                30
            }
        }
        HebrewMonth::Tevet
        | HebrewMonth::Adar
        | HebrewMonth::AdarII
        | HebrewMonth::Iyar
        | HebrewMonth::Tammuz
        | HebrewMonth::Elul => 29,
    }
}

/// Rata-die day number of a Hebrew date.
pub fn to_rata_die(date: &HebrewDate) -> i64 {
    let mut rd = new_year_rata_die(date.year);
    for &month in months_of_year(date.year) {
        if month == date.month {
            break;
        }
        rd += i64::from(month_length(date.year, month));
    }
    rd + i64::from(date.day) - 1
}

/// Hebrew date for a rata-die day number.
pub fn from_rata_die(rd: i64) -> HebrewDate {
    // Underestimates the year (the mean Hebrew year is shorter than 366
    // days), then walks forward.
    let mut year = ((rd + EPOCH_OFFSET) / 366).max(1) as i32;
    while new_year_rata_die(year + 1) <= rd {
        year += 1;
    }

    let mut remaining = rd - new_year_rata_die(year);
    let months = months_of_year(year);
    for &month in months {
        let len = i64::from(month_length(year, month));
        if remaining < len {
            return HebrewDate {
                year,
                month,
                day: (remaining + 1) as u8,
            };
        }
        remaining -= len;
    }

    // Unreachable for any rd within the year located above.
    HebrewDate {
        year,
        month: HebrewMonth::Elul,
        day: 29,
    }
}

/// Hebrew date on which the given solar date falls.
pub fn hebrew_from_solar(date: NaiveDate) -> HebrewDate {
    from_rata_die(i64::from(date.num_days_from_ce()))
}

/// Solar date of the given Hebrew date, if representable.
pub fn solar_from_hebrew(date: &HebrewDate) -> Option<NaiveDate> {
    let rd = to_rata_die(date);
    NaiveDate::from_num_days_from_ce_opt(i32::try_from(rd).ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solar(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_leap_year_cycle() {
        assert!(is_leap_year(5784));
        assert!(!is_leap_year(5785));
        assert!(!is_leap_year(5786));
        assert!(is_leap_year(5787));
    }

    #[test]
    fn test_rosh_hashanah_dates() {
        let rh = |y| NaiveDate::from_num_days_from_ce_opt(new_year_rata_die(y) as i32).unwrap();
        assert_eq!(rh(5784), solar(2023, 9, 16));
        assert_eq!(rh(5785), solar(2024, 10, 3));
        assert_eq!(rh(5786), solar(2025, 9, 23));
        assert_eq!(rh(5787), solar(2026, 9, 12));
    }

    #[test]
    fn test_year_lengths() {
        assert_eq!(year_length(5785), 355);
        assert_eq!(year_length(5786), 354);
        // Leap years run 383-385 days.
        assert!((383..=385).contains(&year_length(5784)));
    }

    #[test]
    fn test_known_holiday_dates() {
        // First day of Pesach 5784.
        let pesach = HebrewDate {
            year: 5784,
            month: HebrewMonth::Nisan,
            day: 15,
        };
        assert_eq!(solar_from_hebrew(&pesach), Some(solar(2024, 4, 23)));

        // Purim in a common year.
        let purim = HebrewDate {
            year: 5785,
            month: HebrewMonth::Adar,
            day: 14,
        };
        assert_eq!(solar_from_hebrew(&purim), Some(solar(2025, 3, 14)));

        // Purim in a leap year falls in Adar II.
        let purim_leap = HebrewDate {
            year: 5784,
            month: HebrewMonth::AdarII,
            day: 14,
        };
        assert_eq!(solar_from_hebrew(&purim_leap), Some(solar(2024, 3, 24)));

        // First day of Hanukkah 5786.
        let hanukkah = HebrewDate {
            year: 5786,
            month: HebrewMonth::Kislev,
            day: 25,
        };
        assert_eq!(solar_from_hebrew(&hanukkah), Some(solar(2025, 12, 15)));
    }

    #[test]
    fn test_solar_to_hebrew() {
        // Tu B'Av 5785.
        let h = hebrew_from_solar(solar(2025, 8, 9));
        assert_eq!(h.year, 5785);
        assert_eq!(h.month, HebrewMonth::Av);
        assert_eq!(h.day, 15);

        // Day before Rosh Hashanah is 29 Elul of the prior year.
        let h = hebrew_from_solar(solar(2025, 9, 22));
        assert_eq!(h.year, 5785);
        assert_eq!(h.month, HebrewMonth::Elul);
        assert_eq!(h.day, 29);
    }

    #[test]
    fn test_rata_die_round_trip() {
        for offset in 0..800 {
            let date = solar(2024, 1, 1) + chrono::Duration::days(offset);
            let h = hebrew_from_solar(date);
            assert_eq!(solar_from_hebrew(&h), Some(date), "failed for {date}");
        }
    }

    #[test]
    fn test_month_lengths_sum_to_year_length() {
        for year in [5784, 5785, 5786, 5787] {
            let total: i64 = months_of_year(year)
                .iter()
                .map(|&m| i64::from(month_length(year, m)))
                .sum();
            assert_eq!(total, year_length(year), "year {year}");
        }
    }

    #[test]
    fn test_cheshvan_length_varies() {
        // 5785 is a complete year, 5786 a regular one.
        assert_eq!(month_length(5785, HebrewMonth::Cheshvan), 30);
        assert_eq!(month_length(5786, HebrewMonth::Cheshvan), 29);
    }

    #[test]
    fn test_month_in_year() {
        assert!(month_in_year(5785, HebrewMonth::Adar));
        assert!(!month_in_year(5785, HebrewMonth::AdarI));
        assert!(!month_in_year(5785, HebrewMonth::AdarII));
        assert!(!month_in_year(5784, HebrewMonth::Adar));
        assert!(month_in_year(5784, HebrewMonth::AdarI));
        assert!(month_in_year(5784, HebrewMonth::AdarII));
    }

    #[test]
    fn test_display() {
        let d = HebrewDate {
            year: 5785,
            month: HebrewMonth::Av,
            day: 15,
        };
        assert_eq!(d.to_string(), "15 Av 5785");
    }
}
