//! Hebrew calendar conversion and occurrence projection.
//!
//! The Hebrew calendar is lunisolar: months track the moon, a leap month
//! keeps the year aligned with the sun, and two months (Cheshvan, Kislev)
//! vary in length with the year shape. An event anchored to a Hebrew date
//! therefore lands on a different solar date every year, and some years
//! contain no matching date at all.
//!
//! - [`dates`]: the raw calendar arithmetic (leap cycle, molad formula,
//!   month lengths, rata-die conversion).
//! - [`convert`]: year-independent anchor keys and the search for a key's
//!   solar date within a given solar year.
//! - [`projector`]: expansion of a key into per-year [`Occurrence`]s,
//!   including the burial-offset start rule for memorial events.

pub mod convert;
pub mod dates;
pub mod projector;

pub use convert::{hebrew_display, hebrew_key_for, solar_date_for_key_in_year, HebrewKey};
pub use dates::{hebrew_from_solar, solar_from_hebrew, HebrewDate, HebrewMonth};
pub use projector::{project, project_missing, projection_start, Occurrence};
