//! Hearth: Recurring-Anniversary Occurrence Engine
//!
//! A multi-tenant engine for family life-cycle events (birthdays, weddings,
//! yahrzeits) that recur by either the solar or the Hebrew calendar, with
//! per-tenant materialized occurrence horizons.

pub mod anniversaries;
pub mod config;
pub mod error;
pub mod hebcal;

pub use anniversaries::{
    AnniversaryEvent, AnniversaryManager, Clock, EmbeddedEventStore, EventDraft, EventKind,
    EventPatch, EventStore, HorizonRecord,
};
pub use config::{Config, ProjectionConfig, StorageConfig};
pub use error::{ConfigError, HearthError, Result, StorageError, ValidationError};
pub use hebcal::{
    hebrew_display, hebrew_from_solar, hebrew_key_for, project, projection_start,
    solar_date_for_key_in_year, solar_from_hebrew, HebrewDate, HebrewKey, HebrewMonth, Occurrence,
};
