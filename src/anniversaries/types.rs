//! Core types for anniversary events and their materialized occurrences.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::hebcal::{HebrewKey, Occurrence};

// ============================================================================
// Event Types
// ============================================================================

/// Kind of life-cycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A birthday.
    #[default]
    Birthday,
    /// A wedding anniversary.
    Wedding,
    /// A death.
    Death,
    /// A death memorial (yahrzeit).
    DeathMemorial,
}

impl EventKind {
    /// Get a human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            EventKind::Birthday => "Birthday",
            EventKind::Wedding => "Wedding",
            EventKind::Death => "Death",
            EventKind::DeathMemorial => "Death Memorial",
        }
    }

    /// Whether this kind carries death/burial dates and the burial offset.
    pub fn is_death(&self) -> bool {
        matches!(self, EventKind::Death | EventKind::DeathMemorial)
    }
}

/// A recurring (or one-off) family life-cycle event.
///
/// The anchor date is always stored as a solar date with denormalized
/// year/month/day for direct filtering. Hebrew-anchored annual events
/// additionally carry a year-independent [`HebrewKey`] and a materialized
/// `occurrences` list covering every solar year up to the tenant's horizon.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnniversaryEvent {
    /// Owning tenant (family site).
    pub tenant_id: String,
    /// Unique identifier for the event.
    pub id: String,
    /// Event name (localization happens outside this engine).
    pub name: String,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kind of event.
    pub kind: EventKind,
    /// Reference to an uploaded image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Canonical solar anchor date.
    pub date: NaiveDate,
    /// Denormalized anchor year.
    pub year: i32,
    /// Denormalized anchor month.
    pub month: u32,
    /// Denormalized anchor day.
    pub day: u32,
    /// Whether the event recurs every year.
    #[serde(default)]
    pub annual: bool,
    /// Whether recurrence follows the Hebrew calendar.
    #[serde(default)]
    pub hebrew: bool,
    /// Year-independent Hebrew anchor key (Hebrew-anchored events only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hebrew_key: Option<HebrewKey>,
    /// Hebrew rendering of the anchor date, for display only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hebrew_display: Option<String>,
    /// Death date (death kinds only; defaults to the anchor date).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_date: Option<NaiveDate>,
    /// Burial date (death kinds only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burial_date: Option<NaiveDate>,
    /// Hebrew rendering of the burial date, for display only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burial_hebrew_display: Option<String>,
    /// Materialized solar occurrences, present only for Hebrew annual events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<Vec<Occurrence>>,
    /// When the event was created.
    pub created_at: DateTime<Utc>,
    /// User who created the event.
    pub created_by: String,
}

impl AnniversaryEvent {
    /// Build an event from a validated draft. Hebrew fields and occurrences
    /// are filled in by the manager.
    pub fn from_draft(tenant_id: impl Into<String>, draft: EventDraft) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            description: draft.description,
            kind: draft.kind,
            image: draft.image,
            date: draft.date,
            year: draft.date.year(),
            month: draft.date.month(),
            day: draft.date.day(),
            annual: draft.annual,
            hebrew: draft.hebrew,
            hebrew_key: None,
            hebrew_display: None,
            death_date: draft.death_date,
            burial_date: draft.burial_date,
            burial_hebrew_display: None,
            occurrences: None,
            created_at: Utc::now(),
            created_by: draft.created_by,
        }
    }

    /// Effective death date for projection: the explicit death date, or the
    /// anchor for death kinds that did not set one.
    pub fn effective_death_date(&self) -> Option<NaiveDate> {
        if self.kind.is_death() {
            self.death_date.or(Some(self.date))
        } else {
            None
        }
    }

    /// Keep the denormalized anchor fields in sync with the anchor date.
    pub fn sync_anchor_fields(&mut self) {
        self.year = self.date.year();
        self.month = self.date.month();
        self.day = self.date.day();
    }

    /// The materialized occurrence for a given (year, month), if any.
    pub fn occurrence_for(&self, year: i32, month: u32) -> Option<&Occurrence> {
        self.occurrences
            .as_deref()?
            .iter()
            .find(|o| o.year == year && o.month == month)
    }

    /// Years already covered by the materialized occurrence list.
    pub fn occurrence_years(&self) -> HashSet<i32> {
        self.occurrences
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|o| o.year)
            .collect()
    }

    /// Re-check the draft invariants after a patch has been merged in.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()));
        }
        if !self.kind.is_death() && (self.death_date.is_some() || self.burial_date.is_some()) {
            return Err(ValidationError::BurialWithoutDeath);
        }
        if let Some(burial) = self.burial_date {
            let death = self.death_date.unwrap_or(self.date);
            if burial < death {
                return Err(ValidationError::BurialBeforeDeath { burial, death });
            }
        }
        Ok(())
    }

    /// Copy of this event with the displayed date replaced by a concrete
    /// occurrence, so callers always see a solar date for the queried year.
    pub fn resolved_at(&self, occurrence: &Occurrence) -> Self {
        let mut event = self.clone();
        event.date = occurrence.date;
        event.year = occurrence.year;
        event.month = occurrence.month;
        event.day = occurrence.day;
        event
    }
}

// ============================================================================
// Create / Update Payloads
// ============================================================================

/// Payload for creating an event.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EventDraft {
    /// Event name.
    pub name: String,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kind of event.
    #[serde(default)]
    pub kind: EventKind,
    /// Solar anchor date.
    pub date: NaiveDate,
    /// Whether the event recurs every year.
    #[serde(default = "default_true")]
    pub annual: bool,
    /// Whether recurrence follows the Hebrew calendar.
    #[serde(default)]
    pub hebrew: bool,
    /// Death date (death kinds only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_date: Option<NaiveDate>,
    /// Burial date (death kinds only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burial_date: Option<NaiveDate>,
    /// Reference to an uploaded image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// User creating the event.
    #[serde(default)]
    pub created_by: String,
}

fn default_true() -> bool {
    true
}

impl EventDraft {
    /// Create a draft with the required fields.
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: EventKind::default(),
            date,
            annual: true,
            hebrew: false,
            death_date: None,
            burial_date: None,
            image: None,
            created_by: String::new(),
        }
    }

    /// Set the kind.
    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Anchor recurrence to the Hebrew calendar.
    pub fn hebrew_anchored(mut self) -> Self {
        self.hebrew = true;
        self
    }

    /// Mark the event as non-recurring.
    pub fn one_off(mut self) -> Self {
        self.annual = false;
        self
    }

    /// Set the death date.
    pub fn with_death_date(mut self, date: NaiveDate) -> Self {
        self.death_date = Some(date);
        self
    }

    /// Set the burial date.
    pub fn with_burial_date(mut self, date: NaiveDate) -> Self {
        self.burial_date = Some(date);
        self
    }

    /// Set the creating user.
    pub fn by(mut self, user: impl Into<String>) -> Self {
        self.created_by = user.into();
        self
    }

    /// Reject malformed drafts before anything is persisted.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()));
        }
        if !self.kind.is_death() && (self.death_date.is_some() || self.burial_date.is_some()) {
            return Err(ValidationError::BurialWithoutDeath);
        }
        if let Some(burial) = self.burial_date {
            let death = self.death_date.unwrap_or(self.date);
            if burial < death {
                return Err(ValidationError::BurialBeforeDeath { burial, death });
            }
        }
        Ok(())
    }
}

/// Partial update for an event. Unset fields keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct EventPatch {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventKind>,
    /// New anchor date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// New annual flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual: Option<bool>,
    /// New calendar mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hebrew: Option<bool>,
    /// New death date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_date: Option<NaiveDate>,
    /// New burial date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burial_date: Option<NaiveDate>,
    /// Remove the burial date.
    #[serde(default)]
    pub clear_burial_date: bool,
    /// New image reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Remove the image reference.
    #[serde(default)]
    pub clear_image: bool,
}

impl EventPatch {
    /// Merge this patch over an existing event.
    ///
    /// Only the descriptive and anchor fields are touched here; the manager
    /// recomputes Hebrew keys, displays, and occurrences afterwards.
    pub fn apply_to(&self, event: &mut AnniversaryEvent) {
        if let Some(ref name) = self.name {
            event.name = name.clone();
        }
        if let Some(ref description) = self.description {
            event.description = Some(description.clone());
        }
        if let Some(kind) = self.kind {
            event.kind = kind;
        }
        if let Some(date) = self.date {
            event.date = date;
            event.sync_anchor_fields();
        }
        if let Some(annual) = self.annual {
            event.annual = annual;
        }
        if let Some(hebrew) = self.hebrew {
            event.hebrew = hebrew;
        }
        if let Some(death_date) = self.death_date {
            event.death_date = Some(death_date);
        }
        if let Some(burial_date) = self.burial_date {
            event.burial_date = Some(burial_date);
        }
        if self.clear_burial_date {
            event.burial_date = None;
        }
        if let Some(ref image) = self.image {
            event.image = Some(image.clone());
        }
        if self.clear_image {
            event.image = None;
        }
    }
}

// ============================================================================
// Horizon
// ============================================================================

/// Per-tenant record of the furthest solar year through which Hebrew
/// occurrences have been materialized for every event in the tenant.
///
/// The version number makes advancement an explicit compare-and-set, so
/// concurrent backfills converge instead of silently overwriting each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HorizonRecord {
    pub tenant_id: String,
    pub year: i32,
    pub version: u64,
}
