//! Anniversary management: CRUD, month queries, and horizon extension.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info};

use crate::config::ProjectionConfig;
use crate::error::{HearthError, Result, StorageError};
use crate::hebcal::{
    hebrew_display, hebrew_key_for, project, project_missing, projection_start, HebrewKey,
    Occurrence,
};

use super::store::EventStore;
use super::types::{AnniversaryEvent, EventDraft, EventPatch, HorizonRecord};

// ============================================================================
// Clock
// ============================================================================

/// Source of "the current year" for projection decisions.
///
/// Projection never starts before the current year, and horizon records are
/// lazily initialized to it, so tests pin the year instead of depending on
/// the wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// Wall-clock year (UTC).
    #[default]
    System,
    /// A fixed year.
    Fixed(i32),
}

impl Clock {
    /// The current solar year.
    pub fn current_year(&self) -> i32 {
        match self {
            Clock::System => Utc::now().year(),
            Clock::Fixed(year) => *year,
        }
    }
}

// ============================================================================
// Anniversary Manager
// ============================================================================

/// Manager for anniversary events, providing storage and query operations.
///
/// This is the sole writer of event records and their materialized
/// occurrence lists; the horizon record is advanced only through
/// [`AnniversaryManager::ensure_horizon`].
pub struct AnniversaryManager<S: EventStore> {
    store: Arc<S>,
    clock: Clock,
    max_advance_years: u32,
}

impl<S: EventStore> AnniversaryManager<S> {
    /// Create a manager over the given store, using the system clock.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, Clock::System)
    }

    /// Create a manager with an explicit clock.
    pub fn with_clock(store: Arc<S>, clock: Clock) -> Self {
        Self {
            store,
            clock,
            max_advance_years: ProjectionConfig::default().max_advance_years,
        }
    }

    /// Apply projection limits from configuration.
    pub fn with_projection_config(mut self, config: &ProjectionConfig) -> Self {
        self.max_advance_years = config.max_advance_years;
        self
    }

    // ========================================================================
    // CRUD Operations
    // ========================================================================

    /// Create a new anniversary event.
    ///
    /// Hebrew-anchored events get their key and display renderings computed
    /// here; Hebrew annual events are additionally materialized through the
    /// tenant's current horizon, never beyond it. The horizon only moves
    /// forward on query demand.
    pub async fn create(&self, tenant_id: &str, draft: EventDraft) -> Result<AnniversaryEvent> {
        draft.validate()?;

        let mut event = AnniversaryEvent::from_draft(tenant_id, draft);
        self.refresh_hebrew_fields(&mut event);

        if event.hebrew && event.annual {
            let current_year = self.clock.current_year();
            let horizon = self.store.horizon_or_init(tenant_id, current_year).await?;
            self.materialize(&mut event, current_year, horizon.year);
        }

        let event = self.store.put_event(event).await?;
        debug!("Created anniversary event: {} ({})", event.name, event.id);
        Ok(event)
    }

    /// Get an event by id.
    pub async fn get(&self, tenant_id: &str, id: &str) -> Result<Option<AnniversaryEvent>> {
        self.store.get_event(tenant_id, id).await
    }

    /// Update an existing event.
    ///
    /// The patch is merged over the stored record, and the Hebrew key and
    /// the entire occurrence list are then recomputed from scratch up to
    /// the current horizon. No incremental patching: edits are rare and
    /// horizons are bounded. An event switched from Hebrew to solar loses
    /// its Hebrew fields and occurrences.
    pub async fn update(
        &self,
        tenant_id: &str,
        id: &str,
        patch: EventPatch,
    ) -> Result<AnniversaryEvent> {
        let mut event = self
            .store
            .get_event(tenant_id, id)
            .await?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        patch.apply_to(&mut event);
        event.validate()?;
        self.refresh_hebrew_fields(&mut event);

        if event.hebrew && event.annual {
            let current_year = self.clock.current_year();
            let horizon = self.store.horizon_or_init(tenant_id, current_year).await?;
            self.materialize(&mut event, current_year, horizon.year);
        }

        let event = self.store.put_event(event).await?;
        debug!("Updated anniversary event: {} ({})", event.name, event.id);
        Ok(event)
    }

    /// Delete an event by id. No cascading state elsewhere.
    pub async fn delete(&self, tenant_id: &str, id: &str) -> Result<bool> {
        let deleted = self.store.delete_event(tenant_id, id).await?;
        if deleted {
            debug!("Deleted anniversary event: {}", id);
        }
        Ok(deleted)
    }

    // ========================================================================
    // Month Query
    // ========================================================================

    /// All events of a tenant falling in the given month of the given year,
    /// sorted by day.
    ///
    /// Solar annual events recur by plain year substitution; non-annual
    /// events match only their literal year; Hebrew annual events match
    /// through their materialized occurrence lists, extended on demand when
    /// the queried year lies beyond the tenant's horizon.
    pub async fn events_for_month(
        &self,
        tenant_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Vec<AnniversaryEvent>> {
        let current_year = self.clock.current_year();
        let horizon = self.store.horizon_or_init(tenant_id, current_year).await?;
        if year > horizon.year {
            self.ensure_horizon(tenant_id, year).await?;
        }

        let mut results = Vec::new();

        // Solar and literal-year matches come straight off the denormalized
        // anchor month.
        for event in self.store.events_in_month(tenant_id, month).await? {
            if event.annual {
                if !event.hebrew {
                    let occurrence = solar_occurrence(&event, year);
                    results.push(event.resolved_at(&occurrence));
                }
                // Hebrew annual events are handled below via occurrences.
            } else if event.year == year {
                results.push(event);
            }
        }

        // Hebrew annual events surface wherever their materialized
        // occurrence for (year, month) lands.
        for event in self.store.hebrew_annual_events(tenant_id).await? {
            if let Some(occurrence) = event.occurrence_for(year, month) {
                let occurrence = *occurrence;
                results.push(event.resolved_at(&occurrence));
            }
        }

        results.sort_by(|a, b| a.day.cmp(&b.day));
        Ok(results)
    }

    // ========================================================================
    // Horizon Extension
    // ========================================================================

    /// The year through which this tenant's Hebrew occurrences are
    /// materialized.
    pub async fn horizon_year(&self, tenant_id: &str) -> Result<i32> {
        let current_year = self.clock.current_year();
        Ok(self
            .store
            .horizon_or_init(tenant_id, current_year)
            .await?
            .year)
    }

    /// Materialize occurrences for every Hebrew annual event of the tenant
    /// through `target_year`, then advance the horizon.
    ///
    /// Safe to re-run: years already present in an event's occurrence list
    /// are skipped before any conversion work, so repeated or overlapping
    /// invocations converge to the same state. The horizon advances only
    /// after the batch write succeeds, and only through a compare-and-set
    /// on the version read at the start of the pass; a conflicting writer
    /// triggers a re-read and another (cheap, mostly-skipping) pass.
    pub async fn ensure_horizon(&self, tenant_id: &str, target_year: i32) -> Result<HorizonRecord> {
        let current_year = self.clock.current_year();
        // A query for the far future must not project thousands of years.
        let target_year = target_year.min(current_year + self.max_advance_years as i32);

        loop {
            let horizon = self.store.horizon_or_init(tenant_id, current_year).await?;
            if target_year <= horizon.year {
                return Ok(horizon);
            }

            let mut updated = Vec::new();
            for mut event in self.store.hebrew_annual_events(tenant_id).await? {
                let existing = event.occurrence_years();
                let (key, start) = self.projection_anchor(&event, current_year);
                let additions = project_missing(&key, start, target_year, &existing);
                if additions.is_empty() {
                    continue;
                }

                let mut occurrences = event.occurrences.take().unwrap_or_default();
                occurrences.extend(additions);
                occurrences.sort_by_key(|o| o.year);
                event.occurrences = Some(occurrences);
                updated.push(event);
            }

            if !updated.is_empty() {
                self.store.put_events_batch(updated).await?;
            }

            match self
                .store
                .advance_horizon(tenant_id, horizon.version, target_year)
                .await
            {
                Ok(record) => {
                    info!(
                        "Extended horizon for tenant {} to {}",
                        tenant_id, record.year
                    );
                    return Ok(record);
                }
                Err(HearthError::Storage(StorageError::VersionConflict { .. })) => {
                    debug!(
                        "Horizon version conflict for tenant {}, retrying",
                        tenant_id
                    );
                    continue;
                }
                Err(err) => return Err(err),
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Recompute the derived Hebrew fields after a create or merge.
    fn refresh_hebrew_fields(&self, event: &mut AnniversaryEvent) {
        if event.hebrew {
            event.hebrew_key = Some(hebrew_key_for(event.date));
            event.hebrew_display = Some(hebrew_display(event.date));
            event.burial_hebrew_display = event.burial_date.map(hebrew_display);
        } else {
            event.hebrew_key = None;
            event.hebrew_display = None;
            event.burial_hebrew_display = None;
        }
        event.occurrences = None;
    }

    /// Key and first year for projecting an event.
    ///
    /// Death events project from the death date's key, delayed past the
    /// burial year when a burial date exists; everything else projects from
    /// the anchor.
    fn projection_anchor(&self, event: &AnniversaryEvent, current_year: i32) -> (HebrewKey, i32) {
        let anchor = event.effective_death_date().unwrap_or(event.date);
        let burial = if event.kind.is_death() {
            event.burial_date
        } else {
            None
        };
        (
            hebrew_key_for(anchor),
            projection_start(current_year, anchor, burial),
        )
    }

    /// Regenerate the full occurrence list through `horizon_year`.
    fn materialize(&self, event: &mut AnniversaryEvent, current_year: i32, horizon_year: i32) {
        let (key, start) = self.projection_anchor(event, current_year);
        event.occurrences = Some(project(&key, start, horizon_year));
    }
}

/// Inline solar occurrence for an annual solar event in the queried year.
///
/// Anchors on February 29 clamp to February 28 in non-leap years.
fn solar_occurrence(event: &AnniversaryEvent, year: i32) -> Occurrence {
    let date = NaiveDate::from_ymd_opt(year, event.month, event.day)
        .or_else(|| NaiveDate::from_ymd_opt(year, event.month, event.day - 1))
        .unwrap_or(event.date);
    Occurrence {
        year: date.year(),
        month: date.month(),
        day: date.day(),
        date,
    }
}

// ============================================================================
// Tests
// ============================================================================
