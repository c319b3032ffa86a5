//! Anniversary module for recurring life-cycle events.
//!
//! This module provides the tenant-facing half of the engine:
//!
//! - **Anniversary Events**: Birthdays, weddings, deaths, and memorials,
//!   anchored to a solar date and optionally recurring by the Hebrew calendar
//! - **Event Management**: CRUD operations with validation and Hebrew
//!   enrichment
//! - **Month Queries**: Everything a tenant should see in a given month of a
//!   given year, mixing solar recurrence, one-off events, and materialized
//!   Hebrew occurrences
//! - **Horizon Management**: Lazy, idempotent extension of each tenant's
//!   materialized-occurrence window, guarded by a versioned compare-and-set
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Anniversary Layer                             │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │              AnniversaryManager                           │  │
//! │  │  - Event CRUD with validation                             │  │
//! │  │  - Hebrew key + display enrichment                        │  │
//! │  │  - Month queries (solar + Hebrew merged)                  │  │
//! │  │  - Horizon extension (CAS + retry)                        │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                 │                          │                     │
//! │                 ▼                          ▼                     │
//! │  ┌──────────────────────────┐  ┌──────────────────────────────┐ │
//! │  │      EventStore          │  │      hebcal                  │ │
//! │  │  (EmbeddedEventStore)    │  │  - key extraction            │ │
//! │  │  - events by tenant      │  │  - occurrence projection     │ │
//! │  │  - horizon records       │  │  - calendar conversion       │ │
//! │  └──────────────────────────┘  └──────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use hearth::anniversaries::{AnniversaryManager, EmbeddedEventStore, EventDraft, EventKind};
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//!
//! let store = Arc::new(EmbeddedEventStore::new());
//! let manager = AnniversaryManager::new(store);
//!
//! // A wedding anniversary that recurs by the Hebrew calendar
//! let draft = EventDraft::new("Our wedding", NaiveDate::from_ymd_opt(2025, 8, 9).unwrap())
//!     .with_kind(EventKind::Wedding)
//!     .hebrew_anchored()
//!     .by("miriam");
//! let event = manager.create("cohen", draft).await?;
//!
//! // Everything the family sees in July 2026
//! let events = manager.events_for_month("cohen", 7, 2026).await?;
//! ```

mod events;
pub mod store;
pub mod types;

pub use events::{AnniversaryManager, Clock};
pub use store::{EmbeddedEventStore, EventStore};
pub use types::{AnniversaryEvent, EventDraft, EventKind, EventPatch, HorizonRecord};
