//! Event storage trait and the embedded implementation.
//!
//! The trait captures the contract this engine needs from a tenant-
//! partitioned document store: point reads/writes by id, equality-filtered
//! queries, an atomic multi-document batch write, and a versioned
//! compare-and-set for the per-tenant horizon record.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex as AsyncMutex, RwLock};

use crate::error::{HearthError, Result, StorageError};

use super::types::{AnniversaryEvent, HorizonRecord};

// ============================================================================
// EventStore Trait
// ============================================================================

/// Trait for anniversary storage backends.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert or replace an event.
    async fn put_event(&self, event: AnniversaryEvent) -> Result<AnniversaryEvent>;

    /// Point read of an event within a tenant.
    async fn get_event(&self, tenant_id: &str, id: &str) -> Result<Option<AnniversaryEvent>>;

    /// Delete an event. Returns false when the id was absent.
    async fn delete_event(&self, tenant_id: &str, id: &str) -> Result<bool>;

    /// All events of a tenant whose denormalized anchor month matches.
    async fn events_in_month(&self, tenant_id: &str, month: u32) -> Result<Vec<AnniversaryEvent>>;

    /// All Hebrew-anchored annual events of a tenant.
    async fn hebrew_annual_events(&self, tenant_id: &str) -> Result<Vec<AnniversaryEvent>>;

    /// Replace a batch of events in one atomic write.
    async fn put_events_batch(&self, events: Vec<AnniversaryEvent>) -> Result<()>;

    /// The tenant's horizon record, created at `default_year` on first use.
    async fn horizon_or_init(&self, tenant_id: &str, default_year: i32) -> Result<HorizonRecord>;

    /// Compare-and-set advancement of the horizon.
    ///
    /// No-op (returning the stored record unchanged) when `target_year` is
    /// at or below the stored year; fails with
    /// [`StorageError::VersionConflict`] when `expected_version` is stale.
    /// The stored year never decreases.
    async fn advance_horizon(
        &self,
        tenant_id: &str,
        expected_version: u64,
        target_year: i32,
    ) -> Result<HorizonRecord>;
}

// ============================================================================
// Internal Data Structure
// ============================================================================

#[derive(Debug, Default)]
struct StoreData {
    /// Events indexed by id.
    events: HashMap<String, AnniversaryEvent>,
    /// Index: tenant_id -> event ids.
    events_by_tenant: HashMap<String, Vec<String>>,
    /// Horizon records indexed by tenant_id.
    horizons: HashMap<String, HorizonRecord>,
}

impl StoreData {
    fn index_event(&mut self, event: &AnniversaryEvent) {
        let ids = self
            .events_by_tenant
            .entry(event.tenant_id.clone())
            .or_default();
        if !ids.contains(&event.id) {
            ids.push(event.id.clone());
        }
    }

    fn unindex_event(&mut self, tenant_id: &str, id: &str) {
        if let Some(ids) = self.events_by_tenant.get_mut(tenant_id) {
            ids.retain(|existing| existing != id);
        }
    }

    fn tenant_events(&self, tenant_id: &str) -> Vec<&AnniversaryEvent> {
        self.events_by_tenant
            .get(tenant_id)
            .map(|ids| ids.iter().filter_map(|id| self.events.get(id)).collect())
            .unwrap_or_default()
    }
}

// ============================================================================
// Embedded Implementation
// ============================================================================

/// In-memory event store with optional JSON file persistence.
///
/// The reference backend for tests and single-node deployments. All data
/// sits behind a single `RwLock`, so batch writes and horizon CAS are
/// atomic with respect to every other operation.
pub struct EmbeddedEventStore {
    data: RwLock<StoreData>,
    persistence_path: Option<std::path::PathBuf>,
    persist_lock: AsyncMutex<()>,
}

impl EmbeddedEventStore {
    /// Create a new in-memory store without persistence.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(StoreData::default()),
            persistence_path: None,
            persist_lock: AsyncMutex::new(()),
        }
    }

    /// Create a store according to the storage configuration.
    pub async fn from_config(config: &crate::config::Config) -> Result<Self> {
        if config.storage.persist {
            Self::with_persistence(&config.data_dir()?).await
        } else {
            Ok(Self::new())
        }
    }

    /// Create a store persisting to `<data_dir>/anniversaries.json`.
    pub async fn with_persistence(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).map_err(StorageError::Io)?;

        let persistence_path = data_dir.join("anniversaries.json");
        let store = Self {
            data: RwLock::new(StoreData::default()),
            persistence_path: Some(persistence_path.clone()),
            persist_lock: AsyncMutex::new(()),
        };

        if persistence_path.exists() {
            store.load_from_file(&persistence_path).await?;
        }

        Ok(store)
    }

    async fn load_from_file(&self, path: &Path) -> Result<()> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(HearthError::Io)?;

        let persisted: PersistenceData =
            serde_json::from_str(&content).map_err(HearthError::Serialization)?;

        let mut data = self.data.write().await;
        for event in persisted.events {
            data.index_event(&event);
            data.events.insert(event.id.clone(), event);
        }
        for horizon in persisted.horizons {
            data.horizons.insert(horizon.tenant_id.clone(), horizon);
        }

        tracing::info!(
            "Loaded {} events and {} horizon records from {}",
            data.events.len(),
            data.horizons.len(),
            path.display()
        );

        Ok(())
    }

    /// Persist data to file if persistence is enabled.
    async fn persist(&self) -> Result<()> {
        let Some(ref path) = self.persistence_path else {
            return Ok(());
        };

        let _lock = self.persist_lock.lock().await;

        let data = self.data.read().await;
        let events: Vec<AnniversaryEvent> = data.events.values().cloned().collect();
        let horizons: Vec<HorizonRecord> = data.horizons.values().cloned().collect();
        drop(data);

        let persisted = PersistenceData {
            version: 1,
            events,
            horizons,
        };

        let content =
            serde_json::to_string_pretty(&persisted).map_err(HearthError::Serialization)?;

        // Write to temp file first, then rename for atomicity.
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(HearthError::Io)?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(HearthError::Io)?;

        Ok(())
    }
}

impl Default for EmbeddedEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for EmbeddedEventStore {
    async fn put_event(&self, event: AnniversaryEvent) -> Result<AnniversaryEvent> {
        let mut data = self.data.write().await;
        data.index_event(&event);
        data.events.insert(event.id.clone(), event.clone());
        drop(data);

        self.persist().await?;
        Ok(event)
    }

    async fn get_event(&self, tenant_id: &str, id: &str) -> Result<Option<AnniversaryEvent>> {
        let data = self.data.read().await;
        Ok(data
            .events
            .get(id)
            .filter(|event| event.tenant_id == tenant_id)
            .cloned())
    }

    async fn delete_event(&self, tenant_id: &str, id: &str) -> Result<bool> {
        let mut data = self.data.write().await;

        let matches = data
            .events
            .get(id)
            .is_some_and(|event| event.tenant_id == tenant_id);
        if !matches {
            return Ok(false);
        }

        data.events.remove(id);
        data.unindex_event(tenant_id, id);
        drop(data);

        self.persist().await?;
        Ok(true)
    }

    async fn events_in_month(&self, tenant_id: &str, month: u32) -> Result<Vec<AnniversaryEvent>> {
        let data = self.data.read().await;
        Ok(data
            .tenant_events(tenant_id)
            .into_iter()
            .filter(|event| event.month == month)
            .cloned()
            .collect())
    }

    async fn hebrew_annual_events(&self, tenant_id: &str) -> Result<Vec<AnniversaryEvent>> {
        let data = self.data.read().await;
        Ok(data
            .tenant_events(tenant_id)
            .into_iter()
            .filter(|event| event.hebrew && event.annual)
            .cloned()
            .collect())
    }

    async fn put_events_batch(&self, events: Vec<AnniversaryEvent>) -> Result<()> {
        let mut data = self.data.write().await;
        for event in events {
            data.index_event(&event);
            data.events.insert(event.id.clone(), event);
        }
        drop(data);

        self.persist().await?;
        Ok(())
    }

    async fn horizon_or_init(&self, tenant_id: &str, default_year: i32) -> Result<HorizonRecord> {
        {
            let data = self.data.read().await;
            if let Some(record) = data.horizons.get(tenant_id) {
                return Ok(record.clone());
            }
        }

        let mut data = self.data.write().await;
        let record = data
            .horizons
            .entry(tenant_id.to_string())
            .or_insert_with(|| HorizonRecord {
                tenant_id: tenant_id.to_string(),
                year: default_year,
                version: 0,
            })
            .clone();
        drop(data);

        self.persist().await?;
        Ok(record)
    }

    async fn advance_horizon(
        &self,
        tenant_id: &str,
        expected_version: u64,
        target_year: i32,
    ) -> Result<HorizonRecord> {
        let mut data = self.data.write().await;

        let record = data
            .horizons
            .get_mut(tenant_id)
            .ok_or_else(|| StorageError::NotFound(format!("horizon for tenant {tenant_id}")))?;

        if record.version != expected_version {
            return Err(StorageError::VersionConflict {
                tenant: tenant_id.to_string(),
                expected: expected_version,
                found: record.version,
            }
            .into());
        }

        if target_year <= record.year {
            return Ok(record.clone());
        }

        record.year = target_year;
        record.version += 1;
        let updated = record.clone();
        drop(data);

        self.persist().await?;
        Ok(updated)
    }
}

// ============================================================================
// Persistence Data Structure
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct PersistenceData {
    version: u32,
    events: Vec<AnniversaryEvent>,
    horizons: Vec<HorizonRecord>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anniversaries::types::EventDraft;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn solar(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(tenant: &str, name: &str, date: NaiveDate) -> AnniversaryEvent {
        AnniversaryEvent::from_draft(tenant, EventDraft::new(name, date))
    }

    #[tokio::test]
    async fn test_put_and_get_event() {
        let store = EmbeddedEventStore::new();
        let created = store
            .put_event(event("cohen", "Birthday", solar(1990, 3, 10)))
            .await
            .unwrap();

        let fetched = store.get_event("cohen", &created.id).await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().name, "Birthday");
    }

    #[tokio::test]
    async fn test_tenant_isolation() {
        let store = EmbeddedEventStore::new();
        let created = store
            .put_event(event("cohen", "Birthday", solar(1990, 3, 10)))
            .await
            .unwrap();

        assert!(store.get_event("levi", &created.id).await.unwrap().is_none());
        assert!(!store.delete_event("levi", &created.id).await.unwrap());
        assert!(store.get_event("cohen", &created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_event() {
        let store = EmbeddedEventStore::new();
        let created = store
            .put_event(event("cohen", "Birthday", solar(1990, 3, 10)))
            .await
            .unwrap();

        assert!(store.delete_event("cohen", &created.id).await.unwrap());
        assert!(store.get_event("cohen", &created.id).await.unwrap().is_none());
        assert!(!store.delete_event("cohen", &created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_events_in_month_filter() {
        let store = EmbeddedEventStore::new();
        store
            .put_event(event("cohen", "March", solar(1990, 3, 10)))
            .await
            .unwrap();
        store
            .put_event(event("cohen", "April", solar(1985, 4, 2)))
            .await
            .unwrap();
        store
            .put_event(event("levi", "Other tenant", solar(2000, 3, 5)))
            .await
            .unwrap();

        let march = store.events_in_month("cohen", 3).await.unwrap();
        assert_eq!(march.len(), 1);
        assert_eq!(march[0].name, "March");
    }

    #[tokio::test]
    async fn test_hebrew_annual_filter() {
        let store = EmbeddedEventStore::new();
        let hebrew = AnniversaryEvent::from_draft(
            "cohen",
            EventDraft::new("Hebrew", solar(2025, 8, 9)).hebrew_anchored(),
        );
        store.put_event(hebrew).await.unwrap();
        store
            .put_event(event("cohen", "Solar", solar(1990, 3, 10)))
            .await
            .unwrap();

        let results = store.hebrew_annual_events("cohen").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Hebrew");
    }

    #[tokio::test]
    async fn test_horizon_init_and_cas() {
        let store = EmbeddedEventStore::new();

        let record = store.horizon_or_init("cohen", 2026).await.unwrap();
        assert_eq!(record.year, 2026);
        assert_eq!(record.version, 0);

        // Re-init keeps the stored value even with a different default.
        let again = store.horizon_or_init("cohen", 2030).await.unwrap();
        assert_eq!(again.year, 2026);

        let advanced = store.advance_horizon("cohen", 0, 2028).await.unwrap();
        assert_eq!(advanced.year, 2028);
        assert_eq!(advanced.version, 1);

        // Advancing to a covered year is a no-op and does not bump the version.
        let noop = store.advance_horizon("cohen", 1, 2027).await.unwrap();
        assert_eq!(noop.year, 2028);
        assert_eq!(noop.version, 1);

        // Stale version is rejected.
        let conflict = store.advance_horizon("cohen", 0, 2035).await;
        assert!(matches!(
            conflict,
            Err(HearthError::Storage(StorageError::VersionConflict { .. }))
        ));
    }

    #[tokio::test]
    async fn test_batch_put() {
        let store = EmbeddedEventStore::new();
        let events = vec![
            event("cohen", "One", solar(1990, 3, 10)),
            event("cohen", "Two", solar(1991, 3, 11)),
        ];
        store.put_events_batch(events).await.unwrap();

        let march = store.events_in_month("cohen", 3).await.unwrap();
        assert_eq!(march.len(), 2);
    }

    #[tokio::test]
    async fn test_persistence() {
        let temp_dir = TempDir::new().unwrap();

        let id = {
            let store = EmbeddedEventStore::with_persistence(temp_dir.path())
                .await
                .unwrap();
            let created = store
                .put_event(event("cohen", "Persisted", solar(1990, 3, 10)))
                .await
                .unwrap();
            store.horizon_or_init("cohen", 2026).await.unwrap();
            created.id
        };

        let store = EmbeddedEventStore::with_persistence(temp_dir.path())
            .await
            .unwrap();
        let fetched = store.get_event("cohen", &id).await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().name, "Persisted");

        let horizon = store.horizon_or_init("cohen", 1999).await.unwrap();
        assert_eq!(horizon.year, 2026);
    }
}
