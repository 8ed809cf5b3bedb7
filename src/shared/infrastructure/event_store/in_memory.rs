// In memory implementation of the EventStore port.
//
// Purpose
// - Support append handler tests and local development without a database.
//
// Responsibilities
// - Store records per stream, ordered by version.
// - Reject a write whose (stream, version) key is already taken.

use crate::shared::infrastructure::event_store::{EventRecord, EventStore, EventStoreError};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryEventStore {
    inner: RwLock<HashMap<String, BTreeMap<i64, EventRecord>>>,
    is_offline: AtomicBool,
    is_read_only: AtomicBool,
    delay_put_ms: AtomicU64,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and writes fail with a backend error while offline.
    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    /// Writes fail with a backend error while read only; reads keep working.
    pub fn toggle_read_only(&self) {
        self.is_read_only.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn set_delay_put_ms(&self, ms: u64) {
        self.delay_put_ms.store(ms, Ordering::SeqCst);
    }

    /// Recorded events of a stream in version order.
    pub async fn events(&self, stream_id: &str) -> Vec<EventRecord> {
        self.inner
            .read()
            .await
            .get(stream_id)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    fn ensure_online(&self) -> Result<(), EventStoreError> {
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(EventStoreError::Backend("Event store offline".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventStore for InMemoryEventStore {
    async fn latest_version(&self, stream_id: &str) -> Result<Option<i64>, EventStoreError> {
        self.ensure_online()?;
        let guard = self.inner.read().await;
        Ok(guard
            .get(stream_id)
            .and_then(|records| records.keys().next_back().copied()))
    }

    async fn put(&self, record: &EventRecord) -> Result<(), EventStoreError> {
        let delay = self.delay_put_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        self.ensure_online()?;
        if self.is_read_only.load(Ordering::SeqCst) {
            return Err(EventStoreError::Backend("Event store is read only".into()));
        }

        let mut guard = self.inner.write().await;
        let records = guard.entry(record.stream_id.clone()).or_default();
        if records.contains_key(&record.version) {
            return Err(EventStoreError::VersionExists {
                stream_id: record.stream_id.clone(),
                version: record.version,
            });
        }
        records.insert(record.version, record.clone());
        Ok(())
    }
}
