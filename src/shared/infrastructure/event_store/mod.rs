// Storage port for the event log.
//
// Purpose
// - Describe the two capabilities the append protocol needs from a durable store:
//   write one keyed record, and read the highest version recorded for a stream.
//
// Boundaries
// - No concrete input or output here. Backends live next to this file.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("version {version} already exists in stream {stream_id}")]
    VersionExists { stream_id: String, version: i64 },

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// One persisted event, keyed by `(stream_id, version)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub stream_id: String,
    pub version: i64,
    pub event_type: String,
    pub data: String,
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Highest version recorded for `stream_id`, or `None` for an unknown stream.
    ///
    /// Implementations must read with strong consistency: a replica read that misses
    /// the latest write would hand out the same version twice.
    async fn latest_version(&self, stream_id: &str) -> Result<Option<i64>, EventStoreError>;

    /// Write a single record. Fails with [`EventStoreError::VersionExists`] when the
    /// key is already taken, so a second writer outside this process cannot overwrite it.
    async fn put(&self, record: &EventRecord) -> Result<(), EventStoreError>;
}

#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod in_memory;
