use crate::modules::streams::core::events::NewEvent;
use crate::modules::streams::core::expected_version::ExpectedVersion;
use crate::modules::streams::use_cases::append_event::command::AppendEvent;
use crate::modules::streams::use_cases::append_event::decide::decide_version;
use crate::modules::streams::use_cases::append_event::decision::{DecideError, Decision};
use crate::modules::streams::use_cases::resolve_current_version::handler::VersionResolver;
use crate::shared::infrastructure::event_store::{EventStore, EventStoreError};
use crate::shared::infrastructure::stream_locks::{LockRegistry, StreamLock};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppendError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("The requested version is invalid. Current Version: {current_version}")]
    VersionConflict { current_version: i64 },

    #[error(transparent)]
    StoreUnavailable(EventStoreError),

    #[error("stream {stream_id} is busy, try again")]
    LockTimeout { stream_id: String },
}

impl From<DecideError> for AppendError {
    fn from(reason: DecideError) -> Self {
        match reason {
            DecideError::VersionConflict { current_version } => {
                AppendError::VersionConflict { current_version }
            }
            reason @ DecideError::VersionsExhausted { .. } => {
                AppendError::StoreUnavailable(EventStoreError::MalformedRecord(reason.to_string()))
            }
        }
    }
}

impl From<EventStoreError> for AppendError {
    fn from(err: EventStoreError) -> Self {
        AppendError::StoreUnavailable(err)
    }
}

/// A taken version means another process won the race. Only a writer that named the
/// version asked for a conflict check; for a next-in-sequence append it is a store failure.
fn write_failure(err: EventStoreError, expected: ExpectedVersion) -> AppendError {
    match (err, expected) {
        (EventStoreError::VersionExists { version, .. }, ExpectedVersion::Exact(_)) => {
            AppendError::VersionConflict {
                current_version: version,
            }
        }
        (err, _) => AppendError::StoreUnavailable(err),
    }
}

/// Appends events to streams, one writer per stream at a time.
pub struct AppendEventHandler<TEventStore>
where
    TEventStore: EventStore + ?Sized,
{
    event_store: Arc<TEventStore>,
    versions: VersionResolver<TEventStore>,
    locks: Arc<LockRegistry>,
    lock_timeout: Option<Duration>,
}

impl<TEventStore> AppendEventHandler<TEventStore>
where
    TEventStore: EventStore + ?Sized,
{
    pub fn new(event_store: Arc<TEventStore>, locks: Arc<LockRegistry>) -> Self {
        Self {
            versions: VersionResolver::new(event_store.clone()),
            event_store,
            locks,
            lock_timeout: None,
        }
    }

    /// Give up with [`AppendError::LockTimeout`] when the stream stays busy for longer
    /// than `timeout`.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    pub async fn handle(&self, command: AppendEvent) -> Result<i64, AppendError> {
        let AppendEvent {
            stream_id,
            expected_version,
            event,
        } = command;
        if stream_id.is_empty() {
            return Err(AppendError::InvalidInput("Invalid Stream ID".into()));
        }
        self.append(&stream_id, expected_version, event).await
    }

    /// Append `event` right after the current head of the stream.
    pub async fn append_next(&self, stream_id: &str, event: NewEvent) -> Result<i64, AppendError> {
        self.append(stream_id, ExpectedVersion::Next, event).await
    }

    /// Append `event` as `expected_version`, which must directly follow the current head.
    pub async fn append_at(
        &self,
        stream_id: &str,
        expected_version: i64,
        event: NewEvent,
    ) -> Result<i64, AppendError> {
        self.append(stream_id, ExpectedVersion::Exact(expected_version), event)
            .await
    }

    async fn append(
        &self,
        stream_id: &str,
        expected: ExpectedVersion,
        event: NewEvent,
    ) -> Result<i64, AppendError> {
        // Held until this function returns, whichever way it returns.
        let _lock = self.lock(stream_id).await?;
        tracing::debug!(stream_id, "lock obtained");

        let current_version = self.versions.current_version(stream_id).await?;

        let version = match decide_version(current_version, expected) {
            Decision::Accepted { version } => version,
            Decision::Rejected { reason } => {
                tracing::info!(stream_id, current_version, ?expected, %reason, "version rejected");
                return Err(reason.into());
            }
        };

        let record = event.into_record(stream_id, version);
        self.event_store.put(&record).await.map_err(|err| {
            tracing::warn!(stream_id, version, error = %err, "storing event failed");
            write_failure(err, expected)
        })?;

        tracing::info!(stream_id, version, "stored event");
        Ok(version)
    }

    async fn lock(&self, stream_id: &str) -> Result<StreamLock, AppendError> {
        match self.lock_timeout {
            None => Ok(self.locks.acquire(stream_id).await),
            Some(timeout) => self
                .locks
                .acquire_within(stream_id, timeout)
                .await
                .map_err(|err| {
                    tracing::warn!(stream_id, error = %err, "gave up waiting for stream lock");
                    AppendError::LockTimeout {
                        stream_id: err.stream_id,
                    }
                }),
        }
    }
}
