// Per-stream mutual exclusion for the append protocol.
//
// Responsibilities
// - Hand out one exclusive lock per stream id, created lazily on first use.
// - Keep "read current version, then write the next one" atomic for a stream
//   without ever blocking appends to other streams.
//
// Boundaries
// - In-process only. Writers in other processes are held off by the store's
//   conditional write, not by this registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("timed out after {waited:?} waiting for the lock on stream {stream_id}")]
pub struct LockTimeout {
    pub stream_id: String,
    pub waited: Duration,
}

/// Exclusive hold on one stream. Dropping it releases the stream.
#[derive(Debug)]
pub struct StreamLock {
    stream_id: String,
    _guard: OwnedMutexGuard<()>,
}

impl StreamLock {
    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }
}

#[derive(Debug, Default)]
pub struct LockRegistry {
    // The outer mutex only guards lookup and insertion and is never held across an await.
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, stream_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        match locks.get(stream_id) {
            Some(lock) => lock.clone(),
            None => {
                tracing::debug!(stream_id, "creating stream lock");
                let lock = Arc::new(AsyncMutex::new(()));
                locks.insert(stream_id.to_owned(), lock.clone());
                lock
            }
        }
    }

    /// Wait until the stream is free and take it.
    pub async fn acquire(&self, stream_id: &str) -> StreamLock {
        let guard = self.lock_for(stream_id).lock_owned().await;
        StreamLock {
            stream_id: stream_id.to_owned(),
            _guard: guard,
        }
    }

    /// Like [`acquire`](Self::acquire), but gives up once `timeout` elapses.
    ///
    /// Giving up only abandons the wait. The current holder keeps its lock and the
    /// waiter leaves no trace behind.
    pub async fn acquire_within(
        &self,
        stream_id: &str,
        timeout: Duration,
    ) -> Result<StreamLock, LockTimeout> {
        tokio::time::timeout(timeout, self.acquire(stream_id))
            .await
            .map_err(|_| LockTimeout {
                stream_id: stream_id.to_owned(),
                waited: timeout,
            })
    }

    /// Number of streams that currently own a lock entry.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the entries nobody holds or waits on. Returns how many were removed.
    ///
    /// An entry is only reachable through the map while the map mutex is held, so a
    /// reference count of one means no caller can be holding or awaiting it.
    pub fn evict_idle(&self) -> usize {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }
}
