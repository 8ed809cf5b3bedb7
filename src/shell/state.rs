use crate::modules::streams::use_cases::append_event::handler::AppendEventHandler;
use crate::shared::infrastructure::event_store::EventStore;
use crate::shared::infrastructure::event_store::in_memory::InMemoryEventStore;
use crate::shared::infrastructure::stream_locks::LockRegistry;
use crate::shell::config::{Config, ConfigError, StoreBackend};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Process-wide context handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub append_handler: Arc<AppendEventHandler<dyn EventStore>>,
    pub locks: Arc<LockRegistry>,
}

impl AppState {
    pub async fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let event_store = event_store_for(&config.backend).await?;
        Ok(Self::build(event_store, config.lock_timeout))
    }

    pub fn new(event_store: Arc<dyn EventStore>) -> Self {
        Self::build(event_store, None)
    }

    pub fn build(event_store: Arc<dyn EventStore>, lock_timeout: Option<Duration>) -> Self {
        let locks = Arc::new(LockRegistry::new());
        let handler = AppendEventHandler::new(event_store, locks.clone());
        let handler = match lock_timeout {
            Some(timeout) => handler.with_lock_timeout(timeout),
            None => handler,
        };
        Self {
            append_handler: Arc::new(handler),
            locks,
        }
    }

    /// Drop the locks of idle streams every `period` until the returned task is aborted.
    pub fn spawn_lock_eviction(&self, period: Duration) -> JoinHandle<()> {
        let locks = self.locks.clone();
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let evicted = locks.evict_idle();
                if evicted > 0 {
                    tracing::debug!(evicted, remaining = locks.len(), "evicted idle stream locks");
                }
            }
        })
    }
}

async fn event_store_for(backend: &StoreBackend) -> Result<Arc<dyn EventStore>, ConfigError> {
    match backend {
        StoreBackend::InMemory => {
            tracing::warn!("using the in-memory event store, events are lost on restart");
            Ok(Arc::new(InMemoryEventStore::new()))
        }
        #[cfg(feature = "dynamodb")]
        StoreBackend::DynamoDb { table, region } => {
            use crate::shared::infrastructure::event_store::dynamodb::DynamoDbEventStore;
            tracing::info!(table = %table, region = %region, "using the DynamoDB event store");
            Ok(Arc::new(
                DynamoDbEventStore::connect(region.clone(), table.clone()).await,
            ))
        }
        #[cfg(not(feature = "dynamodb"))]
        StoreBackend::DynamoDb { .. } => Err(ConfigError::Invalid {
            name: "EVENT_STORE_BACKEND",
            value: "dynamodb (built without the `dynamodb` feature)".into(),
        }),
    }
}
