use crate::modules::streams::core::expected_version::NO_EVENTS;
use crate::shared::infrastructure::event_store::{EventStore, EventStoreError};
use std::sync::Arc;

/// Reads the highest version recorded for a stream.
pub struct VersionResolver<TEventStore>
where
    TEventStore: EventStore + ?Sized,
{
    event_store: Arc<TEventStore>,
}

impl<TEventStore> VersionResolver<TEventStore>
where
    TEventStore: EventStore + ?Sized,
{
    pub fn new(event_store: Arc<TEventStore>) -> Self {
        Self { event_store }
    }

    /// Current version of `stream_id`; 0 when nothing was ever written to it.
    ///
    /// A stored version below 1 cannot come from an append, so it is reported as a
    /// malformed record instead of being built upon.
    pub async fn current_version(&self, stream_id: &str) -> Result<i64, EventStoreError> {
        tracing::debug!(stream_id, "resolving current version");
        let version = self
            .event_store
            .latest_version(stream_id)
            .await
            .inspect_err(|err| tracing::warn!(stream_id, error = %err, "failed to read last version"))?
            .unwrap_or(NO_EVENTS);
        if version < NO_EVENTS {
            tracing::warn!(stream_id, version, "stored version is negative");
            return Err(EventStoreError::MalformedRecord(format!(
                "stream {stream_id} holds negative version {version}"
            )));
        }
        tracing::debug!(stream_id, version, "determined last version");
        Ok(version)
    }
}

#[cfg(test)]
mod version_resolver_tests {
    use super::*;
    use crate::shared::infrastructure::event_store::in_memory::InMemoryEventStore;
    use crate::tests::fixtures::records::make_event_record;
    use rstest::{fixture, rstest};

    #[fixture]
    fn before_each() -> (Arc<InMemoryEventStore>, VersionResolver<InMemoryEventStore>) {
        let store = Arc::new(InMemoryEventStore::new());
        let resolver = VersionResolver::new(store.clone());
        (store, resolver)
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_resolve_zero_for_an_empty_stream(
        before_each: (Arc<InMemoryEventStore>, VersionResolver<InMemoryEventStore>),
    ) {
        let (_, resolver) = before_each;
        assert_eq!(resolver.current_version("order-1").await.unwrap(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_resolve_the_same_version_twice_without_writes(
        before_each: (Arc<InMemoryEventStore>, VersionResolver<InMemoryEventStore>),
    ) {
        let (store, resolver) = before_each;
        for version in 1..=3 {
            store.put(&make_event_record("order-1", version)).await.unwrap();
        }

        let first = resolver.current_version("order-1").await.unwrap();
        let second = resolver.current_version("order-1").await.unwrap();

        assert_eq!(first, 3);
        assert_eq!(first, second);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_negative_stored_version(
        before_each: (Arc<InMemoryEventStore>, VersionResolver<InMemoryEventStore>),
    ) {
        let (store, resolver) = before_each;
        store.put(&make_event_record("order-1", -4)).await.unwrap();

        let result = resolver.current_version("order-1").await;

        assert!(matches!(result, Err(EventStoreError::MalformedRecord(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_if_the_event_store_is_offline(
        before_each: (Arc<InMemoryEventStore>, VersionResolver<InMemoryEventStore>),
    ) {
        let (store, resolver) = before_each;
        store.toggle_offline();
        let result = resolver.current_version("order-1").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            EventStoreError::Backend("Event store offline".into()).to_string()
        );
    }
}
