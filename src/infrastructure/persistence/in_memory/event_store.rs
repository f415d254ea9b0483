//! # In-Memory Event Store
//!
//! Append-only [`EventStore`] backed by a vector.

use crate::domain::events::{EventType, RequestEvent};
use crate::domain::value_objects::{QuoteRequestId, Timestamp};
use crate::infrastructure::persistence::event_store::{EventStore, StoredEvent};
use crate::infrastructure::persistence::traits::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe append-only event log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<StoredEvent>>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered(&self, keep: impl Fn(&StoredEvent) -> bool) -> Vec<StoredEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| keep(e))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, events: &[RequestEvent]) -> RepositoryResult<()> {
        let stored = events
            .iter()
            .map(StoredEvent::from_event)
            .collect::<RepositoryResult<Vec<_>>>()?;

        let mut log = self.events.write().await;
        if let Some(dup) = stored
            .iter()
            .find(|s| log.iter().any(|e| e.event_id == s.event_id))
        {
            return Err(RepositoryError::duplicate("Event", dup.event_id.to_string()));
        }
        let mut next = log.last().map_or(1, |e| e.sequence.saturating_add(1));
        for mut event in stored {
            event.sequence = next;
            next = next.saturating_add(1);
            log.push(event);
        }
        Ok(())
    }

    async fn get_events(&self, request_id: QuoteRequestId) -> RepositoryResult<Vec<StoredEvent>> {
        Ok(self.filtered(|e| e.request_id == request_id).await)
    }

    async fn get_events_since(&self, since: Timestamp) -> RepositoryResult<Vec<StoredEvent>> {
        Ok(self.filtered(|e| e.timestamp.is_after(&since)).await)
    }

    async fn get_events_by_type(
        &self,
        event_type: EventType,
    ) -> RepositoryResult<Vec<StoredEvent>> {
        Ok(self.filtered(|e| e.event_type == event_type).await)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.events.read().await.len() as u64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::events::{ProviderUnreachable, RequestSent};
    use crate::domain::value_objects::ProviderType;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs).unwrap()
    }

    #[tokio::test]
    async fn append_assigns_sequence_and_filters() {
        let store = InMemoryEventStore::new();
        let id = QuoteRequestId::new_v4();
        let other = QuoteRequestId::new_v4();
        store
            .append(&[
                RequestEvent::Sent(RequestSent::new(id, ts(100))),
                RequestEvent::ProviderUnreachable(ProviderUnreachable::new(
                    id,
                    ProviderType::Dealer,
                    "timeout",
                    ts(200),
                )),
            ])
            .await
            .unwrap();
        store
            .append(&[RequestEvent::Sent(RequestSent::new(other, ts(300)))])
            .await
            .unwrap();

        let events = store.get_events(id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].sequence, 2);
        assert_eq!(events[1].event_name, "ProviderUnreachable");
        assert_eq!(store.count().await.unwrap(), 3);
        assert_eq!(store.get_events_since(ts(150)).await.unwrap().len(), 2);
        assert_eq!(
            store.get_events_by_type(EventType::Provider).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn payload_round_trips_to_event() {
        let store = InMemoryEventStore::new();
        let event = RequestEvent::Sent(RequestSent::new(QuoteRequestId::new_v4(), ts(10)));
        store.append(std::slice::from_ref(&event)).await.unwrap();
        let stored = store.get_events_since(ts(0)).await.unwrap();
        assert_eq!(stored[0].to_event().unwrap(), event);
    }

    #[tokio::test]
    async fn duplicate_event_is_rejected() {
        let store = InMemoryEventStore::new();
        let event = RequestEvent::Sent(RequestSent::new(QuoteRequestId::new_v4(), ts(10)));
        store.append(std::slice::from_ref(&event)).await.unwrap();
        let err = store.append(&[event]).await.unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
