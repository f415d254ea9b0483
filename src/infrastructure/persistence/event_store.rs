//! # Event Store
//!
//! Append-only audit trail of quote request events.
//!
//! Events are stored with a JSON payload and a store-wide sequence number,
//! so the full lifecycle of a request can be replayed in order.

use crate::domain::events::{DomainEvent, EventType, RequestEvent};
use crate::domain::value_objects::{EventId, QuoteRequestId, Timestamp};
use crate::infrastructure::persistence::traits::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A persisted domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Event id.
    pub event_id: EventId,
    /// Request the event belongs to.
    pub request_id: QuoteRequestId,
    /// Event category.
    pub event_type: EventType,
    /// Event name.
    pub event_name: String,
    /// When the event happened.
    pub timestamp: Timestamp,
    /// Serialized event.
    pub payload: serde_json::Value,
    /// Position in the store, assigned on append.
    pub sequence: u64,
}

impl StoredEvent {
    /// Serializes an event; the sequence is assigned by the store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Serialization` if the event cannot be
    /// serialized.
    pub fn from_event(event: &RequestEvent) -> RepositoryResult<Self> {
        let payload = serde_json::to_value(event)
            .map_err(|e| RepositoryError::serialization(e.to_string()))?;
        Ok(Self {
            event_id: event.event_id(),
            request_id: event.request_id(),
            event_type: event.event_type(),
            event_name: event.event_name().to_string(),
            timestamp: event.timestamp(),
            payload,
            sequence: 0,
        })
    }

    /// Deserializes the payload back into an event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Serialization` if the payload is not a
    /// request event.
    pub fn to_event(&self) -> RepositoryResult<RequestEvent> {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| RepositoryError::serialization(e.to_string()))
    }
}

/// Append-only event storage.
#[async_trait]
pub trait EventStore: Send + Sync + fmt::Debug {
    /// Appends events in order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if an event id is already stored.
    async fn append(&self, events: &[RequestEvent]) -> RepositoryResult<()>;

    /// Events of one request, in sequence order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn get_events(&self, request_id: QuoteRequestId) -> RepositoryResult<Vec<StoredEvent>>;

    /// Events strictly after `since`, in sequence order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn get_events_since(&self, since: Timestamp) -> RepositoryResult<Vec<StoredEvent>>;

    /// Events of one category, in sequence order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn get_events_by_type(&self, event_type: EventType)
    -> RepositoryResult<Vec<StoredEvent>>;

    /// Number of stored events.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn count(&self) -> RepositoryResult<u64>;
}
