//! # Domain Event Trait
//!
//! Base trait for all domain events.
//!
//! This module provides the [`DomainEvent`] trait that all domain events
//! must implement, along with common event metadata.

use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{EventId, QuoteRequestId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of domain event.
///
/// Categorizes events by their domain area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Quote request lifecycle events.
    Request,
    /// Provider channel outcomes.
    Provider,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => write!(f, "REQUEST"),
            Self::Provider => write!(f, "PROVIDER"),
        }
    }
}

/// Trait for all domain events.
///
/// Domain events are immutable records of what happened to a quote
/// request. They form the audit trail kept by the event store.
pub trait DomainEvent: Send + Sync + fmt::Debug {
    /// Returns the unique identifier for this event.
    fn event_id(&self) -> EventId;

    /// Returns the quote request this event relates to.
    fn request_id(&self) -> QuoteRequestId;

    /// Returns when this event occurred.
    fn timestamp(&self) -> Timestamp;

    /// Returns the type/category of this event.
    fn event_type(&self) -> EventType;

    /// Returns the human-readable name of this event.
    fn event_name(&self) -> &'static str;
}

/// Common metadata for all domain events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique identifier for this event.
    pub event_id: EventId,
    /// The quote request this event relates to.
    pub request_id: QuoteRequestId,
    /// When this event occurred.
    pub timestamp: Timestamp,
}

impl EventMetadata {
    /// Creates metadata for a request at the given instant.
    #[must_use]
    pub fn at(request_id: QuoteRequestId, timestamp: Timestamp) -> Self {
        Self {
            event_id: EventId::new_v4(),
            request_id,
            timestamp,
        }
    }

    /// Creates event metadata with specific values (for reconstruction).
    #[must_use]
    pub fn from_parts(event_id: EventId, request_id: QuoteRequestId, timestamp: Timestamp) -> Self {
        Self {
            event_id,
            request_id,
            timestamp,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn event_type_display() {
        assert_eq!(EventType::Request.to_string(), "REQUEST");
        assert_eq!(EventType::Provider.to_string(), "PROVIDER");
    }

    #[test]
    fn metadata_keeps_timestamp() {
        let ts = Timestamp::from_secs(1_700_000_000).unwrap();
        let id = QuoteRequestId::new_v4();
        let metadata = EventMetadata::at(id, ts);
        assert_eq!(metadata.request_id, id);
        assert_eq!(metadata.timestamp, ts);
    }

    #[test]
    fn metadata_serde_roundtrip() {
        let metadata = EventMetadata::at(QuoteRequestId::new_v4(), Timestamp::now());
        let json = serde_json::to_string(&metadata).unwrap();
        let deserialized: EventMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(metadata, deserialized);
    }
}
