//! # Quote Request Events
//!
//! Domain events for the quote request lifecycle.
//!
//! # Event Flow
//!
//! ```text
//! RequestCreated -> RequestSent -> (ProviderResponded | ProviderUnreachable)*
//!                -> RequestReceived | RequestExpired
//!
//! At any non-terminal point: RequestCancelled
//! ```

use crate::domain::events::domain_event::{DomainEvent, EventMetadata, EventType};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    DamagedPartId, EventId, ProviderSelection, ProviderType, QuoteRequestId, RequestState,
};
use serde::{Deserialize, Serialize};

macro_rules! impl_domain_event {
    ($ty:ty, $kind:expr, $name:literal) => {
        impl DomainEvent for $ty {
            fn event_id(&self) -> EventId {
                self.metadata.event_id
            }

            fn request_id(&self) -> QuoteRequestId {
                self.metadata.request_id
            }

            fn timestamp(&self) -> Timestamp {
                self.metadata.timestamp
            }

            fn event_type(&self) -> EventType {
                $kind
            }

            fn event_name(&self) -> &'static str {
                $name
            }
        }
    };
}

/// Event emitted when a quote request is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCreated {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The damaged part being quoted.
    pub part_id: DamagedPartId,
    /// Providers targeted.
    pub providers: ProviderSelection,
    /// Expiry deadline.
    pub expires_at: Timestamp,
}

impl RequestCreated {
    /// Creates a new RequestCreated event.
    #[must_use]
    pub fn new(
        request_id: QuoteRequestId,
        part_id: DamagedPartId,
        providers: ProviderSelection,
        expires_at: Timestamp,
        at: Timestamp,
    ) -> Self {
        Self {
            metadata: EventMetadata::at(request_id, at),
            part_id,
            providers,
            expires_at,
        }
    }
}

impl_domain_event!(RequestCreated, EventType::Request, "RequestCreated");

/// Event emitted when the request leaves `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSent {
    /// Event metadata.
    pub metadata: EventMetadata,
}

impl RequestSent {
    /// Creates a new RequestSent event.
    #[must_use]
    pub fn new(request_id: QuoteRequestId, at: Timestamp) -> Self {
        Self {
            metadata: EventMetadata::at(request_id, at),
        }
    }
}

impl_domain_event!(RequestSent, EventType::Request, "RequestSent");

/// Event emitted when a provider's quote is accepted into the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResponded {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The responding provider.
    pub provider: ProviderType,
    /// True if this replaced an earlier response.
    pub is_update: bool,
}

impl ProviderResponded {
    /// Creates a new ProviderResponded event.
    #[must_use]
    pub fn new(
        request_id: QuoteRequestId,
        provider: ProviderType,
        is_update: bool,
        at: Timestamp,
    ) -> Self {
        Self {
            metadata: EventMetadata::at(request_id, at),
            provider,
            is_update,
        }
    }
}

impl_domain_event!(ProviderResponded, EventType::Provider, "ProviderResponded");

/// Event emitted when a provider is marked unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUnreachable {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The failing provider.
    pub provider: ProviderType,
    /// Why the provider could not be used.
    pub reason: String,
}

impl ProviderUnreachable {
    /// Creates a new ProviderUnreachable event.
    #[must_use]
    pub fn new(
        request_id: QuoteRequestId,
        provider: ProviderType,
        reason: impl Into<String>,
        at: Timestamp,
    ) -> Self {
        Self {
            metadata: EventMetadata::at(request_id, at),
            provider,
            reason: reason.into(),
        }
    }
}

impl_domain_event!(
    ProviderUnreachable,
    EventType::Provider,
    "ProviderUnreachable"
);

/// Event emitted when every selected provider is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestReceived {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Number of providers that responded.
    pub responded: usize,
    /// Number of providers marked unreachable.
    pub unreachable: usize,
}

impl RequestReceived {
    /// Creates a new RequestReceived event.
    #[must_use]
    pub fn new(
        request_id: QuoteRequestId,
        responded: usize,
        unreachable: usize,
        at: Timestamp,
    ) -> Self {
        Self {
            metadata: EventMetadata::at(request_id, at),
            responded,
            unreachable,
        }
    }
}

impl_domain_event!(RequestReceived, EventType::Request, "RequestReceived");

/// Event emitted when the deadline passes with providers still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestExpired {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Providers that never resolved.
    pub open_providers: Vec<ProviderType>,
}

impl RequestExpired {
    /// Creates a new RequestExpired event.
    #[must_use]
    pub fn new(
        request_id: QuoteRequestId,
        open_providers: Vec<ProviderType>,
        at: Timestamp,
    ) -> Self {
        Self {
            metadata: EventMetadata::at(request_id, at),
            open_providers,
        }
    }
}

impl_domain_event!(RequestExpired, EventType::Request, "RequestExpired");

/// Event emitted when the assessor cancels the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCancelled {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// State the request was in.
    pub previous_state: RequestState,
}

impl RequestCancelled {
    /// Creates a new RequestCancelled event.
    #[must_use]
    pub fn new(request_id: QuoteRequestId, previous_state: RequestState, at: Timestamp) -> Self {
        Self {
            metadata: EventMetadata::at(request_id, at),
            previous_state,
        }
    }
}

impl_domain_event!(RequestCancelled, EventType::Request, "RequestCancelled");

/// Union of all quote request events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RequestEvent {
    /// Request was created.
    Created(RequestCreated),
    /// Request was sent to providers.
    Sent(RequestSent),
    /// A provider responded.
    ProviderResponded(ProviderResponded),
    /// A provider was marked unreachable.
    ProviderUnreachable(ProviderUnreachable),
    /// Every provider resolved.
    Received(RequestReceived),
    /// Deadline passed with open providers.
    Expired(RequestExpired),
    /// Request was cancelled.
    Cancelled(RequestCancelled),
}

impl RequestEvent {
    fn inner(&self) -> &dyn DomainEvent {
        match self {
            Self::Created(e) => e,
            Self::Sent(e) => e,
            Self::ProviderResponded(e) => e,
            Self::ProviderUnreachable(e) => e,
            Self::Received(e) => e,
            Self::Expired(e) => e,
            Self::Cancelled(e) => e,
        }
    }
}

impl DomainEvent for RequestEvent {
    fn event_id(&self) -> EventId {
        self.inner().event_id()
    }

    fn request_id(&self) -> QuoteRequestId {
        self.inner().request_id()
    }

    fn timestamp(&self) -> Timestamp {
        self.inner().timestamp()
    }

    fn event_type(&self) -> EventType {
        self.inner().event_type()
    }

    fn event_name(&self) -> &'static str {
        self.inner().event_name()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn union_delegates_to_inner_event() {
        let id = QuoteRequestId::new_v4();
        let event = RequestEvent::ProviderUnreachable(ProviderUnreachable::new(
            id,
            ProviderType::Dealer,
            "timeout",
            Timestamp::now(),
        ));
        assert_eq!(event.request_id(), id);
        assert_eq!(event.event_type(), EventType::Provider);
        assert_eq!(event.event_name(), "ProviderUnreachable");
    }

    #[test]
    fn serde_is_tagged() {
        let event = RequestEvent::Sent(RequestSent::new(QuoteRequestId::new_v4(), Timestamp::now()));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"sent\""));
        let back: RequestEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
