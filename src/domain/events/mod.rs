//! # Domain Events
//!
//! Events emitted during quote request processing, kept as an audit trail.
//!
//! - [`RequestCreated`]: New request for a damaged part
//! - [`RequestSent`]: Request dispatched to providers
//! - [`ProviderResponded`]: A provider quote was accepted
//! - [`ProviderUnreachable`]: A provider failed, timed out or sent an invalid quote
//! - [`RequestReceived`]: Every selected provider resolved
//! - [`RequestExpired`]: Deadline passed with open providers
//! - [`RequestCancelled`]: Request cancelled

pub mod domain_event;
pub mod request_events;

pub use domain_event::{DomainEvent, EventMetadata, EventType};
pub use request_events::{
    ProviderResponded, ProviderUnreachable, RequestCancelled, RequestCreated, RequestEvent,
    RequestExpired, RequestReceived, RequestSent,
};
