//! # Persistence Layer
//!
//! Repository ports and the event store.
//!
//! ## Repository Traits (Ports)
//!
//! - [`DamagedPartRepository`]: aggregated parts
//! - [`QuoteRequestRepository`]: quote requests
//! - [`QuoteRepository`]: quotes keyed by (request, provider)
//! - [`EventStore`]: append-only request event log
//!
//! ## Implementations
//!
//! - `in_memory`: in-process implementations

pub mod event_store;
pub mod in_memory;
pub mod traits;

pub use event_store::{EventStore, StoredEvent};
pub use traits::{
    DamagedPartRepository, QuoteRepository, QuoteRequestRepository, RepositoryError,
    RepositoryResult,
};
