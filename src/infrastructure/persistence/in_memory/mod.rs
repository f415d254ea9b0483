//! # In-Memory Repositories
//!
//! In-memory implementations of every persistence port.
//!
//! ## Available Repositories
//!
//! - [`InMemoryDamagedPartRepository`]: damaged parts
//! - [`InMemoryQuoteRequestRepository`]: quote requests
//! - [`InMemoryQuoteRepository`]: quotes
//! - [`InMemoryEventStore`]: request event log
//!
//! ## Thread Safety
//!
//! All implementations use `Arc<tokio::sync::RwLock<_>>` for thread-safe
//! access; clones share the same storage.

pub mod event_store;
pub mod part_repository;
pub mod quote_repository;
pub mod request_repository;

pub use event_store::InMemoryEventStore;
pub use part_repository::InMemoryDamagedPartRepository;
pub use quote_repository::InMemoryQuoteRepository;
pub use request_repository::InMemoryQuoteRequestRepository;
