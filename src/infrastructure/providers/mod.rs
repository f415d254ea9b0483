//! # Provider Channels
//!
//! Adapters for the four provider channels.
//!
//! ## Components
//!
//! - [`ProviderAdapter`]: port every channel implements
//! - [`ProviderRegistry`]: enum-keyed adapter lookup
//! - [`AssessorAdapter`]: local catalog-backed channel
//! - [`HttpProviderAdapter`]: JSON-over-HTTP external channel

pub mod assessor;
pub mod error;
pub mod http_client;
pub mod registry;
pub mod traits;

pub use assessor::{AssessorAdapter, AssessorTerms};
pub use error::{ProviderError, ProviderResult};
pub use http_client::HttpProviderAdapter;
pub use registry::ProviderRegistry;
pub use traits::{ProviderAdapter, ProviderRequest};
