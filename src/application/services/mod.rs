//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! - [`QuoteRequestManager`]: quote request lifecycle and event recording
//! - [`ProviderDispatcher`]: concurrent provider fan-out and quote ingestion
//! - [`RecommendationEngine`]: quote ranking and provider recommendation

pub mod provider_dispatch;
pub mod quote_request_manager;
pub mod recommendation_engine;

pub use provider_dispatch::{
    DispatchConfig, DispatchOutcome, DispatchSummary, DispatchUpdate, NO_ADAPTER_REASON,
    ProviderDispatcher,
};
pub use quote_request_manager::{DEFAULT_EXPIRY_DAYS, QuoteRequestManager};
pub use recommendation_engine::{
    RecommendationEngine, RecommendationError, RecommendationResult,
};
