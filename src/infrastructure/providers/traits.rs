//! # Provider Adapter Trait
//!
//! Port definition for provider channel integrations.
//!
//! Every channel (assessor, dealer, independent, network) is reached through
//! a [`ProviderAdapter`]. The wire format of a given provider is an adapter
//! detail; the dispatch layer only sees [`ProviderRequest`] going out and
//! [`QuoteSubmission`] coming back.
//!
//! # Examples
//!
//! ```ignore
//! use repair_quote::infrastructure::providers::traits::{ProviderAdapter, ProviderRequest};
//!
//! struct MyAdapter { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl ProviderAdapter for MyAdapter {
//!     // ... implement required methods
//! }
//! ```

use crate::domain::entities::{DamagedPart, QuoteRequest, QuoteSubmission};
use crate::domain::value_objects::{
    DamageSeverity, PartCategory, ProviderType, QuoteRequestId, Timestamp,
};
use crate::infrastructure::providers::error::ProviderResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Outbound payload describing the part to price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderRequest {
    /// Request being answered; echoed back in the submission.
    pub request_id: QuoteRequestId,
    /// Display name of the damaged part.
    pub part_name: String,
    /// Part category.
    pub category: PartCategory,
    /// Merged damage severity.
    pub severity: DamageSeverity,
    /// Estimated labor hours.
    pub labor_hours: Decimal,
    /// Vehicle make.
    pub make: String,
    /// Vehicle model.
    pub model: String,
    /// Vehicle model year.
    pub year: u16,
    /// Attributed damage description.
    pub damage_description: String,
    /// Whether the part must be replaced.
    pub requires_replacement: bool,
    /// Dispatch instant.
    pub issued_at: Timestamp,
}

impl ProviderRequest {
    /// Builds the payload for a request and its damaged part.
    #[must_use]
    pub fn new(request: &QuoteRequest, part: &DamagedPart, issued_at: Timestamp) -> Self {
        let vehicle = request.vehicle();
        Self {
            request_id: request.id(),
            part_name: part.part_name().to_string(),
            category: part.category(),
            severity: part.severity(),
            labor_hours: part.labor_hours(),
            make: vehicle.make().to_string(),
            model: vehicle.model().to_string(),
            year: vehicle.year(),
            damage_description: part.description().to_string(),
            requires_replacement: part.requires_replacement(),
            issued_at,
        }
    }
}

/// A provider channel integration.
///
/// Implementations must be cheap to share across tasks; the dispatcher
/// holds them behind `Arc`.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + fmt::Debug {
    /// Channel served by this adapter.
    fn provider_type(&self) -> ProviderType;

    /// Per-call timeout.
    fn timeout(&self) -> Duration;

    /// Requests a quote.
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` if the provider cannot be reached or answers
    /// with something other than a quote.
    async fn submit(&self, request: &ProviderRequest) -> ProviderResult<QuoteSubmission>;

    /// Returns true if the adapter answers locally without I/O.
    fn is_local(&self) -> bool {
        false
    }
}
