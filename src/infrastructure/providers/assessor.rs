//! # Assessor Channel
//!
//! The internal, deterministic provider channel.
//!
//! Prices a part from the injected [`PricingCatalog`]:
//!
//! - part cost from the catalog lookup
//! - labor = hours x labor rate
//! - paint = 15% of the part cost for body parts
//! - completion = delivery + ceil(hours / 8) days
//!
//! The assessor never performs I/O. It fails only when a cost leaves the
//! decimal range.

use crate::domain::entities::QuoteSubmission;
use crate::domain::value_objects::arithmetic::{ArithmeticError, CheckedArithmetic, checked_sum};
use crate::domain::value_objects::{ProviderType, QualityTier};
use crate::infrastructure::pricing::PricingCatalog;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::traits::{ProviderAdapter, ProviderRequest};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use std::time::Duration;

/// Paint cost as a fraction of the part cost, for body parts.
pub const PAINT_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Confidence attached to assessor quotes.
pub const ASSESSOR_CONFIDENCE: u8 = 85;

/// Warranty attached to assessor quotes.
pub const ASSESSOR_WARRANTY_MONTHS: u32 = 12;

/// Delivery estimate attached to assessor quotes.
pub const ASSESSOR_DELIVERY_DAYS: u32 = 2;

/// Labor hours per working day.
pub const HOURS_PER_DAY: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Display name of the channel.
pub const ASSESSOR_NAME: &str = "Internal Assessor";

/// Terms applied to every assessor quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessorTerms {
    /// Labor rate per hour.
    pub labor_rate: Decimal,
    /// Days a quote stays valid.
    pub quote_validity_days: u32,
}

impl Default for AssessorTerms {
    fn default() -> Self {
        Self {
            labor_rate: Decimal::new(45, 0),
            quote_validity_days: 30,
        }
    }
}

/// Catalog-backed assessor adapter.
#[derive(Debug, Clone)]
pub struct AssessorAdapter {
    catalog: Arc<PricingCatalog>,
    terms: AssessorTerms,
}

impl AssessorAdapter {
    /// Creates an adapter over a catalog.
    #[must_use]
    pub fn new(catalog: Arc<PricingCatalog>, terms: AssessorTerms) -> Self {
        Self { catalog, terms }
    }

    /// Catalog in use.
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &PricingCatalog {
        &self.catalog
    }

    /// Prices a request.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if a cost falls outside the decimal range.
    pub fn price(&self, request: &ProviderRequest) -> ProviderResult<QuoteSubmission> {
        let price = self
            .catalog
            .lookup(&request.make, request.category, &request.part_name);
        let hours = request.labor_hours.max(Decimal::ZERO);
        let part_cost = price.amount.round_dp(2);
        let labor_cost = hours
            .safe_mul(self.terms.labor_rate)
            .map_err(|e| out_of_range("labor cost", e))?
            .round_dp(2);
        let paint_cost = if request.category.requires_paint() {
            part_cost
                .safe_mul(PAINT_RATE)
                .map_err(|e| out_of_range("paint cost", e))?
                .round_dp(2)
        } else {
            Decimal::ZERO
        };
        let total_cost = checked_sum([part_cost, labor_cost, paint_cost])
            .map_err(|e| out_of_range("total cost", e))?;
        let repair_days = hours
            .safe_div(HOURS_PER_DAY)
            .map_err(|e| out_of_range("repair days", e))?
            .ceil()
            .to_u32()
            .unwrap_or(u32::MAX);

        tracing::debug!(
            request_id = %request.request_id,
            part_name = %request.part_name,
            source = ?price.source,
            %part_cost,
            "assessor priced part"
        );

        Ok(QuoteSubmission {
            request_id: request.request_id,
            provider_name: ASSESSOR_NAME.to_string(),
            part_cost,
            labor_cost,
            paint_cost,
            additional_cost: Decimal::ZERO,
            total_cost,
            quality_tier: QualityTier::OemEquivalent,
            warranty_months: ASSESSOR_WARRANTY_MONTHS,
            delivery_days: ASSESSOR_DELIVERY_DAYS,
            completion_days: ASSESSOR_DELIVERY_DAYS.saturating_add(repair_days),
            confidence: ASSESSOR_CONFIDENCE,
            valid_until: request
                .issued_at
                .add_days(i64::from(self.terms.quote_validity_days)),
        })
    }
}

fn out_of_range(what: &str, error: ArithmeticError) -> ProviderError {
    ProviderError::internal(format!("assessor {what}: {error}"))
}

#[async_trait]
impl ProviderAdapter for AssessorAdapter {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Assessor
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn submit(&self, request: &ProviderRequest) -> ProviderResult<QuoteSubmission> {
        self.price(request)
    }

    fn is_local(&self) -> bool {
        true
    }
}
