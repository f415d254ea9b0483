//! # Quote Entity
//!
//! A single provider's priced response for one damaged part.
//!
//! Providers send a [`QuoteSubmission`], an untrusted payload with a
//! declared total. Validation turns it into a [`Quote`] whose total is
//! always recomputed from the itemized [`CostBreakdown`].
//!
//! # Examples
//!
//! ```
//! use repair_quote::domain::entities::quote::{CostBreakdown, QuoteBuilder};
//! use repair_quote::domain::value_objects::{
//!     DamagedPartId, Money, ProviderType, QuoteRequestId, Timestamp,
//! };
//!
//! let costs = CostBreakdown::new(Money::from(350), Money::from(90), Money::from(52), Money::zero());
//! let quote = QuoteBuilder::new(
//!     QuoteRequestId::new_v4(),
//!     DamagedPartId::new_v4(),
//!     ProviderType::Dealer,
//!     costs,
//!     Timestamp::now().add_days(30),
//! )
//! .build()
//! .unwrap();
//!
//! assert_eq!(quote.total_cost(), Money::from(492));
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::arithmetic::ArithmeticResult;
use crate::domain::value_objects::{
    DamagedPartId, Money, ProviderType, QualityTier, QuoteId, QuoteRequestId, QuoteStatus,
    Timestamp,
};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum difference tolerated between a declared and computed total.
pub const TOTAL_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum confidence score.
pub const MAX_CONFIDENCE: u8 = 100;

/// Itemized costs of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CostBreakdown {
    /// Part cost.
    pub part: Money,
    /// Labor cost.
    pub labor: Money,
    /// Paint cost.
    pub paint: Money,
    /// Miscellaneous costs.
    pub additional: Money,
}

impl CostBreakdown {
    /// Creates a cost breakdown.
    #[must_use]
    pub const fn new(part: Money, labor: Money, paint: Money, additional: Money) -> Self {
        Self {
            part,
            labor,
            paint,
            additional,
        }
    }

    /// Sum of the itemized costs.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` on overflow.
    pub fn total(&self) -> ArithmeticResult<Money> {
        Money::sum([self.part, self.labor, self.paint, self.additional])
    }
}

/// Raw quote payload returned by a provider channel.
///
/// Nothing in it is trusted until [`QuoteSubmission::validate`] passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuoteSubmission {
    /// Request the provider is answering.
    pub request_id: QuoteRequestId,
    /// Provider display name.
    pub provider_name: String,
    /// Part cost.
    pub part_cost: Decimal,
    /// Labor cost.
    pub labor_cost: Decimal,
    /// Paint cost.
    #[serde(default)]
    pub paint_cost: Decimal,
    /// Miscellaneous costs.
    #[serde(default)]
    pub additional_cost: Decimal,
    /// Total declared by the provider.
    pub total_cost: Decimal,
    /// Quality tier of the quoted part.
    pub quality_tier: QualityTier,
    /// Warranty duration in months.
    pub warranty_months: u32,
    /// Estimated delivery days.
    pub delivery_days: u32,
    /// Estimated completion days.
    pub completion_days: u32,
    /// Confidence score, 0-100.
    pub confidence: u8,
    /// Quote validity deadline.
    pub valid_until: Timestamp,
}

impl QuoteSubmission {
    /// Validates the payload against the originating request.
    ///
    /// Checks that every itemized cost is non-negative, the declared total
    /// matches the itemized sum within [`TOTAL_TOLERANCE`], confidence is at
    /// most 100, the validity deadline is after `as_of` and the request id
    /// matches.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidQuote` describing the first violation.
    pub fn validate(
        &self,
        expected_request: QuoteRequestId,
        as_of: Timestamp,
    ) -> DomainResult<CostBreakdown> {
        if self.request_id != expected_request {
            return Err(DomainError::invalid_quote(format!(
                "quote answers request {} instead of {}",
                self.request_id, expected_request
            )));
        }
        let item = |name: &str, value: Decimal| {
            Money::new(value)
                .map_err(|_| DomainError::invalid_quote(format!("{name} cost is negative: {value}")))
        };
        let costs = CostBreakdown::new(
            item("part", self.part_cost)?,
            item("labor", self.labor_cost)?,
            item("paint", self.paint_cost)?,
            item("additional", self.additional_cost)?,
        );
        let computed = costs.total()?;
        let mismatch = computed
            .get()
            .checked_sub(self.total_cost)
            .is_none_or(|diff| diff.abs() > TOTAL_TOLERANCE);
        if mismatch {
            return Err(DomainError::invalid_quote(format!(
                "declared total {} does not match itemized sum {}",
                self.total_cost, computed
            )));
        }
        if self.confidence > MAX_CONFIDENCE {
            return Err(DomainError::invalid_quote(format!(
                "confidence {} exceeds {MAX_CONFIDENCE}",
                self.confidence
            )));
        }
        if !self.valid_until.is_after(&as_of) {
            return Err(DomainError::invalid_quote(format!(
                "validity deadline {} is not in the future",
                self.valid_until
            )));
        }
        Ok(costs)
    }
}

/// A validated provider quote.
///
/// # Invariants
///
/// - `total_cost == part + labor + paint + additional`
/// - At most one non-expired quote per (request, provider)
/// - Never mutated once accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Quote {
    id: QuoteId,
    request_id: QuoteRequestId,
    part_id: DamagedPartId,
    provider_type: ProviderType,
    provider_name: String,
    costs: CostBreakdown,
    total_cost: Money,
    quality_tier: QualityTier,
    warranty_months: u32,
    delivery_days: u32,
    completion_days: u32,
    confidence: u8,
    valid_until: Timestamp,
    status: QuoteStatus,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Quote {
    /// Validates a submission and creates a submitted quote from it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidQuote` if the submission fails
    /// [`QuoteSubmission::validate`].
    pub fn from_submission(
        submission: &QuoteSubmission,
        request_id: QuoteRequestId,
        part_id: DamagedPartId,
        provider_type: ProviderType,
        now: Timestamp,
    ) -> DomainResult<Self> {
        let costs = submission.validate(request_id, now)?;
        QuoteBuilder::new(
            request_id,
            part_id,
            provider_type,
            costs,
            submission.valid_until,
        )
        .provider_name(submission.provider_name.clone())
        .quality_tier(submission.quality_tier)
        .warranty_months(submission.warranty_months)
        .delivery_days(submission.delivery_days)
        .completion_days(submission.completion_days)
        .confidence(submission.confidence)
        .created_at(now)
        .build()
    }

    /// Returns a builder for constructing a quote.
    #[must_use]
    pub fn builder(
        request_id: QuoteRequestId,
        part_id: DamagedPartId,
        provider_type: ProviderType,
        costs: CostBreakdown,
        valid_until: Timestamp,
    ) -> QuoteBuilder {
        QuoteBuilder::new(request_id, part_id, provider_type, costs, valid_until)
    }

    /// Replaces the priced content with a newer submission, keeping the id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::QuoteImmutable` if the quote is accepted and
    /// `DomainError::InvalidQuote` if the submission is invalid.
    pub fn resubmit(&mut self, submission: &QuoteSubmission, now: Timestamp) -> DomainResult<()> {
        self.ensure_mutable()?;
        let costs = submission.validate(self.request_id, now)?;
        self.total_cost = costs.total()?;
        self.costs = costs;
        self.provider_name = submission.provider_name.clone();
        self.quality_tier = submission.quality_tier;
        self.warranty_months = submission.warranty_months;
        self.delivery_days = submission.delivery_days;
        self.completion_days = submission.completion_days;
        self.confidence = submission.confidence;
        self.valid_until = submission.valid_until;
        self.status = QuoteStatus::Submitted;
        self.updated_at = now;
        Ok(())
    }

    fn ensure_mutable(&self) -> DomainResult<()> {
        if self.status == QuoteStatus::Accepted {
            return Err(DomainError::QuoteImmutable(self.id.to_string()));
        }
        Ok(())
    }

    /// Expires the quote if its validity deadline passed at `now`.
    ///
    /// Returns true if the status changed.
    pub fn expire_if_due(&mut self, now: Timestamp) -> bool {
        let open = matches!(self.status, QuoteStatus::Draft | QuoteStatus::Submitted);
        if !open || !self.valid_until.is_expired_at(now) {
            return false;
        }
        self.status = QuoteStatus::Expired;
        self.updated_at = now;
        true
    }

    /// Returns true if the quote counts for statistics at `as_of`:
    /// submitted and not past its validity deadline.
    #[must_use]
    pub fn is_valid_at(&self, as_of: Timestamp) -> bool {
        self.status == QuoteStatus::Submitted && !self.valid_until.is_expired_at(as_of)
    }

    // ========== Accessors ==========

    /// Returns the quote ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> QuoteId {
        self.id
    }

    /// Returns the request this quote answers.
    #[inline]
    #[must_use]
    pub fn request_id(&self) -> QuoteRequestId {
        self.request_id
    }

    /// Returns the damaged part quoted.
    #[inline]
    #[must_use]
    pub fn part_id(&self) -> DamagedPartId {
        self.part_id
    }

    /// Returns the provider channel.
    #[inline]
    #[must_use]
    pub fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    /// Returns the provider display name.
    #[inline]
    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// Returns the itemized costs.
    #[inline]
    #[must_use]
    pub fn costs(&self) -> &CostBreakdown {
        &self.costs
    }

    /// Returns the computed total.
    #[inline]
    #[must_use]
    pub fn total_cost(&self) -> Money {
        self.total_cost
    }

    /// Returns the quality tier.
    #[inline]
    #[must_use]
    pub fn quality_tier(&self) -> QualityTier {
        self.quality_tier
    }

    /// Returns the warranty in months.
    #[inline]
    #[must_use]
    pub fn warranty_months(&self) -> u32 {
        self.warranty_months
    }

    /// Returns the delivery estimate in days.
    #[inline]
    #[must_use]
    pub fn delivery_days(&self) -> u32 {
        self.delivery_days
    }

    /// Returns the completion estimate in days.
    #[inline]
    #[must_use]
    pub fn completion_days(&self) -> u32 {
        self.completion_days
    }

    /// Returns the confidence score.
    #[inline]
    #[must_use]
    pub fn confidence(&self) -> u8 {
        self.confidence
    }

    /// Returns the validity deadline.
    #[inline]
    #[must_use]
    pub fn valid_until(&self) -> Timestamp {
        self.valid_until
    }

    /// Returns the status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    /// Returns when the quote was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns when the quote was last updated.
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quote({} {} total={} status={})",
            self.provider_type, self.provider_name, self.total_cost, self.status
        )
    }
}

/// Builder for [`Quote`].
#[derive(Debug, Clone)]
#[must_use = "builders do nothing unless .build() is called"]
pub struct QuoteBuilder {
    request_id: QuoteRequestId,
    part_id: DamagedPartId,
    provider_type: ProviderType,
    costs: CostBreakdown,
    valid_until: Timestamp,
    id: Option<QuoteId>,
    provider_name: Option<String>,
    quality_tier: QualityTier,
    warranty_months: u32,
    delivery_days: u32,
    completion_days: u32,
    confidence: u8,
    status: QuoteStatus,
    created_at: Option<Timestamp>,
}

impl QuoteBuilder {
    /// Creates a builder with the required fields.
    pub fn new(
        request_id: QuoteRequestId,
        part_id: DamagedPartId,
        provider_type: ProviderType,
        costs: CostBreakdown,
        valid_until: Timestamp,
    ) -> Self {
        Self {
            request_id,
            part_id,
            provider_type,
            costs,
            valid_until,
            id: None,
            provider_name: None,
            quality_tier: QualityTier::OemEquivalent,
            warranty_months: 12,
            delivery_days: 0,
            completion_days: 0,
            confidence: 0,
            status: QuoteStatus::Submitted,
            created_at: None,
        }
    }

    /// Sets a fixed id (for reconstruction from storage).
    pub fn id(mut self, id: QuoteId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the provider display name; defaults to the provider type name.
    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = Some(name.into());
        self
    }

    /// Sets the quality tier.
    pub fn quality_tier(mut self, tier: QualityTier) -> Self {
        self.quality_tier = tier;
        self
    }

    /// Sets the warranty in months.
    pub fn warranty_months(mut self, months: u32) -> Self {
        self.warranty_months = months;
        self
    }

    /// Sets the delivery estimate.
    pub fn delivery_days(mut self, days: u32) -> Self {
        self.delivery_days = days;
        self
    }

    /// Sets the completion estimate.
    pub fn completion_days(mut self, days: u32) -> Self {
        self.completion_days = days;
        self
    }

    /// Sets the confidence score.
    pub fn confidence(mut self, confidence: u8) -> Self {
        self.confidence = confidence;
        self
    }

    /// Sets the initial status.
    pub fn status(mut self, status: QuoteStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the creation time.
    pub fn created_at(mut self, at: Timestamp) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Builds the quote, computing the total from the breakdown.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidQuote` if confidence exceeds 100 and
    /// `DomainError::Arithmetic` if the total overflows.
    pub fn build(self) -> DomainResult<Quote> {
        if self.confidence > MAX_CONFIDENCE {
            return Err(DomainError::invalid_quote(format!(
                "confidence {} exceeds {MAX_CONFIDENCE}",
                self.confidence
            )));
        }
        let total_cost = self.costs.total()?;
        let created_at = self.created_at.unwrap_or_else(Timestamp::now);
        Ok(Quote {
            id: self.id.unwrap_or_else(QuoteId::new_v4),
            request_id: self.request_id,
            part_id: self.part_id,
            provider_type: self.provider_type,
            provider_name: self
                .provider_name
                .unwrap_or_else(|| self.provider_type.to_string()),
            costs: self.costs,
            total_cost,
            quality_tier: self.quality_tier,
            warranty_months: self.warranty_months,
            delivery_days: self.delivery_days,
            completion_days: self.completion_days,
            confidence: self.confidence,
            valid_until: self.valid_until,
            status: self.status,
            created_at,
            updated_at: created_at,
        })
    }
}
