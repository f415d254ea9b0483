//! # Part Market Average
//!
//! Descriptive statistics over the valid quotes for one damaged part.
//! Always derived by
//! [`MarketAverageCalculator`](crate::domain::services::MarketAverageCalculator),
//! never created by callers.

use crate::domain::entities::quote::Quote;
use crate::domain::value_objects::{
    ConfidenceLevel, DamagedPartId, Money, ProviderType, QuoteId, Timestamp,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to the quote behind a statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuoteRef {
    /// Quote id.
    pub quote_id: QuoteId,
    /// Provider channel.
    pub provider_type: ProviderType,
    /// Provider display name.
    pub provider_name: String,
    /// Quote total.
    pub total_cost: Money,
}

impl From<&Quote> for QuoteRef {
    fn from(quote: &Quote) -> Self {
        Self {
            quote_id: quote.id(),
            provider_type: quote.provider_type(),
            provider_name: quote.provider_name().to_string(),
            total_cost: quote.total_cost(),
        }
    }
}

/// A quote whose total lies more than two standard deviations from the mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OutlierFlag {
    /// The flagged quote.
    pub quote: QuoteRef,
    /// Signed distance from the mean in standard deviations.
    pub z_score: f64,
}

/// Market statistics for one part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PartMarketAverage {
    /// Part the statistics describe.
    pub part_id: DamagedPartId,
    /// Mean part cost.
    pub average_part_cost: Money,
    /// Mean labor cost.
    pub average_labor_cost: Money,
    /// Mean total cost.
    pub average_total: Money,
    /// Lowest total.
    pub min_total: Money,
    /// Highest total.
    pub max_total: Money,
    /// `max_total - min_total`.
    pub variance: Money,
    /// `variance / average_total * 100`, two decimals.
    pub variance_percentage: f64,
    /// Lowest-quoting provider.
    pub lowest: QuoteRef,
    /// Highest-quoting provider.
    pub highest: QuoteRef,
    /// Number of valid quotes used.
    pub quote_count: usize,
    /// Sample standard deviation of totals.
    pub std_dev: f64,
    /// Confidence in the average.
    pub confidence: ConfidenceLevel,
    /// Outliers; they stay in the average.
    pub outliers: Vec<OutlierFlag>,
    /// The `as_of` instant used for validity filtering.
    pub calculated_at: Timestamp,
}
