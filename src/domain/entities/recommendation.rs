//! # Recommendation
//!
//! Scored and ranked outputs of the recommendation engine.

use crate::domain::entities::quote::Quote;
use crate::domain::value_objects::{Money, ProviderType, ScoringWeights, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The five 0-100 sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SubScores {
    /// Inverse-normalized price.
    pub price: f64,
    /// Mean quality tier value.
    pub quality: f64,
    /// Completion speed band.
    pub timeline: f64,
    /// Warranty length band.
    pub warranty: f64,
    /// Channel baseline.
    pub reliability: f64,
}

impl SubScores {
    /// Weighted sum of the sub-scores.
    #[must_use]
    pub fn composite(&self, weights: &ScoringWeights) -> f64 {
        let [wp, wq, wt, ww, wr] = weights.as_f64();
        wp * self.price
            + wq * self.quality
            + wt * self.timeline
            + ww * self.warranty
            + wr * self.reliability
    }
}

/// A quote with its rank among the quotes for the same part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankedQuote {
    /// The quote.
    pub quote: Quote,
    /// 1-based rank.
    pub rank: usize,
    /// Composite score.
    pub score: f64,
    /// Sub-scores behind the composite.
    pub sub_scores: SubScores,
}

/// How many parts a provider covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderCoverage {
    /// Provider channel.
    pub provider: ProviderType,
    /// Parts with a valid quote from the provider.
    pub covered_parts: usize,
    /// Parts in the assessment.
    pub total_parts: usize,
}

impl ProviderCoverage {
    /// Returns true if every part is covered.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.total_parts > 0 && self.covered_parts == self.total_parts
    }
}

/// Scoring of one fully covering provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderScore {
    /// Provider channel.
    pub provider: ProviderType,
    /// Sum of the provider's quote totals.
    pub aggregate_total: Money,
    /// Sub-scores.
    pub sub_scores: SubScores,
    /// Weighted composite.
    pub composite: f64,
    /// 1-based rank.
    pub rank: usize,
    /// Mean completion days across the provider's quotes.
    pub average_completion_days: f64,
    /// Mean warranty months across the provider's quotes.
    pub average_warranty_months: f64,
}

/// Completion timeline of the recommended provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimelineStats {
    /// Mean completion days.
    pub average_days: f64,
    /// Fastest part.
    pub min_days: u32,
    /// Slowest part; the repair is done when this one is.
    pub max_days: u32,
}

/// Assessment-level recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentRecommendation {
    /// Aggregate total per provider; zero when it sent no quotes.
    pub provider_totals: BTreeMap<ProviderType, Money>,
    /// Sum over parts of the per-part mean total.
    pub market_average_total: Money,
    /// Recommended provider.
    pub recommended_provider: ProviderType,
    /// Recommended provider's aggregate total.
    pub recommended_total: Money,
    /// Human-readable reason for the pick.
    pub justification: String,
    /// Highest covering aggregate minus the recommended total.
    pub potential_savings: Money,
    /// Scores of every fully covering provider, best first.
    pub scores: Vec<ProviderScore>,
    /// Providers that quoted some but not all parts.
    pub partial_providers: Vec<ProviderCoverage>,
    /// Completion timeline of the recommendation.
    pub timeline: TimelineStats,
    /// The `as_of` instant used.
    pub calculated_at: Timestamp,
}
