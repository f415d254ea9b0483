//! # Scoring Weights
//!
//! The five recommendation weights, held as decimals so that the
//! "sums to exactly 1.00" rule is checked without float rounding.

use crate::domain::errors::{DomainError, DomainResult};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Weights applied to the price, quality, timeline, warranty and
/// reliability sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringWeights {
    /// Weight of the price score.
    pub price: Decimal,
    /// Weight of the quality score.
    pub quality: Decimal,
    /// Weight of the timeline score.
    pub timeline: Decimal,
    /// Weight of the warranty score.
    pub warranty: Decimal,
    /// Weight of the reliability score.
    pub reliability: Decimal,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            price: Decimal::new(40, 2),
            quality: Decimal::new(25, 2),
            timeline: Decimal::new(15, 2),
            warranty: Decimal::new(10, 2),
            reliability: Decimal::new(10, 2),
        }
    }
}

impl ScoringWeights {
    fn all(&self) -> [Decimal; 5] {
        [
            self.price,
            self.quality,
            self.timeline,
            self.warranty,
            self.reliability,
        ]
    }

    /// Sum of the five weights.
    #[must_use]
    pub fn sum(&self) -> Decimal {
        self.all().iter().copied().sum()
    }

    /// Checks that every weight is non-negative and the sum is exactly 1.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` describing the offending value.
    pub fn validate(&self) -> DomainResult<()> {
        if self.all().iter().any(|w| w.is_sign_negative() && !w.is_zero()) {
            return Err(DomainError::validation(
                "recommendation weights must not be negative",
            ));
        }
        let sum = self.sum();
        if sum != Decimal::ONE {
            return Err(DomainError::validation(format!(
                "recommendation weights must sum to 1.00, got {sum}"
            )));
        }
        Ok(())
    }

    /// Weights as `f64` in price, quality, timeline, warranty, reliability order.
    #[must_use]
    pub fn as_f64(&self) -> [f64; 5] {
        self.all().map(|w| w.to_f64().unwrap_or(0.0))
    }
}
