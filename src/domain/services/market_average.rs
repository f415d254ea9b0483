//! # Market Average Calculator
//!
//! Pure statistics over a snapshot of one part's quotes.
//!
//! Only quotes that are `submitted` and not past their validity deadline at
//! `as_of` count. The result depends only on the quote set and `as_of`, so
//! recomputing over an unchanged snapshot yields an identical value.
//!
//! # Examples
//!
//! ```
//! use repair_quote::domain::entities::quote::{CostBreakdown, QuoteBuilder};
//! use repair_quote::domain::services::MarketAverageCalculator;
//! use repair_quote::domain::value_objects::{
//!     ConfidenceLevel, DamagedPartId, Money, ProviderType, QuoteRequestId, Timestamp,
//! };
//!
//! let as_of = Timestamp::now();
//! let part = DamagedPartId::new_v4();
//! let request = QuoteRequestId::new_v4();
//! let quotes: Vec<_> = [ProviderType::Dealer, ProviderType::Network]
//!     .into_iter()
//!     .map(|p| {
//!         let costs = CostBreakdown::new(Money::from(300), Money::from(100), Money::zero(), Money::zero());
//!         QuoteBuilder::new(request, part, p, costs, as_of.add_days(10)).build().unwrap()
//!     })
//!     .collect();
//!
//! let avg = MarketAverageCalculator::default().calculate(part, &quotes, as_of).unwrap();
//! assert_eq!(avg.variance_percentage, 0.0);
//! assert_eq!(avg.confidence, ConfidenceLevel::Medium);
//! ```

use crate::domain::entities::market_average::{OutlierFlag, PartMarketAverage, QuoteRef};
use crate::domain::entities::quote::Quote;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::arithmetic::{ArithmeticError, CheckedArithmetic, checked_mean};
use crate::domain::value_objects::{ConfidenceLevel, DamagedPartId, Money, Timestamp};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

/// Smallest quote count statistics are ever computed on.
pub const MIN_QUOTES_FLOOR: usize = 2;

/// Z-score above which a quote is flagged as an outlier.
pub const OUTLIER_Z_THRESHOLD: f64 = 2.0;

/// Error type for market average computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketAverageError {
    /// Too few valid quotes.
    #[error("insufficient data: {found} valid quotes, {required} required")]
    InsufficientData {
        /// Valid quotes found.
        found: usize,
        /// Minimum required.
        required: usize,
    },

    /// Invariant violation while building the result.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<ArithmeticError> for MarketAverageError {
    fn from(err: ArithmeticError) -> Self {
        Self::Domain(DomainError::Arithmetic(err))
    }
}

/// Result type for market average computation.
pub type MarketAverageResult<T> = Result<T, MarketAverageError>;

/// Computes [`PartMarketAverage`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketAverageCalculator {
    min_quotes: usize,
}

impl Default for MarketAverageCalculator {
    fn default() -> Self {
        Self {
            min_quotes: MIN_QUOTES_FLOOR,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl MarketAverageCalculator {
    /// Creates a calculator requiring `min_quotes` valid quotes, never fewer
    /// than [`MIN_QUOTES_FLOOR`].
    #[must_use]
    pub fn new(min_quotes: usize) -> Self {
        Self {
            min_quotes: min_quotes.max(MIN_QUOTES_FLOOR),
        }
    }

    /// Returns the configured minimum.
    #[inline]
    #[must_use]
    pub fn min_quotes(&self) -> usize {
        self.min_quotes
    }

    /// Computes the market statistics for `part_id` from `quotes`.
    ///
    /// Quotes for other parts, or not valid at `as_of`, are ignored.
    ///
    /// # Errors
    ///
    /// Returns `MarketAverageError::InsufficientData` with fewer than the
    /// configured minimum of valid quotes.
    pub fn calculate(
        &self,
        part_id: DamagedPartId,
        quotes: &[Quote],
        as_of: Timestamp,
    ) -> MarketAverageResult<PartMarketAverage> {
        let mut valid: Vec<&Quote> = quotes
            .iter()
            .filter(|q| q.part_id() == part_id && q.is_valid_at(as_of))
            .collect();
        if valid.len() < self.min_quotes {
            return Err(MarketAverageError::InsufficientData {
                found: valid.len(),
                required: self.min_quotes,
            });
        }
        valid.sort_by(|a, b| {
            a.total_cost()
                .cmp(&b.total_cost())
                .then(a.provider_type().cmp(&b.provider_type()))
                .then(a.id().cmp(&b.id()))
        });

        let mean_total = checked_mean(valid.iter().map(|q| q.total_cost().get()))?;
        let mean_part = checked_mean(valid.iter().map(|q| q.costs().part.get()))?;
        let mean_labor = checked_mean(valid.iter().map(|q| q.costs().labor.get()))?;

        let (Some(lowest), Some(highest_total)) = (valid.first(), valid.last().map(|q| q.total_cost()))
        else {
            return Err(MarketAverageError::InsufficientData {
                found: 0,
                required: self.min_quotes,
            });
        };
        let highest = valid
            .iter()
            .find(|q| q.total_cost() == highest_total)
            .unwrap_or(lowest);

        let min_total = lowest.total_cost();
        let max_total = highest_total;
        let variance = max_total.get().safe_sub(min_total.get())?;
        let variance_percentage = if mean_total.is_zero() {
            0.0
        } else {
            variance
                .safe_div(mean_total)?
                .safe_mul(Decimal::ONE_HUNDRED)?
                .round_dp(2)
                .to_f64()
                .unwrap_or(0.0)
        };

        let totals: Vec<f64> = valid.iter().map(|q| q.total_cost().to_f64()).collect();
        let std_dev = sample_std_dev(&totals);

        let mut confidence = ConfidenceLevel::from_variance_percentage(variance_percentage);
        if valid.len() < 3 {
            confidence = confidence.downgrade();
        }

        let mean_f = mean_total.to_f64().unwrap_or(0.0);
        let outliers = if std_dev > 0.0 {
            valid
                .iter()
                .filter_map(|q| {
                    let z = (q.total_cost().to_f64() - mean_f) / std_dev;
                    (z.abs() > OUTLIER_Z_THRESHOLD).then(|| OutlierFlag {
                        quote: QuoteRef::from(*q),
                        z_score: round2(z),
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        let average = PartMarketAverage {
            part_id,
            average_part_cost: Money::new(mean_part.round_dp(2))?,
            average_labor_cost: Money::new(mean_labor.round_dp(2))?,
            average_total: Money::new(mean_total.round_dp(2))?,
            min_total,
            max_total,
            variance: Money::new(variance)?,
            variance_percentage,
            lowest: QuoteRef::from(*lowest),
            highest: QuoteRef::from(*highest),
            quote_count: valid.len(),
            std_dev: round2(std_dev),
            confidence,
            outliers,
            calculated_at: as_of,
        };
        tracing::debug!(
            part_id = %part_id,
            quote_count = average.quote_count,
            average_total = %average.average_total,
            variance_percentage = average.variance_percentage,
            confidence = %average.confidence,
            "market average computed"
        );
        Ok(average)
    }
}

/// Sample standard deviation (n - 1 denominator); zero below two values.
#[must_use]
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (n - 1.0)).sqrt()
}
