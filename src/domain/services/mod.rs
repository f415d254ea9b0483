//! # Domain Services
//!
//! Domain services encapsulating logic that doesn't naturally belong to a
//! single entity or value object. Both are pure and stateless.
//!
//! ## Services
//!
//! - [`PartAggregator`]: merges raw observations into damaged parts
//! - [`MarketAverageCalculator`]: per-part market statistics

pub mod market_average;
pub mod part_aggregator;

pub use market_average::{
    MarketAverageCalculator, MarketAverageError, MarketAverageResult, MIN_QUOTES_FLOOR,
};
pub use part_aggregator::PartAggregator;
