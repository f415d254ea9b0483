//! # Domain Entities
//!
//! Aggregate roots and entities representing core business concepts.
//!
//! ## Aggregates
//!
//! - [`QuoteRequest`]: quote collection for one damaged part, with state machine
//!
//! ## Entities
//!
//! - [`DamagedPart`]: canonical damaged component of an assessment
//! - [`Quote`]: priced provider response for one part
//!
//! ## Derived Values
//!
//! - [`PartMarketAverage`]: per-part market statistics
//! - [`AssessmentRecommendation`]: assessment-level recommendation

pub mod damaged_part;
pub mod market_average;
pub mod quote;
pub mod quote_request;
pub mod recommendation;

pub use damaged_part::{DamagedPart, RawObservation, normalize_part_name};
pub use market_average::{OutlierFlag, PartMarketAverage, QuoteRef};
pub use quote::{CostBreakdown, Quote, QuoteBuilder, QuoteSubmission};
pub use quote_request::{ProviderResolution, QuoteRequest, RequestTransition};
pub use recommendation::{
    AssessmentRecommendation, ProviderCoverage, ProviderScore, RankedQuote, SubScores,
    TimelineStats,
};
