//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`AssessmentId`], [`DamagedPartId`], [`QuoteRequestId`], [`QuoteId`]: UUID-based identifiers
//! - [`EventId`]: Domain event identifier
//!
//! ## Numeric Types
//!
//! - [`Money`]: Non-negative decimal amount with checked arithmetic
//!
//! ## Arithmetic
//!
//! - [`ArithmeticError`]: Error type for arithmetic failures
//! - [`CheckedArithmetic`]: Trait for safe arithmetic operations
//!
//! ## Domain Enums
//!
//! - `PartCategory`, `DamageSeverity`: classification of damaged parts
//! - `ProviderType`: the four quote channels
//! - `RequestState`: quote request lifecycle states

pub mod arithmetic;
pub mod enums;
pub mod ids;
pub mod money;
pub mod provider_selection;
pub mod request_state;
pub mod scoring_weights;
pub mod timestamp;
pub mod vehicle;

pub use arithmetic::{ArithmeticError, ArithmeticResult, CheckedArithmetic};
pub use enums::{
    ConfidenceLevel, DamageSeverity, ParseEnumError, PartCategory, ProviderType, QualityTier,
    QuoteStatus,
};
pub use ids::{AssessmentId, DamagedPartId, EventId, QuoteId, QuoteRequestId};
pub use money::Money;
pub use provider_selection::ProviderSelection;
pub use request_state::RequestState;
pub use scoring_weights::ScoringWeights;
pub use timestamp::Timestamp;
pub use vehicle::VehicleContext;
