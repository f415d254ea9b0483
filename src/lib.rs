//! # Repair Quote Engine
//!
//! Collects repair-cost quotations for damaged vehicle parts from several
//! provider channels, analyzes the price spread per part and recommends the
//! provider whose quotes should be accepted.
//!
//! # Layers
//!
//! - [`domain`]: entities, value objects, events and pure domain services
//!   (part aggregation, market statistics)
//! - [`application`]: request management, provider dispatch, recommendation
//!   and the assessment workflow
//! - [`infrastructure`]: provider adapters, pricing catalog and repositories
//! - [`config`]: settings loading and validation
//! - [`telemetry`]: tracing subscriber setup
//!
//! # Data Flow
//!
//! ```text
//! raw observations → PartAggregator → QuoteRequestManager → ProviderDispatcher
//!     → quote store → MarketAverageCalculator → RecommendationEngine → AssessmentReport
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;

pub use application::error::{ApplicationError, ApplicationResult};
pub use config::{ConfigError, Settings};
