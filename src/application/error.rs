//! # Application Errors
//!
//! Error types for the application layer.
//!
//! Domain and infrastructure failures are folded into one taxonomy the
//! callers of the workflow can act on.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Validation(String)        - malformed input
//! ├── Conflict(String)          - active request exists, locked part changed
//! ├── InvalidQuote(String)      - provider payload rejected
//! ├── InsufficientData { .. }   - too few quotes for statistics
//! ├── PartialCoverage { .. }    - no provider quoted every part
//! ├── NotFound { .. }           - unknown request, part or assessment
//! ├── Domain(DomainError)       - other invariant violations
//! ├── Provider(ProviderError)   - adapter failures
//! └── Repository(RepositoryError)
//! ```
//!
//! # Examples
//!
//! ```
//! use repair_quote::application::error::ApplicationError;
//! use repair_quote::domain::errors::DomainError;
//!
//! let err = ApplicationError::not_found("QuoteRequest", "42");
//! assert!(err.is_not_found());
//!
//! let err: ApplicationError = DomainError::validation("year is required").into();
//! assert!(err.is_validation());
//! ```

use crate::application::services::recommendation_engine::RecommendationError;
use crate::domain::entities::ProviderCoverage;
use crate::domain::errors::DomainError;
use crate::domain::services::MarketAverageError;
use crate::domain::value_objects::DamagedPartId;
use crate::infrastructure::persistence::RepositoryError;
use crate::infrastructure::providers::ProviderError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplicationError {
    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A provider payload failed validation.
    #[error("invalid quote: {0}")]
    InvalidQuote(String),

    /// Too few valid quotes to compute statistics.
    #[error("insufficient data{}: {found} valid quotes, {required} required", part_suffix(.part_id))]
    InsufficientData {
        /// Part concerned, when known.
        part_id: Option<DamagedPartId>,
        /// Valid quotes found.
        found: usize,
        /// Minimum required.
        required: usize,
    },

    /// No provider quoted every part.
    #[error("partial coverage: no provider covers all {total_parts} parts")]
    PartialCoverage {
        /// Parts in the assessment.
        total_parts: usize,
        /// Covered part count per channel.
        coverage: Vec<ProviderCoverage>,
    },

    /// Resource not found.
    #[error("{resource_type} not found: {id}")]
    NotFound {
        /// Type of resource.
        resource_type: &'static str,
        /// Resource identifier.
        id: String,
    },

    /// Domain invariant violated.
    #[error("domain error: {0}")]
    Domain(DomainError),

    /// Provider adapter failure.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Persistence failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

}

fn part_suffix(part_id: &Option<DamagedPartId>) -> String {
    part_id.map(|id| format!(" for part {id}")).unwrap_or_default()
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates an invalid quote error.
    #[must_use]
    pub fn invalid_quote(message: impl Into<String>) -> Self {
        Self::InvalidQuote(message.into())
    }

    /// Creates an insufficient data error for a part.
    #[must_use]
    pub fn insufficient_data(part_id: DamagedPartId, found: usize, required: usize) -> Self {
        Self::InsufficientData {
            part_id: Some(part_id),
            found,
            required,
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns true if a quote was rejected.
    #[must_use]
    pub fn is_invalid_quote(&self) -> bool {
        matches!(self, Self::InvalidQuote(_))
    }

    /// Returns true if statistics lacked data.
    #[must_use]
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }

    /// Returns true if no provider covered every part.
    #[must_use]
    pub fn is_partial_coverage(&self) -> bool {
        matches!(self, Self::PartialCoverage { .. })
    }

    /// Returns true if a resource was missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if a retry could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_retryable(),
            Self::Repository(e) => e.is_version_conflict(),
            _ => false,
        }
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ValidationError(msg) => Self::Validation(msg),
            DomainError::InvalidQuote(msg) => Self::InvalidQuote(msg),
            DomainError::PartLocked(msg) => Self::Conflict(msg),
            other => Self::Domain(other),
        }
    }
}

impl From<MarketAverageError> for ApplicationError {
    fn from(err: MarketAverageError) -> Self {
        match err {
            MarketAverageError::InsufficientData { found, required } => Self::InsufficientData {
                part_id: None,
                found,
                required,
            },
            MarketAverageError::Domain(e) => e.into(),
        }
    }
}

impl From<RecommendationError> for ApplicationError {
    fn from(err: RecommendationError) -> Self {
        match err {
            RecommendationError::NoParts => Self::validation("assessment has no damaged parts"),
            RecommendationError::PartialCoverage {
                total_parts,
                coverage,
            } => Self::PartialCoverage {
                total_parts,
                coverage,
            },
            RecommendationError::Domain(e) => e.into(),
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
