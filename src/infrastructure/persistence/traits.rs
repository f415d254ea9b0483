//! # Repository Traits
//!
//! Port definitions for persistence abstraction.
//!
//! Persistence mechanics stay outside the core; the workflow only talks to
//! these traits. In-memory implementations live in
//! [`in_memory`](super::in_memory).
//!
//! # Available Repositories
//!
//! - [`DamagedPartRepository`]: aggregated parts per assessment
//! - [`QuoteRequestRepository`]: quote requests with optimistic versioning
//! - [`QuoteRepository`]: quotes, one row per (request, provider)

use crate::domain::entities::{DamagedPart, Quote, QuoteRequest};
use crate::domain::value_objects::{
    AssessmentId, DamagedPartId, ProviderType, QuoteId, QuoteRequestId, Timestamp,
};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for repository operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Entity not found.
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Duplicate entity.
    #[error("Duplicate entity: {entity_type} with id {id} already exists")]
    Duplicate {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Optimistic locking conflict.
    #[error("Version conflict: {entity_type} with id {id} has been modified")]
    VersionConflict {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
        /// Version being written.
        expected: u64,
        /// Version already stored.
        actual: u64,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a version conflict error.
    #[must_use]
    pub fn version_conflict(
        entity_type: &'static str,
        id: impl Into<String>,
        expected: u64,
        actual: u64,
    ) -> Self {
        Self::VersionConflict {
            entity_type,
            id: id.into(),
            expected,
            actual,
        }
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a duplicate error.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    /// Returns true if this is a version conflict error.
    #[must_use]
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository for aggregated damaged parts.
#[async_trait]
pub trait DamagedPartRepository: Send + Sync + fmt::Debug {
    /// Saves a part, overwriting the stored row with the same id.
    ///
    /// New parts keep their insertion order within the assessment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn save(&self, part: &DamagedPart) -> RepositoryResult<()>;

    /// Gets a part by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn get(&self, id: DamagedPartId) -> RepositoryResult<Option<DamagedPart>>;

    /// Parts of an assessment, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn find_by_assessment(
        &self,
        assessment_id: AssessmentId,
    ) -> RepositoryResult<Vec<DamagedPart>>;
}

/// Repository for quote requests.
#[async_trait]
pub trait QuoteRequestRepository: Send + Sync + fmt::Debug {
    /// Saves a request.
    ///
    /// A stored request is only replaced by a strictly newer version.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::VersionConflict` if the same or a newer
    /// version of the request is already stored.
    async fn save(&self, request: &QuoteRequest) -> RepositoryResult<()>;

    /// Gets a request by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn get(&self, id: QuoteRequestId) -> RepositoryResult<Option<QuoteRequest>>;

    /// All requests ever created for a part, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn find_by_part(&self, part_id: DamagedPartId) -> RepositoryResult<Vec<QuoteRequest>>;

    /// All requests of an assessment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn find_by_assessment(
        &self,
        assessment_id: AssessmentId,
    ) -> RepositoryResult<Vec<QuoteRequest>>;
}

/// Repository for quotes.
///
/// Stores at most one row per (request, provider); saving another quote
/// for the same pair replaces the row.
#[async_trait]
pub trait QuoteRepository: Send + Sync + fmt::Debug {
    /// Inserts or replaces the row for the quote's (request, provider).
    ///
    /// Returns true if a row was inserted rather than replaced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn upsert(&self, quote: &Quote) -> RepositoryResult<bool>;

    /// Gets a quote by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn get(&self, id: QuoteId) -> RepositoryResult<Option<Quote>>;

    /// The row for a (request, provider) pair.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn find_by_request_and_provider(
        &self,
        request_id: QuoteRequestId,
        provider: ProviderType,
    ) -> RepositoryResult<Option<Quote>>;

    /// Quotes received for a request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn find_by_request(&self, request_id: QuoteRequestId) -> RepositoryResult<Vec<Quote>>;

    /// Quotes for a set of parts, taken under one read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn snapshot(&self, part_ids: &[DamagedPartId]) -> RepositoryResult<Vec<Quote>>;

    /// Marks every quote of `part_ids` past its validity at `as_of` as
    /// expired, then returns the quotes of those parts. Both happen under
    /// one write.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    async fn expire_and_snapshot(
        &self,
        part_ids: &[DamagedPartId],
        as_of: Timestamp,
    ) -> RepositoryResult<Vec<Quote>>;
}
