//! # Domain Errors
//!
//! Errors raised when an entity invariant or a state machine rule is violated.

use crate::domain::value_objects::arithmetic::ArithmeticError;
use crate::domain::value_objects::request_state::RequestState;
use crate::domain::value_objects::ProviderType;
use thiserror::Error;

/// Error type for domain operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Input failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Monetary amount was invalid (negative or malformed).
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A quote failed cost or payload validation.
    #[error("invalid quote: {0}")]
    InvalidQuote(String),

    /// Quote request state machine rejected the transition.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current state.
        from: RequestState,
        /// Requested state.
        to: RequestState,
    },

    /// Provider is not part of the request's selection.
    #[error("provider {0} is not selected for this request")]
    ProviderNotSelected(ProviderType),

    /// Accepted quotes are frozen.
    #[error("quote is accepted and can no longer change: {0}")]
    QuoteImmutable(String),

    /// Damaged part is locked by an outstanding quote request.
    #[error("damaged part is locked: {0}")]
    PartLocked(String),

    /// Checked arithmetic failed.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
}

impl DomainError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Creates an invalid quote error.
    #[must_use]
    pub fn invalid_quote(message: impl Into<String>) -> Self {
        Self::InvalidQuote(message.into())
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
