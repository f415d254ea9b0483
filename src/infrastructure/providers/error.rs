//! # Provider Errors
//!
//! Error types for provider adapter calls.
//!
//! Any adapter error leaves the provider unreachable for the request it was
//! answering; [`ProviderError::is_retryable`] only tells callers whether a
//! later attempt could succeed.
//!
//! # Examples
//!
//! ```
//! use repair_quote::infrastructure::providers::error::ProviderError;
//!
//! let error = ProviderError::timeout("no answer after 5000ms");
//! assert!(error.is_retryable());
//!
//! let error = ProviderError::authentication("invalid API key");
//! assert!(!error.is_retryable());
//! ```

use crate::domain::value_objects::ProviderType;
use thiserror::Error;

/// Error returned by a provider adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The call did not finish in time.
    #[error("provider timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
        /// Timeout that elapsed, in milliseconds.
        timeout_ms: Option<u64>,
    },

    /// Network or server failure.
    #[error("provider connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Credentials rejected.
    #[error("provider authentication error: {message}")]
    Authentication {
        /// Error message.
        message: String,
    },

    /// Too many requests.
    #[error("provider rate limit exceeded: {message}")]
    RateLimited {
        /// Error message.
        message: String,
        /// Suggested wait before retrying, in milliseconds.
        retry_after_ms: Option<u64>,
    },

    /// The provider refused the request payload.
    #[error("provider invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },

    /// Malformed or unexpected response.
    #[error("provider protocol error: {message}")]
    Protocol {
        /// Error message.
        message: String,
    },

    /// No adapter is available for the channel.
    #[error("provider unavailable: {provider} - {message}")]
    Unavailable {
        /// Channel.
        provider: ProviderType,
        /// Error message.
        message: String,
    },

    /// Adapter-side failure.
    #[error("provider internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl ProviderError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: None,
        }
    }

    /// Creates a timeout error recording the elapsed budget.
    #[must_use]
    pub fn timeout_with_duration(message: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: Some(timeout_ms),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a rate limit error.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after_ms: None,
        }
    }

    /// Creates a rate limit error with a retry hint.
    #[must_use]
    pub fn rate_limited_with_retry(message: impl Into<String>, retry_after_ms: u64) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after_ms: Some(retry_after_ms),
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(provider: ProviderType, message: impl Into<String>) -> Self {
        Self::Unavailable {
            provider,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if a later attempt could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Connection { .. }
                | Self::RateLimited { .. }
                | Self::Unavailable { .. }
        )
    }

    /// Returns true if the request itself was at fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. } | Self::Authentication { .. }
        )
    }

    /// Returns true if this is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(ProviderError::timeout("t").is_retryable());
        assert!(ProviderError::connection("c").is_retryable());
        assert!(ProviderError::rate_limited_with_retry("r", 1000).is_retryable());
        assert!(ProviderError::unavailable(ProviderType::Dealer, "none").is_retryable());
        assert!(!ProviderError::protocol("p").is_retryable());
        assert!(!ProviderError::invalid_request("i").is_retryable());
        assert!(!ProviderError::internal("x").is_retryable());
    }

    #[test]
    fn client_errors() {
        assert!(ProviderError::authentication("a").is_client_error());
        assert!(ProviderError::invalid_request("i").is_client_error());
        assert!(!ProviderError::timeout("t").is_client_error());
    }

    #[test]
    fn display_includes_provider() {
        let err = ProviderError::unavailable(ProviderType::Network, "no adapter registered");
        assert_eq!(
            err.to_string(),
            "provider unavailable: network - no adapter registered"
        );
    }

    #[test]
    fn timeout_keeps_duration() {
        let err = ProviderError::timeout_with_duration("slow", 250);
        assert!(err.is_timeout());
        assert!(matches!(
            err,
            ProviderError::Timeout {
                timeout_ms: Some(250),
                ..
            }
        ));
    }
}
