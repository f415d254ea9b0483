//! # HTTP Provider Adapter
//!
//! JSON-over-HTTP implementation of [`ProviderAdapter`] for external
//! channels.
//!
//! The adapter posts the [`ProviderRequest`] to `{base_url}/quotes` and
//! expects a [`QuoteSubmission`] back. HTTP failures are mapped onto
//! [`ProviderError`]:
//!
//! | Status            | Error            |
//! |-------------------|------------------|
//! | 400               | invalid request  |
//! | 401, 403          | authentication   |
//! | 429               | rate limited     |
//! | 5xx               | connection       |
//! | anything else     | protocol         |
//!
//! # Examples
//!
//! ```ignore
//! use repair_quote::infrastructure::providers::http_client::HttpProviderAdapter;
//! use repair_quote::domain::value_objects::ProviderType;
//!
//! let adapter = HttpProviderAdapter::new(ProviderType::Dealer, "https://dealer.example", 5000)?;
//! ```

use crate::domain::entities::QuoteSubmission;
use crate::domain::value_objects::ProviderType;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::traits::{ProviderAdapter, ProviderRequest};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// Path appended to the base URL.
pub const QUOTES_PATH: &str = "/quotes";

/// External provider reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProviderAdapter {
    provider: ProviderType,
    base_url: String,
    client: Client,
    timeout_ms: u64,
}

impl HttpProviderAdapter {
    /// Creates an adapter.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the HTTP client cannot be built.
    pub fn new(
        provider: ProviderType,
        base_url: impl Into<String>,
        timeout_ms: u64,
    ) -> ProviderResult<Self> {
        Self::with_headers(provider, base_url, timeout_ms, HeaderMap::new())
    }

    /// Creates an adapter sending a bearer token with every call.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidRequest` if the token is not a valid
    /// header value and `ProviderError::Internal` if the client cannot be built.
    pub fn with_api_key(
        provider: ProviderType,
        base_url: impl Into<String>,
        timeout_ms: u64,
        api_key: &str,
    ) -> ProviderResult<Self> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| ProviderError::invalid_request(format!("invalid API key: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
        Self::with_headers(provider, base_url, timeout_ms, headers)
    }

    /// Creates an adapter with default headers.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the HTTP client cannot be built.
    pub fn with_headers(
        provider: ProviderType,
        base_url: impl Into<String>,
        timeout_ms: u64,
        default_headers: HeaderMap,
    ) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ProviderError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            provider,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            timeout_ms,
        })
    }

    /// Base URL without trailing slash.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint the request is posted to.
    #[must_use]
    pub fn quotes_url(&self) -> String {
        format!("{}{QUOTES_PATH}", self.base_url)
    }

    async fn handle_response(&self, response: Response) -> ProviderResult<QuoteSubmission> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<QuoteSubmission>()
                .await
                .map_err(|e| ProviderError::protocol(format!("failed to parse quote: {e}")))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(self.map_status_error(status, &body))
        }
    }

    fn map_reqwest_error(&self, error: &reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::timeout_with_duration(
                format!("{} did not answer in time", self.provider),
                self.timeout_ms,
            )
        } else if error.is_connect() {
            ProviderError::connection(format!("connection failed: {error}"))
        } else {
            ProviderError::connection(format!("HTTP request failed: {error}"))
        }
    }

    fn map_status_error(&self, status: StatusCode, body: &str) -> ProviderError {
        match status {
            StatusCode::BAD_REQUEST => ProviderError::invalid_request(format!("bad request: {body}")),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::authentication(format!("authentication failed: {body}"))
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited("rate limit exceeded"),
            s if s.is_server_error() => {
                ProviderError::connection(format!("server error ({s}): {body}"))
            }
            s => ProviderError::protocol(format!("HTTP error ({s}): {body}")),
        }
    }
}

#[async_trait]
impl ProviderAdapter for HttpProviderAdapter {
    fn provider_type(&self) -> ProviderType {
        self.provider
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    async fn submit(&self, request: &ProviderRequest) -> ProviderResult<QuoteSubmission> {
        let response = self
            .client
            .post(self.quotes_url())
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(&e))?;

        self.handle_response(response).await
    }
}
