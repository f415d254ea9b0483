//! # Configuration
//!
//! Layered settings: built-in defaults, an optional TOML file, then
//! environment variables prefixed `REPAIR_QUOTE_` with `__` between nested
//! keys (`REPAIR_QUOTE_PRICING__LABOR_RATE=50`). A `.env` file in the working
//! directory is loaded first.
//!
//! Loading fails with [`ConfigError`] when the result does not validate;
//! nothing runs on an invalid configuration.

use crate::application::services::DispatchConfig;
use crate::application::use_cases::WorkflowConfig;
use crate::domain::entities::quote_request::MAX_EXPIRY_DAYS;
use crate::domain::services::MIN_QUOTES_FLOOR;
use crate::domain::value_objects::{ProviderType, ScoringWeights};
use crate::infrastructure::pricing::{CatalogError, PricingCatalog};
use crate::infrastructure::providers::{
    AssessorAdapter, AssessorTerms, HttpProviderAdapter, ProviderError, ProviderRegistry,
};
use config::{Config, Environment, File, FileFormat};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "REPAIR_QUOTE";

/// Separator between nested keys in environment variables.
pub const ENV_SEPARATOR: &str = "__";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Values are out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The pricing catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A provider adapter could not be built.
    #[error("provider setup failed: {0}")]
    Provider(#[from] ProviderError),
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Assessor pricing terms and catalog location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Labor rate per hour.
    pub labor_rate: Decimal,
    /// Days an assessor quote stays valid.
    pub quote_validity_days: u32,
    /// TOML pricing catalog; the built-in table when absent.
    pub catalog_path: Option<PathBuf>,
}

impl Default for PricingSettings {
    fn default() -> Self {
        let terms = AssessorTerms::default();
        Self {
            labor_rate: terms.labor_rate,
            quote_validity_days: terms.quote_validity_days,
            catalog_path: None,
        }
    }
}

/// Quote request lifecycle settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSettings {
    /// Default expiry window in days.
    pub default_expiry_days: u32,
    /// Upper bound on one dispatch round in milliseconds.
    pub max_wait_ms: u64,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            default_expiry_days: 7,
            max_wait_ms: DispatchConfig::default().max_wait_ms,
        }
    }
}

/// Market statistics settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    /// Minimum valid quotes for statistics.
    pub min_quotes: usize,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            min_quotes: MIN_QUOTES_FLOOR,
        }
    }
}

/// One external provider channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
    /// Endpoint root; the channel has no adapter when absent.
    pub base_url: Option<String>,
    /// Bearer token.
    pub api_key: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            base_url: None,
            api_key: None,
        }
    }
}

/// External provider channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersSettings {
    /// Authorized dealer.
    pub dealer: ProviderSettings,
    /// Independent garage.
    pub independent: ProviderSettings,
    /// Insurance repair network.
    pub network: ProviderSettings,
}

impl ProvidersSettings {
    /// Settings of each external channel.
    pub fn iter(&self) -> impl Iterator<Item = (ProviderType, &ProviderSettings)> {
        [
            (ProviderType::Dealer, &self.dealer),
            (ProviderType::Independent, &self.independent),
            (ProviderType::Network, &self.network),
        ]
        .into_iter()
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Assessor pricing.
    pub pricing: PricingSettings,
    /// Request lifecycle.
    pub requests: RequestSettings,
    /// Market statistics.
    pub market: MarketSettings,
    /// Recommendation weights.
    pub weights: ScoringWeights,
    /// External provider channels.
    pub providers: ProvidersSettings,
    /// Logging.
    pub logging: LoggingSettings,
}

impl Settings {
    /// Loads settings from defaults, an optional file and the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source is unreadable and
    /// `ConfigError::Invalid` if the merged settings do not validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        // A missing .env is fine.
        dotenvy::dotenv().ok();

        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );
        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from TOML over the defaults, without the environment.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks ranges and cross-field rules.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights
            .validate()
            .map_err(|e| ConfigError::invalid(format!("weights: {e}")))?;

        let expiry = self.requests.default_expiry_days;
        if expiry == 0 || i64::from(expiry) > MAX_EXPIRY_DAYS {
            return Err(ConfigError::invalid(format!(
                "requests.default_expiry_days must be between 1 and {MAX_EXPIRY_DAYS}, got {expiry}"
            )));
        }
        if self.requests.max_wait_ms == 0 {
            return Err(ConfigError::invalid("requests.max_wait_ms must be positive"));
        }
        if self.market.min_quotes < MIN_QUOTES_FLOOR {
            return Err(ConfigError::invalid(format!(
                "market.min_quotes must be at least {MIN_QUOTES_FLOOR}, got {}",
                self.market.min_quotes
            )));
        }
        if self.pricing.labor_rate <= Decimal::ZERO {
            return Err(ConfigError::invalid(format!(
                "pricing.labor_rate must be positive, got {}",
                self.pricing.labor_rate
            )));
        }
        if self.pricing.quote_validity_days == 0 {
            return Err(ConfigError::invalid(
                "pricing.quote_validity_days must be positive",
            ));
        }
        for (provider, settings) in self.providers.iter() {
            if settings.timeout_ms == 0 {
                return Err(ConfigError::invalid(format!(
                    "providers.{provider}.timeout_ms must be positive"
                )));
            }
            if let Some(url) = &settings.base_url {
                reqwest::Url::parse(url).map_err(|e| {
                    ConfigError::invalid(format!("providers.{provider}.base_url: {e}"))
                })?;
            }
        }
        Ok(())
    }

    /// Assessor pricing terms.
    #[must_use]
    pub fn assessor_terms(&self) -> AssessorTerms {
        AssessorTerms {
            labor_rate: self.pricing.labor_rate,
            quote_validity_days: self.pricing.quote_validity_days,
        }
    }

    /// Loads the configured catalog, or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Catalog` if the file is unreadable or invalid.
    pub fn catalog(&self) -> Result<PricingCatalog, ConfigError> {
        match &self.pricing.catalog_path {
            Some(path) => Ok(PricingCatalog::load(path)?),
            None => Ok(PricingCatalog::default()),
        }
    }

    /// Builds the adapter registry: the assessor plus every external channel
    /// with a base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Provider` if an HTTP client cannot be built.
    pub fn provider_registry(
        &self,
        catalog: Arc<PricingCatalog>,
    ) -> Result<ProviderRegistry, ConfigError> {
        let mut registry = ProviderRegistry::new()
            .with(Arc::new(AssessorAdapter::new(catalog, self.assessor_terms())));
        for (provider, settings) in self.providers.iter() {
            let Some(base_url) = &settings.base_url else {
                continue;
            };
            let adapter = match &settings.api_key {
                Some(key) => HttpProviderAdapter::with_api_key(
                    provider,
                    base_url.as_str(),
                    settings.timeout_ms,
                    key,
                )?,
                None => HttpProviderAdapter::new(provider, base_url.as_str(), settings.timeout_ms)?,
            };
            registry.register(Arc::new(adapter));
        }
        Ok(registry)
    }

    /// Workflow tunables.
    #[must_use]
    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            default_expiry_days: self.requests.default_expiry_days,
            min_quotes: self.market.min_quotes,
            weights: self.weights,
            dispatch: DispatchConfig::with_max_wait(self.requests.max_wait_ms),
        }
    }
}
