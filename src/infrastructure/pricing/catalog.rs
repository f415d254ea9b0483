//! # Pricing Catalog
//!
//! Read-only base part costs used by the assessor channel.
//!
//! Lookups are keyed by `(make, category, part name)` and fall back in
//! order: exact make, any make, category default, catalog default. The
//! catalog is injected into the assessor adapter; there is no global table.
//!
//! # TOML Format
//!
//! ```toml
//! default_part_cost = 200
//!
//! [category_defaults]
//! body = 300
//! glass = 220
//!
//! [[entries]]
//! make = "Toyota"
//! category = "body"
//! part_name = "Front Bumper"
//! base_cost = 340
//!
//! [[entries]]
//! category = "glass"
//! part_name = "Windshield"
//! base_cost = 320
//! ```

use crate::domain::entities::normalize_part_name;
use crate::domain::value_objects::PartCategory;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Error raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read pricing catalog {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not valid TOML for this schema.
    #[error("failed to parse pricing catalog: {0}")]
    Parse(#[from] toml::de::Error),

    /// The catalog parsed but holds an unusable value.
    #[error("invalid pricing catalog: {0}")]
    Invalid(String),
}

/// Which lookup level produced a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Entry for this make.
    Exact,
    /// Entry without a make.
    AnyMake,
    /// Category default.
    CategoryDefault,
    /// Catalog-wide default.
    CatalogDefault,
}

/// Result of a catalog lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogPrice {
    /// Base part cost.
    pub amount: Decimal,
    /// Level the price came from.
    pub source: PriceSource,
}

/// One priced part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Vehicle make; `None` applies to every make.
    #[serde(default)]
    pub make: Option<String>,
    /// Part category.
    pub category: PartCategory,
    /// Part name, matched after normalization.
    pub part_name: String,
    /// Base part cost.
    pub base_cost: Decimal,
}

impl CatalogEntry {
    fn matches(&self, make: Option<&str>, category: PartCategory, normalized_name: &str) -> bool {
        let make_matches = match (self.make.as_deref(), make) {
            (Some(own), Some(wanted)) => own.trim().eq_ignore_ascii_case(wanted.trim()),
            (None, None) => true,
            _ => false,
        };
        make_matches
            && self.category == category
            && normalize_part_name(&self.part_name) == normalized_name
    }
}

/// Injected pricing table for the assessor channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingCatalog {
    default_part_cost: Decimal,
    #[serde(default)]
    category_defaults: BTreeMap<PartCategory, Decimal>,
    #[serde(default)]
    entries: Vec<CatalogEntry>,
}

impl PricingCatalog {
    /// Creates an empty catalog that prices everything at `default_part_cost`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` if the default is negative.
    pub fn new(default_part_cost: Decimal) -> Result<Self, CatalogError> {
        let catalog = Self {
            default_part_cost,
            category_defaults: BTreeMap::new(),
            entries: Vec::new(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Sets the default for a category.
    #[must_use]
    pub fn with_category_default(mut self, category: PartCategory, cost: Decimal) -> Self {
        self.category_defaults.insert(category, cost);
        self
    }

    /// Adds an entry.
    #[must_use]
    pub fn with_entry(mut self, entry: CatalogEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Parses a catalog from TOML.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed input and
    /// `CatalogError::Invalid` for negative costs or blank part names.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let catalog: Self = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Loads a catalog from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, otherwise as
    /// [`PricingCatalog::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.default_part_cost.is_sign_negative() && !self.default_part_cost.is_zero() {
            return Err(CatalogError::Invalid(format!(
                "default part cost is negative: {}",
                self.default_part_cost
            )));
        }
        if let Some((category, cost)) = self
            .category_defaults
            .iter()
            .find(|(_, cost)| cost.is_sign_negative() && !cost.is_zero())
        {
            return Err(CatalogError::Invalid(format!(
                "default cost for {category} is negative: {cost}"
            )));
        }
        for entry in &self.entries {
            if entry.part_name.trim().is_empty() {
                return Err(CatalogError::Invalid("entry with blank part name".into()));
            }
            if entry.base_cost.is_sign_negative() && !entry.base_cost.is_zero() {
                return Err(CatalogError::Invalid(format!(
                    "base cost for {} is negative: {}",
                    entry.part_name, entry.base_cost
                )));
            }
        }
        Ok(())
    }

    /// Looks up the base part cost.
    #[must_use]
    pub fn lookup(&self, make: &str, category: PartCategory, part_name: &str) -> CatalogPrice {
        let name = normalize_part_name(part_name);
        let find = |make: Option<&str>| {
            self.entries
                .iter()
                .find(|e| e.matches(make, category, &name))
                .map(|e| e.base_cost)
        };

        if let Some(amount) = find(Some(make)) {
            return CatalogPrice {
                amount,
                source: PriceSource::Exact,
            };
        }
        if let Some(amount) = find(None) {
            return CatalogPrice {
                amount,
                source: PriceSource::AnyMake,
            };
        }
        match self.category_defaults.get(&category) {
            Some(amount) => CatalogPrice {
                amount: *amount,
                source: PriceSource::CategoryDefault,
            },
            None => CatalogPrice {
                amount: self.default_part_cost,
                source: PriceSource::CatalogDefault,
            },
        }
    }

    /// Catalog-wide default part cost.
    #[inline]
    #[must_use]
    pub fn default_part_cost(&self) -> Decimal {
        self.default_part_cost
    }

    /// Number of explicit entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no explicit entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PricingCatalog {
    /// Built-in table with common parts and a default per category.
    fn default() -> Self {
        let entry = |category, name: &str, cost: i64| CatalogEntry {
            make: None,
            category,
            part_name: name.to_string(),
            base_cost: Decimal::new(cost, 0),
        };
        Self {
            default_part_cost: Decimal::new(200, 0),
            category_defaults: BTreeMap::from([
                (PartCategory::Body, Decimal::new(300, 0)),
                (PartCategory::Mechanical, Decimal::new(450, 0)),
                (PartCategory::Electrical, Decimal::new(250, 0)),
                (PartCategory::Glass, Decimal::new(220, 0)),
                (PartCategory::Interior, Decimal::new(150, 0)),
                (PartCategory::Trim, Decimal::new(80, 0)),
            ]),
            entries: vec![
                entry(PartCategory::Body, "Front Bumper", 350),
                entry(PartCategory::Body, "Rear Bumper", 330),
                entry(PartCategory::Body, "Hood", 420),
                entry(PartCategory::Body, "Front Door", 480),
                entry(PartCategory::Body, "Fender", 260),
                entry(PartCategory::Electrical, "Headlight", 240),
                entry(PartCategory::Electrical, "Tail Light", 160),
                entry(PartCategory::Glass, "Windshield", 320),
                entry(PartCategory::Glass, "Side Mirror", 140),
                entry(PartCategory::Mechanical, "Radiator", 380),
            ],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
default_part_cost = 100

[category_defaults]
body = 300

[[entries]]
make = "Toyota"
category = "body"
part_name = "Front Bumper"
base_cost = 340

[[entries]]
category = "body"
part_name = "front bumper"
base_cost = 350
"#;

    mod lookup {
        use super::*;

        #[test]
        fn exact_make_wins() {
            let catalog = PricingCatalog::from_toml_str(SAMPLE).unwrap();
            let price = catalog.lookup("toyota", PartCategory::Body, "FRONT  bumper");
            assert_eq!(price.amount, Decimal::new(340, 0));
            assert_eq!(price.source, PriceSource::Exact);
        }

        #[test]
        fn falls_back_to_any_make() {
            let catalog = PricingCatalog::from_toml_str(SAMPLE).unwrap();
            let price = catalog.lookup("Honda", PartCategory::Body, "Front Bumper");
            assert_eq!(price.amount, Decimal::new(350, 0));
            assert_eq!(price.source, PriceSource::AnyMake);
        }

        #[test]
        fn falls_back_to_category_default() {
            let catalog = PricingCatalog::from_toml_str(SAMPLE).unwrap();
            let price = catalog.lookup("Honda", PartCategory::Body, "Quarter Panel");
            assert_eq!(price.amount, Decimal::new(300, 0));
            assert_eq!(price.source, PriceSource::CategoryDefault);
        }

        #[test]
        fn falls_back_to_catalog_default() {
            let catalog = PricingCatalog::from_toml_str(SAMPLE).unwrap();
            let price = catalog.lookup("Honda", PartCategory::Glass, "Windshield");
            assert_eq!(price.amount, Decimal::new(100, 0));
            assert_eq!(price.source, PriceSource::CatalogDefault);
        }

        #[test]
        fn builtin_prices_front_bumper() {
            let price = PricingCatalog::default().lookup("Any", PartCategory::Body, "front bumper");
            assert_eq!(price.amount, Decimal::new(350, 0));
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn negative_cost_is_rejected() {
            let toml = r#"
default_part_cost = 100
[[entries]]
category = "body"
part_name = "Hood"
base_cost = -5
"#;
            let err = PricingCatalog::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, CatalogError::Invalid(_)));
        }

        #[test]
        fn unknown_category_is_a_parse_error() {
            let toml = r#"
default_part_cost = 100
[[entries]]
category = "wings"
part_name = "Hood"
base_cost = 5
"#;
            let err = PricingCatalog::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, CatalogError::Parse(_)));
        }

        #[test]
        fn missing_file_is_io_error() {
            let err = PricingCatalog::load("/nonexistent/catalog.toml").unwrap_err();
            assert!(matches!(err, CatalogError::Io { .. }));
        }

        #[test]
        fn builder_methods() {
            let catalog = PricingCatalog::new(Decimal::new(10, 0))
                .unwrap()
                .with_category_default(PartCategory::Trim, Decimal::new(20, 0))
                .with_entry(CatalogEntry {
                    make: None,
                    category: PartCategory::Trim,
                    part_name: "Badge".into(),
                    base_cost: Decimal::new(15, 0),
                });
            assert_eq!(catalog.len(), 1);
            assert_eq!(
                catalog.lookup("x", PartCategory::Trim, "Moulding").amount,
                Decimal::new(20, 0)
            );
        }
    }
}
