//! # Domain Enums
//!
//! Enumeration types for the repair quote domain:
//!
//! - [`PartCategory`] - Kind of vehicle component
//! - [`DamageSeverity`] - Ordered damage severity
//! - [`ProviderType`] - The four quote provider channels
//! - [`QualityTier`] - Quality of the quoted replacement part
//! - [`QuoteStatus`] - Quote lifecycle status
//! - [`ConfidenceLevel`] - Confidence in a market average
//!
//! All enums implement `Display`, `FromStr` and Serde traits using the
//! lowercase snake_case names of the inspection forms.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an enum from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseEnumError {
    /// The value is not a known variant.
    #[error("invalid {0} value: {1}")]
    InvalidValue(&'static str, String),
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', ' '], "_")
}

/// Category of a damaged vehicle component.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PartCategory {
    /// Body panels, bumpers, doors.
    Body,
    /// Engine, suspension, drivetrain.
    Mechanical,
    /// Lights, sensors, wiring.
    Electrical,
    /// Windscreen, windows, mirrors glass.
    Glass,
    /// Seats, dashboard, trim inside the cabin.
    Interior,
    /// Exterior trim and mouldings.
    Trim,
}

impl PartCategory {
    /// All categories.
    pub const ALL: [Self; 6] = [
        Self::Body,
        Self::Mechanical,
        Self::Electrical,
        Self::Glass,
        Self::Interior,
        Self::Trim,
    ];

    /// Returns the snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Mechanical => "mechanical",
            Self::Electrical => "electrical",
            Self::Glass => "glass",
            Self::Interior => "interior",
            Self::Trim => "trim",
        }
    }

    /// Returns true if repairs in this category need paint work.
    #[inline]
    #[must_use]
    pub const fn requires_paint(self) -> bool {
        matches!(self, Self::Body)
    }
}

impl fmt::Display for PartCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "body" => Ok(Self::Body),
            "mechanical" => Ok(Self::Mechanical),
            "electrical" => Ok(Self::Electrical),
            "glass" => Ok(Self::Glass),
            "interior" => Ok(Self::Interior),
            "trim" => Ok(Self::Trim),
            _ => Err(ParseEnumError::InvalidValue("PartCategory", s.to_string())),
        }
    }
}

/// Damage severity, ordered `Minor < Moderate < Severe < Replace`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DamageSeverity {
    /// Cosmetic damage.
    #[default]
    Minor,
    /// Repairable damage.
    Moderate,
    /// Heavy damage, repair borderline.
    Severe,
    /// Part must be replaced.
    Replace,
}

impl DamageSeverity {
    /// Returns the snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for DamageSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DamageSeverity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "minor" => Ok(Self::Minor),
            "moderate" => Ok(Self::Moderate),
            "severe" => Ok(Self::Severe),
            "replace" => Ok(Self::Replace),
            _ => Err(ParseEnumError::InvalidValue("DamageSeverity", s.to_string())),
        }
    }
}

/// Quote provider channel.
///
/// The declaration order is the canonical order used in reports and
/// deterministic tie-breaking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    /// Internal assessor estimate.
    Assessor,
    /// Authorized dealer.
    Dealer,
    /// Independent garage.
    Independent,
    /// Insurance repair network.
    Network,
}

impl ProviderType {
    /// All provider channels.
    pub const ALL: [Self; 4] = [Self::Assessor, Self::Dealer, Self::Independent, Self::Network];

    /// Returns the snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assessor => "assessor",
            Self::Dealer => "dealer",
            Self::Independent => "independent",
            Self::Network => "network",
        }
    }

    /// Structural trust in the channel, independent of any assessment.
    #[must_use]
    pub const fn reliability_score(self) -> f64 {
        match self {
            Self::Dealer => 95.0,
            Self::Network => 90.0,
            Self::Assessor => 85.0,
            Self::Independent => 75.0,
        }
    }

    /// Bit used by [`ProviderSelection`](super::ProviderSelection).
    #[inline]
    #[must_use]
    pub(crate) const fn bit(self) -> u8 {
        match self {
            Self::Assessor => 0b0001,
            Self::Dealer => 0b0010,
            Self::Independent => 0b0100,
            Self::Network => 0b1000,
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "assessor" => Ok(Self::Assessor),
            "dealer" => Ok(Self::Dealer),
            "independent" => Ok(Self::Independent),
            "network" => Ok(Self::Network),
            _ => Err(ParseEnumError::InvalidValue("ProviderType", s.to_string())),
        }
    }
}

/// Quality tier of the quoted part.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    /// Original manufacturer part.
    Oem,
    /// Certified equivalent to OEM.
    OemEquivalent,
    /// Aftermarket part.
    Aftermarket,
    /// Used or salvaged part.
    Used,
}

impl QualityTier {
    /// Fixed 0-100 value of the tier used by quality scoring.
    #[must_use]
    pub const fn score(self) -> f64 {
        match self {
            Self::Oem => 100.0,
            Self::OemEquivalent => 85.0,
            Self::Aftermarket => 70.0,
            Self::Used => 50.0,
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Oem => "oem",
            Self::OemEquivalent => "oem_equivalent",
            Self::Aftermarket => "aftermarket",
            Self::Used => "used",
        };
        f.write_str(s)
    }
}

impl FromStr for QualityTier {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "oem" => Ok(Self::Oem),
            "oem_equivalent" => Ok(Self::OemEquivalent),
            "aftermarket" => Ok(Self::Aftermarket),
            "used" => Ok(Self::Used),
            _ => Err(ParseEnumError::InvalidValue("QualityTier", s.to_string())),
        }
    }
}

/// Quote lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Being prepared, not yet valid for statistics.
    Draft,
    /// Submitted by the provider.
    #[default]
    Submitted,
    /// Accepted for repair (frozen).
    Accepted,
    /// Rejected by the assessor.
    Rejected,
    /// Validity deadline passed.
    Expired,
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// Confidence in a market average.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Wide spread or little data.
    Low,
    /// Moderate spread.
    Medium,
    /// Tight spread with enough quotes.
    High,
}

impl ConfidenceLevel {
    /// Classifies a variance percentage: `< 10` high, `< 25` medium, else low.
    #[must_use]
    pub fn from_variance_percentage(variance_percentage: f64) -> Self {
        if variance_percentage < 10.0 {
            Self::High
        } else if variance_percentage < 25.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Returns the level one step lower (`Low` stays `Low`).
    #[must_use]
    pub const fn downgrade(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}
