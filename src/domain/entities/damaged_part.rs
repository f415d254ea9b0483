//! # Damaged Part Entity
//!
//! One physical vehicle component with assessed damage, plus the raw
//! per-section observation it is aggregated from.
//!
//! A part is unique per `(assessment, normalized name, category)`. Once a
//! quote request is sent for it the part is locked and its content can no
//! longer change.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{
    AssessmentId, DamageSeverity, DamagedPartId, PartCategory,
};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw damage observation from one inspection section.
///
/// Fields are kept loose (optional strings) because they come straight
/// from the inspection form; [`PartAggregator`](crate::domain::services::PartAggregator)
/// validates them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawObservation {
    /// Inspection section the observation was made in.
    pub section: String,
    /// Name of the damaged component.
    #[serde(default)]
    pub part_name: Option<String>,
    /// Category name (`body`, `mechanical`, ...).
    #[serde(default)]
    pub category: Option<String>,
    /// Severity as observed.
    pub severity: DamageSeverity,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the inspector flagged the part for replacement.
    #[serde(default)]
    pub requires_replacement: bool,
    /// Labor hour estimate.
    #[serde(default)]
    pub labor_hours: Decimal,
}

impl RawObservation {
    /// Creates an observation with the required fields.
    #[must_use]
    pub fn new(
        section: impl Into<String>,
        part_name: impl Into<String>,
        category: impl Into<String>,
        severity: DamageSeverity,
        labor_hours: Decimal,
    ) -> Self {
        Self {
            section: section.into(),
            part_name: Some(part_name.into()),
            category: Some(category.into()),
            severity,
            description: None,
            requires_replacement: false,
            labor_hours,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the replacement flag.
    #[must_use]
    pub fn with_replacement(mut self, requires_replacement: bool) -> Self {
        self.requires_replacement = requires_replacement;
        self
    }
}

/// Normalizes a part name: trims, collapses inner whitespace, lowercases.
#[must_use]
pub fn normalize_part_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A canonical damaged part within one assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DamagedPart {
    id: DamagedPartId,
    assessment_id: AssessmentId,
    sections: Vec<String>,
    part_name: String,
    category: PartCategory,
    severity: DamageSeverity,
    description: String,
    requires_replacement: bool,
    labor_hours: Decimal,
    locked: bool,
}

impl DamagedPart {
    /// Creates a damaged part; the id is derived from the assessment,
    /// normalized name and category.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` if the name is blank or the
    /// labor hours are negative.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        assessment_id: AssessmentId,
        sections: Vec<String>,
        part_name: impl Into<String>,
        category: PartCategory,
        severity: DamageSeverity,
        description: impl Into<String>,
        requires_replacement: bool,
        labor_hours: Decimal,
    ) -> DomainResult<Self> {
        let part_name = part_name.into().split_whitespace().collect::<Vec<_>>().join(" ");
        if part_name.is_empty() {
            return Err(DomainError::validation("part name must not be empty"));
        }
        if labor_hours.is_sign_negative() && !labor_hours.is_zero() {
            return Err(DomainError::validation(format!(
                "labor hours must not be negative: {labor_hours}"
            )));
        }
        let id = DamagedPartId::derive(assessment_id, &Self::key_for(&part_name, category));
        Ok(Self {
            id,
            assessment_id,
            sections,
            part_name,
            category,
            severity,
            description: description.into(),
            requires_replacement: requires_replacement || severity == DamageSeverity::Replace,
            labor_hours,
            locked: false,
        })
    }

    /// Grouping key for a name and category.
    #[must_use]
    pub fn key_for(part_name: &str, category: PartCategory) -> String {
        format!("{}|{}", normalize_part_name(part_name), category)
    }

    /// Returns this part's grouping key.
    #[must_use]
    pub fn key(&self) -> String {
        Self::key_for(&self.part_name, self.category)
    }

    /// Locks the part once a quote request is sent for it.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Returns true if the part content differs from `other`, ignoring the lock.
    #[must_use]
    pub fn content_differs(&self, other: &Self) -> bool {
        self.sections != other.sections
            || self.part_name != other.part_name
            || self.severity != other.severity
            || self.description != other.description
            || self.requires_replacement != other.requires_replacement
            || self.labor_hours != other.labor_hours
    }

    /// Returns the part ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> DamagedPartId {
        self.id
    }

    /// Returns the owning assessment.
    #[inline]
    #[must_use]
    pub fn assessment_id(&self) -> AssessmentId {
        self.assessment_id
    }

    /// Sections the part was observed in, first-seen order.
    #[inline]
    #[must_use]
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    /// Display name (first occurrence).
    #[inline]
    #[must_use]
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    /// Part category.
    #[inline]
    #[must_use]
    pub fn category(&self) -> PartCategory {
        self.category
    }

    /// Merged severity.
    #[inline]
    #[must_use]
    pub fn severity(&self) -> DamageSeverity {
        self.severity
    }

    /// Merged description.
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the part must be replaced.
    #[inline]
    #[must_use]
    pub fn requires_replacement(&self) -> bool {
        self.requires_replacement
    }

    /// Estimated labor hours.
    #[inline]
    #[must_use]
    pub fn labor_hours(&self) -> Decimal {
        self.labor_hours
    }

    /// Returns true once a quote request was sent for the part.
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl fmt::Display for DamagedPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.part_name, self.category, self.severity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn part(name: &str, severity: DamageSeverity) -> DamagedPart {
        DamagedPart::new(
            AssessmentId::from_uuid(uuid::Uuid::nil()),
            vec!["front".to_string()],
            name,
            PartCategory::Body,
            severity,
            "",
            false,
            Decimal::new(2, 0),
        )
        .unwrap()
    }

    #[test]
    fn normalization_collapses_whitespace_and_case() {
        assert_eq!(normalize_part_name("  Front   BUMPER "), "front bumper");
    }

    #[test]
    fn same_key_same_id() {
        let a = part("Front Bumper", DamageSeverity::Minor);
        let b = part("front  bumper", DamageSeverity::Severe);
        assert_eq!(a.id(), b.id());
        assert_eq!(a.key(), "front bumper|body");
    }

    #[test]
    fn replace_severity_implies_replacement() {
        assert!(part("Hood", DamageSeverity::Replace).requires_replacement());
        assert!(!part("Hood", DamageSeverity::Severe).requires_replacement());
    }

    #[test]
    fn negative_labor_is_rejected() {
        let result = DamagedPart::new(
            AssessmentId::new_v4(),
            vec![],
            "Hood",
            PartCategory::Body,
            DamageSeverity::Minor,
            "",
            false,
            Decimal::new(-1, 0),
        );
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn content_comparison_ignores_lock() {
        let a = part("Hood", DamageSeverity::Minor);
        let mut b = a.clone();
        b.lock();
        assert!(!a.content_differs(&b));
        assert!(a.content_differs(&part("Hood", DamageSeverity::Moderate)));
    }

    #[test]
    fn raw_observation_deserializes_with_missing_fields() {
        let json = r#"{"section":"rear","severity":"moderate"}"#;
        let obs: RawObservation = serde_json::from_str(json).unwrap();
        assert!(obs.part_name.is_none());
        assert_eq!(obs.labor_hours, Decimal::ZERO);
    }
}
