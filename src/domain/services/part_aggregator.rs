//! # Part Aggregator
//!
//! Merges raw per-section damage observations into the canonical set of
//! damaged parts of one assessment.
//!
//! Observations are grouped by normalized `(part_name, category)`. Within a
//! group the highest severity wins, descriptions are concatenated with
//! section attribution, the replacement flags are OR-ed and the labor
//! estimate is the maximum (duplicate mentions of the same physical part
//! never add up).
//!
//! # Examples
//!
//! ```
//! use repair_quote::domain::entities::RawObservation;
//! use repair_quote::domain::services::PartAggregator;
//! use repair_quote::domain::value_objects::{AssessmentId, DamageSeverity};
//! use rust_decimal::Decimal;
//!
//! let observations = vec![
//!     RawObservation::new("front", "Front Bumper", "body", DamageSeverity::Moderate, Decimal::new(2, 0)),
//!     RawObservation::new("left", "front bumper", "body", DamageSeverity::Severe, Decimal::new(3, 0)),
//! ];
//! let parts = PartAggregator::aggregate(AssessmentId::new_v4(), &observations).unwrap();
//! assert_eq!(parts.len(), 1);
//! assert_eq!(parts[0].severity(), DamageSeverity::Severe);
//! ```

use crate::domain::entities::damaged_part::{DamagedPart, RawObservation};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{AssessmentId, DamageSeverity, PartCategory};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Separator between attributed descriptions.
pub const DESCRIPTION_SEPARATOR: &str = "; ";

#[derive(Debug)]
struct Group {
    part_name: String,
    category: PartCategory,
    sections: Vec<String>,
    severity: DamageSeverity,
    descriptions: Vec<(String, String)>,
    requires_replacement: bool,
    labor_hours: Decimal,
}

impl Group {
    fn merge(&mut self, section: &str, obs: &RawObservation) {
        if !self.sections.iter().any(|s| s == section) {
            self.sections.push(section.to_string());
        }
        self.severity = self.severity.max(obs.severity);
        self.requires_replacement |= obs.requires_replacement;
        self.labor_hours = self.labor_hours.max(obs.labor_hours);
        let text = obs.description.as_deref().map(str::trim).unwrap_or_default();
        if !text.is_empty() && !self.descriptions.iter().any(|(_, d)| d == text) {
            self.descriptions.push((section.to_string(), text.to_string()));
        }
    }

    fn into_part(self, assessment_id: AssessmentId) -> DomainResult<DamagedPart> {
        let description = self
            .descriptions
            .iter()
            .map(|(section, text)| format!("[{section}] {text}"))
            .collect::<Vec<_>>()
            .join(DESCRIPTION_SEPARATOR);
        DamagedPart::new(
            assessment_id,
            self.sections,
            self.part_name,
            self.category,
            self.severity,
            description,
            self.requires_replacement,
            self.labor_hours,
        )
    }
}

/// Stateless part aggregation service.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartAggregator;

impl PartAggregator {
    /// Aggregates observations into damaged parts, in order of first appearance.
    ///
    /// All observations are validated before anything is produced.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` if an observation lacks a part
    /// name or category, names an unknown category, or has negative labor
    /// hours.
    pub fn aggregate(
        assessment_id: AssessmentId,
        observations: &[RawObservation],
    ) -> DomainResult<Vec<DamagedPart>> {
        let validated = observations
            .iter()
            .enumerate()
            .map(|(index, obs)| Self::validate(index, obs).map(|(name, cat)| (name, cat, obs)))
            .collect::<DomainResult<Vec<_>>>()?;

        let mut groups: Vec<Group> = Vec::new();
        let mut index_by_key: HashMap<String, usize> = HashMap::new();

        for (name, category, obs) in validated {
            let section = obs.section.trim();
            let key = DamagedPart::key_for(name, category);
            let slot = *index_by_key.entry(key).or_insert_with(|| {
                groups.push(Group {
                    part_name: name.to_string(),
                    category,
                    sections: Vec::new(),
                    severity: obs.severity,
                    descriptions: Vec::new(),
                    requires_replacement: false,
                    labor_hours: Decimal::ZERO,
                });
                groups.len() - 1
            });
            if let Some(group) = groups.get_mut(slot) {
                group.merge(section, obs);
            }
        }

        groups
            .into_iter()
            .map(|group| group.into_part(assessment_id))
            .collect()
    }

    fn validate(index: usize, obs: &RawObservation) -> DomainResult<(&str, PartCategory)> {
        let name = obs
            .part_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "observation {index} in section '{}' lacks a part name",
                    obs.section
                ))
            })?;
        let category = obs
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "observation {index} ({name}) lacks a category"
                ))
            })?
            .parse::<PartCategory>()
            .map_err(|e| DomainError::validation(format!("observation {index} ({name}): {e}")))?;
        if obs.labor_hours.is_sign_negative() && !obs.labor_hours.is_zero() {
            return Err(DomainError::validation(format!(
                "observation {index} ({name}) has negative labor hours: {}",
                obs.labor_hours
            )));
        }
        Ok((name, category))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn obs(section: &str, name: &str, category: &str, severity: DamageSeverity, hours: i64) -> RawObservation {
        RawObservation::new(section, name, category, severity, Decimal::new(hours, 0))
    }

    fn assessment() -> AssessmentId {
        AssessmentId::from_uuid(uuid::Uuid::from_u128(7))
    }

    mod merging {
        use super::*;

        #[test]
        fn duplicates_merge_with_max_severity_and_labor() {
            let observations = vec![
                obs("front", "Front Bumper", "body", DamageSeverity::Moderate, 3)
                    .with_description("scratched"),
                obs("left side", "front  bumper", "BODY", DamageSeverity::Severe, 2)
                    .with_description("cracked corner"),
                obs("front", "Headlight", "electrical", DamageSeverity::Replace, 1),
            ];
            let parts = PartAggregator::aggregate(assessment(), &observations).unwrap();
            assert_eq!(parts.len(), 2);

            let bumper = &parts[0];
            assert_eq!(bumper.part_name(), "Front Bumper");
            assert_eq!(bumper.severity(), DamageSeverity::Severe);
            assert_eq!(bumper.labor_hours(), Decimal::new(3, 0));
            assert_eq!(bumper.sections(), ["front", "left side"]);
            assert_eq!(
                bumper.description(),
                "[front] scratched; [left side] cracked corner"
            );
            assert!(!bumper.requires_replacement());

            let light = &parts[1];
            assert_eq!(light.category(), PartCategory::Electrical);
            assert!(light.requires_replacement());
        }

        #[test]
        fn same_name_different_category_stays_separate() {
            let observations = vec![
                obs("front", "Mirror", "glass", DamageSeverity::Minor, 1),
                obs("front", "Mirror", "trim", DamageSeverity::Minor, 1),
            ];
            let parts = PartAggregator::aggregate(assessment(), &observations).unwrap();
            assert_eq!(parts.len(), 2);
        }

        #[test]
        fn replacement_flag_is_ored() {
            let observations = vec![
                obs("a", "Hood", "body", DamageSeverity::Minor, 1),
                obs("b", "Hood", "body", DamageSeverity::Minor, 1).with_replacement(true),
            ];
            let parts = PartAggregator::aggregate(assessment(), &observations).unwrap();
            assert!(parts[0].requires_replacement());
        }

        #[test]
        fn repeated_descriptions_are_kept_once() {
            let observations = vec![
                obs("a", "Hood", "body", DamageSeverity::Minor, 1).with_description("dent"),
                obs("b", "Hood", "body", DamageSeverity::Minor, 1).with_description(" dent "),
                obs("c", "Hood", "body", DamageSeverity::Minor, 1).with_description(""),
            ];
            let parts = PartAggregator::aggregate(assessment(), &observations).unwrap();
            assert_eq!(parts[0].description(), "[a] dent");
        }

        #[test]
        fn rerun_is_idempotent() {
            let observations = vec![
                obs("a", "Hood", "body", DamageSeverity::Minor, 1),
                obs("b", "Door", "body", DamageSeverity::Severe, 4),
            ];
            let first = PartAggregator::aggregate(assessment(), &observations).unwrap();
            let second = PartAggregator::aggregate(assessment(), &observations).unwrap();
            assert_eq!(first, second);
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn missing_part_name_fails() {
            let mut o = obs("a", "Hood", "body", DamageSeverity::Minor, 1);
            o.part_name = None;
            let err = PartAggregator::aggregate(assessment(), &[o]).unwrap_err();
            assert!(matches!(err, DomainError::ValidationError(_)));
        }

        #[test]
        fn missing_category_fails() {
            let mut o = obs("a", "Hood", "body", DamageSeverity::Minor, 1);
            o.category = None;
            assert!(PartAggregator::aggregate(assessment(), &[o]).is_err());
        }

        #[test]
        fn unknown_category_fails() {
            let o = obs("a", "Hood", "wings", DamageSeverity::Minor, 1);
            assert!(PartAggregator::aggregate(assessment(), &[o]).is_err());
        }

        #[test]
        fn negative_labor_fails() {
            let o = obs("a", "Hood", "body", DamageSeverity::Minor, -1);
            assert!(PartAggregator::aggregate(assessment(), &[o]).is_err());
        }

        #[test]
        fn one_bad_observation_rejects_all() {
            let mut bad = obs("b", "Door", "body", DamageSeverity::Minor, 1);
            bad.part_name = Some("   ".into());
            let observations = vec![obs("a", "Hood", "body", DamageSeverity::Minor, 1), bad];
            assert!(PartAggregator::aggregate(assessment(), &observations).is_err());
        }

        #[test]
        fn empty_input_yields_nothing() {
            assert!(PartAggregator::aggregate(assessment(), &[]).unwrap().is_empty());
        }
    }
}
