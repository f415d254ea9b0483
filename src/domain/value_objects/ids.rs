//! # Identifiers
//!
//! UUID-backed identifiers for the engine's entities.
//!
//! [`DamagedPartId`] is derived deterministically from the assessment and the
//! part's normalized key so that re-running aggregation yields the same ids.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            #[inline]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[inline]
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Identifier of an inspection assessment.
    AssessmentId
);
uuid_id!(
    /// Identifier of a damaged part within an assessment.
    DamagedPartId
);
uuid_id!(
    /// Identifier of a quote request.
    QuoteRequestId
);
uuid_id!(
    /// Identifier of a provider quote.
    QuoteId
);
uuid_id!(
    /// Identifier of a domain event.
    EventId
);

impl DamagedPartId {
    /// Derives the identifier for a part key within an assessment.
    ///
    /// The same `(assessment, key)` always yields the same id.
    #[must_use]
    pub fn derive(assessment_id: AssessmentId, key: &str) -> Self {
        let name = format!("{}/{}", assessment_id, key);
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn derived_part_ids_are_stable() {
        let assessment = AssessmentId::new_v4();
        let a = DamagedPartId::derive(assessment, "front bumper|body");
        let b = DamagedPartId::derive(assessment, "front bumper|body");
        let c = DamagedPartId::derive(assessment, "front bumper|trim");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn derived_part_ids_differ_per_assessment() {
        let a = DamagedPartId::derive(AssessmentId::new_v4(), "hood|body");
        let b = DamagedPartId::derive(AssessmentId::new_v4(), "hood|body");
        assert_ne!(a, b);
    }

    #[test]
    fn parse_roundtrip() {
        let id = QuoteId::new_v4();
        let parsed: QuoteId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
