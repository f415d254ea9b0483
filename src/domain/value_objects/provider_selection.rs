//! # Provider Selection
//!
//! Non-empty set of provider channels chosen for a quote request.
//!
//! # Examples
//!
//! ```
//! use repair_quote::domain::value_objects::{ProviderSelection, ProviderType};
//!
//! let selection = ProviderSelection::new([ProviderType::Dealer, ProviderType::Assessor]).unwrap();
//! assert_eq!(selection.len(), 2);
//! // Iteration follows the canonical provider order.
//! assert_eq!(selection.iter().next(), Some(ProviderType::Assessor));
//! assert!(ProviderSelection::new([]).is_err());
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::enums::ProviderType;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-empty set of [`ProviderType`]s.
///
/// Duplicates collapse. Iteration is always in [`ProviderType::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<ProviderType>", into = "Vec<ProviderType>")]
pub struct ProviderSelection {
    bits: u8,
}

impl ProviderSelection {
    /// Creates a selection from the given providers.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` if no provider is given.
    pub fn new(providers: impl IntoIterator<Item = ProviderType>) -> DomainResult<Self> {
        let bits = providers.into_iter().fold(0u8, |acc, p| acc | p.bit());
        if bits == 0 {
            return Err(DomainError::validation(
                "provider selection must not be empty",
            ));
        }
        Ok(Self { bits })
    }

    /// Selects every provider channel.
    #[must_use]
    pub fn all() -> Self {
        Self {
            bits: ProviderType::ALL.iter().fold(0, |acc, p| acc | p.bit()),
        }
    }

    /// Returns true if the provider is selected.
    #[inline]
    #[must_use]
    pub const fn contains(&self, provider: ProviderType) -> bool {
        self.bits & provider.bit() != 0
    }

    /// Number of selected providers.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Always false; a selection is never empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Iterates the selected providers in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = ProviderType> + '_ {
        ProviderType::ALL
            .into_iter()
            .filter(move |p| self.contains(*p))
    }
}

impl TryFrom<Vec<ProviderType>> for ProviderSelection {
    type Error = DomainError;

    fn try_from(value: Vec<ProviderType>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProviderSelection> for Vec<ProviderType> {
    fn from(selection: ProviderSelection) -> Self {
        selection.iter().collect()
    }
}

impl JsonSchema for ProviderSelection {
    fn schema_name() -> String {
        "ProviderSelection".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        <Vec<ProviderType>>::json_schema(generator)
    }
}

impl fmt::Display for ProviderSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(ProviderType::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse() {
        let s = ProviderSelection::new([ProviderType::Dealer, ProviderType::Dealer]).unwrap();
        assert_eq!(s.len(), 1);
        assert!(s.contains(ProviderType::Dealer));
        assert!(!s.contains(ProviderType::Network));
    }

    #[test]
    fn all_contains_four() {
        let s = ProviderSelection::all();
        assert_eq!(s.len(), 4);
        assert_eq!(s.to_string(), "[assessor, dealer, independent, network]");
    }

    #[test]
    fn serde_rejects_empty_list() {
        assert!(serde_json::from_str::<ProviderSelection>("[]").is_err());
        let s: ProviderSelection = serde_json::from_str("[\"network\",\"dealer\"]").unwrap();
        assert_eq!(
            serde_json::to_string(&s).unwrap(),
            "[\"dealer\",\"network\"]"
        );
    }
}
