//! # Vehicle Context
//!
//! Make, model and year of the inspected vehicle, forwarded to providers.

use crate::domain::errors::{DomainError, DomainResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Earliest model year accepted.
pub const MIN_MODEL_YEAR: u16 = 1900;

/// Vehicle identification needed by external providers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct VehicleContext {
    make: String,
    model: String,
    year: u16,
}

impl VehicleContext {
    /// Creates a vehicle context.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` if make or model is blank or the
    /// year is before [`MIN_MODEL_YEAR`].
    pub fn new(make: impl Into<String>, model: impl Into<String>, year: u16) -> DomainResult<Self> {
        let make = make.into().trim().to_string();
        let model = model.into().trim().to_string();
        if make.is_empty() {
            return Err(DomainError::validation("vehicle make must not be empty"));
        }
        if model.is_empty() {
            return Err(DomainError::validation("vehicle model must not be empty"));
        }
        if year < MIN_MODEL_YEAR {
            return Err(DomainError::validation(format!(
                "vehicle year {year} is before {MIN_MODEL_YEAR}"
            )));
        }
        Ok(Self { make, model, year })
    }

    /// Vehicle make.
    #[inline]
    #[must_use]
    pub fn make(&self) -> &str {
        &self.make
    }

    /// Vehicle model.
    #[inline]
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Model year.
    #[inline]
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }
}

impl fmt::Display for VehicleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.year, self.make, self.model)
    }
}
