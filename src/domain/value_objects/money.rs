//! # Money Value Object
//!
//! Non-negative decimal amount used for every itemized and total cost.
//!
//! # Examples
//!
//! ```
//! use repair_quote::domain::value_objects::Money;
//! use rust_decimal::Decimal;
//!
//! let part = Money::new(Decimal::new(35000, 2)).unwrap();
//! let labor = Money::from(90u32);
//! assert_eq!(part.safe_add(labor).unwrap(), Money::new(Decimal::new(440, 0)).unwrap());
//! assert!(Money::new(Decimal::new(-1, 0)).is_err());
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::arithmetic::{ArithmeticResult, CheckedArithmetic};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative monetary amount.
///
/// # Invariants
///
/// - Never negative
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a monetary amount.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if the amount is negative.
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::InvalidAmount(format!(
                "amount must not be negative: {}",
                amount
            )));
        }
        Ok(Self(amount))
    }

    /// Returns a zero amount.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the inner decimal.
    #[inline]
    #[must_use]
    pub const fn get(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Converts to `f64` for scoring; precision loss is acceptable there.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    /// Rounds to cents.
    #[must_use]
    pub fn round_cents(&self) -> Self {
        Self(self.0.round_dp(2))
    }

    /// Adds two amounts.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` on overflow.
    pub fn safe_add(self, rhs: Self) -> ArithmeticResult<Self> {
        self.0.safe_add(rhs.0).map(Self)
    }

    /// Multiplies by a non-negative factor.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` for a negative factor and
    /// `DomainError::Arithmetic` on overflow.
    pub fn safe_mul(self, factor: Decimal) -> DomainResult<Self> {
        let product = self.0.safe_mul(factor)?;
        Self::new(product)
    }

    /// Subtracts, saturating at zero.
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if rhs.0 >= self.0 {
            Self::zero()
        } else {
            Self(self.0 - rhs.0)
        }
    }

    /// Sums amounts with overflow checking.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` on overflow.
    pub fn sum<I>(amounts: I) -> ArithmeticResult<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::zero(), |acc, amount| acc.safe_add(amount))
    }
}

impl From<u32> for Money {
    fn from(units: u32) -> Self {
        Self(Decimal::from(units))
    }
}

impl TryFrom<Decimal> for Money {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
