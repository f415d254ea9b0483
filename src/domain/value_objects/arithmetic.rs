//! # Checked Arithmetic
//!
//! Overflow-checked [`Decimal`] operations behind every monetary figure:
//! quote totals, provider aggregates and market means.
//!
//! # Examples
//!
//! ```
//! use repair_quote::domain::value_objects::arithmetic::{CheckedArithmetic, checked_mean};
//! use rust_decimal::Decimal;
//!
//! let total = Decimal::new(350, 0).safe_add(Decimal::new(135, 0)).unwrap();
//! assert_eq!(total, Decimal::new(485, 0));
//! assert_eq!(checked_mean([Decimal::new(350, 0), Decimal::new(520, 0)]).unwrap(), Decimal::new(435, 0));
//! assert!(checked_mean([]).is_err());
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

/// Failure of a checked decimal operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ArithmeticError {
    /// Result exceeds the decimal range.
    #[error("arithmetic overflow")]
    Overflow,

    /// Result falls below the decimal range.
    #[error("arithmetic underflow")]
    Underflow,

    /// Divisor was zero.
    #[error("division by zero")]
    DivisionByZero,
}

/// Result of a checked decimal operation.
pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

/// Decimal operations that report overflow instead of panicking.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// `ArithmeticError::Overflow` when out of range.
    fn safe_add(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// `ArithmeticError::Underflow` when out of range.
    fn safe_sub(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Checked multiplication.
    ///
    /// # Errors
    ///
    /// `ArithmeticError::Overflow` when out of range.
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Checked division.
    ///
    /// # Errors
    ///
    /// `ArithmeticError::DivisionByZero` for a zero divisor.
    fn safe_div(self, rhs: Self) -> ArithmeticResult<Self>;
}

impl CheckedArithmetic for Decimal {
    #[inline]
    fn safe_add(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_add(rhs).ok_or(ArithmeticError::Overflow)
    }

    #[inline]
    fn safe_sub(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_sub(rhs).ok_or(ArithmeticError::Underflow)
    }

    #[inline]
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_mul(rhs).ok_or(ArithmeticError::Overflow)
    }

    #[inline]
    fn safe_div(self, rhs: Self) -> ArithmeticResult<Self> {
        if rhs.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        self.checked_div(rhs).ok_or(ArithmeticError::Overflow)
    }
}

/// Overflow-checked sum.
///
/// # Errors
///
/// Returns `ArithmeticError::Overflow` if the running sum overflows.
pub fn checked_sum<I>(values: I) -> ArithmeticResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.safe_add(value))
}

/// Unrounded arithmetic mean.
///
/// # Errors
///
/// Returns `ArithmeticError::DivisionByZero` for no values and
/// `ArithmeticError::Overflow` if the sum overflows.
pub fn checked_mean<I>(values: I) -> ArithmeticResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let (sum, count) = values
        .into_iter()
        .try_fold((Decimal::ZERO, 0u64), |(sum, count), value| {
            Ok::<_, ArithmeticError>((sum.safe_add(value)?, count + 1))
        })?;
    sum.safe_div(Decimal::from(count))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    #[test]
    fn quote_total_from_items() {
        let total = dec(350).safe_add(dec(135)).and_then(|t| t.safe_add(Decimal::new(5250, 2)));
        assert_eq!(total.unwrap(), Decimal::new(53750, 2));
    }

    #[test]
    fn paint_share_and_spread() {
        assert_eq!(dec(200).safe_mul(Decimal::new(15, 2)).unwrap(), dec(30));
        assert_eq!(dec(580).safe_sub(dec(350)).unwrap(), dec(230));
        assert_eq!(dec(230).safe_div(dec(4)).unwrap(), Decimal::new(575, 1));
    }

    #[test]
    fn range_errors_are_reported() {
        assert_eq!(Decimal::MAX.safe_add(Decimal::ONE), Err(ArithmeticError::Overflow));
        assert_eq!(dec(1).safe_div(Decimal::ZERO), Err(ArithmeticError::DivisionByZero));
        assert_eq!(ArithmeticError::DivisionByZero.to_string(), "division by zero");
    }

    #[test]
    fn sum_and_mean() {
        assert_eq!(checked_sum([dec(350), dec(390), dec(420), dec(580)]).unwrap(), dec(1740));
        assert_eq!(checked_sum([]).unwrap(), Decimal::ZERO);
        assert_eq!(checked_mean([dec(350), dec(390), dec(420), dec(580)]).unwrap(), dec(435));
        assert_eq!(checked_mean([]), Err(ArithmeticError::DivisionByZero));
    }
}
