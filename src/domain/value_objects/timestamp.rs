//! # Timestamp Value Object
//!
//! UTC point in time used for request expiry, quote validity and
//! calculation dates.
//!
//! Every time-dependent computation takes an explicit `as_of` timestamp;
//! [`Timestamp::now`] is only read at the edges (managers, dispatcher).
//!
//! # Examples
//!
//! ```
//! use repair_quote::domain::value_objects::timestamp::Timestamp;
//!
//! let start = Timestamp::from_secs(1_700_000_000).unwrap();
//! let deadline = start.add_days(7);
//!
//! assert!(!deadline.is_expired_at(start));
//! assert!(deadline.is_expired_at(deadline.add_secs(1)));
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A UTC timestamp.
///
/// # Invariants
///
/// - Always in UTC timezone
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from Unix seconds.
    ///
    /// Returns `None` if the value is out of range.
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Creates a timestamp from Unix milliseconds.
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Returns the Unix timestamp in seconds.
    #[inline]
    #[must_use]
    pub fn timestamp_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Adds seconds (can be negative).
    #[must_use]
    pub fn add_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    /// Adds whole days (can be negative).
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Adds a chrono duration.
    #[must_use]
    pub fn add_duration(&self, duration: Duration) -> Self {
        Self(self.0 + duration)
    }

    /// Returns true if this deadline lies strictly before `as_of`.
    ///
    /// A deadline equal to `as_of` is still valid.
    #[inline]
    #[must_use]
    pub fn is_expired_at(&self, as_of: Self) -> bool {
        self.0 < as_of.0
    }

    /// Returns true if this deadline has passed now.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Self::now())
    }

    /// Returns true if this timestamp is before another.
    #[inline]
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self.0 < other.0
    }

    /// Returns true if this timestamp is after another.
    #[inline]
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.0 > other.0
    }

    /// Returns the duration until `other`, zero if `other` is not later.
    #[must_use]
    pub fn duration_until(&self, other: &Self) -> std::time::Duration {
        (other.0 - self.0)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }

    /// Whole days from `self` until `other`, rounded up, never negative.
    #[must_use]
    pub fn days_until_ceil(&self, other: &Self) -> u32 {
        let secs = (other.0 - self.0).num_seconds();
        if secs <= 0 {
            return 0;
        }
        let days = (secs + 86_399) / 86_400;
        u32::try_from(days).unwrap_or(u32::MAX)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl Add<std::time::Duration> for Timestamp {
    type Output = Self;

    fn add(self, rhs: std::time::Duration) -> Self::Output {
        Self(self.0 + Duration::from_std(rhs).unwrap_or(Duration::zero()))
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = std::time::Duration;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        rhs.duration_until(&self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> Timestamp {
        Timestamp::from_secs(1_700_000_000).unwrap()
    }

    mod arithmetic {
        use super::*;

        #[test]
        fn add_days_works() {
            assert_eq!(
                base().add_days(2).timestamp_secs(),
                1_700_000_000 + 2 * 86_400
            );
        }

        #[test]
        fn std_duration_add() {
            let later = base() + std::time::Duration::from_secs(30);
            assert_eq!(later.timestamp_secs(), 1_700_000_030);
        }

        #[test]
        fn difference_saturates_at_zero() {
            let a = base();
            let b = a.add_secs(10);
            assert_eq!(b - a, std::time::Duration::from_secs(10));
            assert_eq!(a - b, std::time::Duration::ZERO);
        }

        #[test]
        fn days_until_rounds_up() {
            let a = base();
            assert_eq!(a.days_until_ceil(&a.add_days(3)), 3);
            assert_eq!(a.days_until_ceil(&a.add_days(3).add_secs(1)), 4);
            assert_eq!(a.days_until_ceil(&a.add_secs(-5)), 0);
        }
    }

    mod expiry {
        use super::*;

        #[test]
        fn boundary_is_not_expired() {
            let deadline = base();
            assert!(!deadline.is_expired_at(deadline));
            assert!(deadline.is_expired_at(deadline.add_secs(1)));
        }

        #[test]
        fn far_past_is_expired_now() {
            assert!(Timestamp::from_secs(0).unwrap().is_expired());
            assert!(!Timestamp::now().add_secs(3600).is_expired());
        }
    }

    mod serde {
        use super::*;

        #[test]
        fn serializes_as_rfc3339() {
            let json = serde_json::to_string(&base()).unwrap();
            assert!(json.contains("2023-11-14"));
            let back: Timestamp = serde_json::from_str(&json).unwrap();
            assert_eq!(back, base());
        }
    }
}
