//! Fare amounts.

use std::fmt;

/// Error returned when a fare amount is out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fare: {reason}")]
pub struct InvalidFare {
    reason: &'static str,
}

/// A non-negative fare in minor currency units (e.g. paise).
///
/// Fares are stored as integers so that comparisons and sums never suffer
/// floating-point rounding. `Display` renders the amount with two decimals.
///
/// # Examples
///
/// ```
/// use bus_server::domain::Fare;
///
/// let fare = Fare::from_minor(6050);
/// assert_eq!(fare.to_string(), "60.50");
///
/// assert!(Fare::try_from_minor(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fare(u64);

impl Fare {
    /// Create a fare from a non-negative amount of minor units.
    pub fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Create a fare from a signed amount, as read back from storage.
    pub fn try_from_minor(minor: i64) -> Result<Self, InvalidFare> {
        u64::try_from(minor).map(Self).map_err(|_| InvalidFare {
            reason: "fare cannot be negative",
        })
    }

    /// Returns the amount in minor units.
    pub fn minor(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
