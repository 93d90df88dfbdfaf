//! Amount - Non-negative integer wrapper for flow amounts
//!
//! All flow amounts in GreyLedger MUST be non-negative integers.
//! No floats, no fractions, no currency conversion. This is enforced
//! at the type level.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when working with amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(i64),

    #[error("Amount must be an integer: {0}")]
    NonIntegerAmount(String),
}

/// A non-negative integer amount in minor units.
///
/// # Invariant
/// The inner value is always >= 0. This is enforced by the constructor.
///
/// # Example
/// ```
/// use greyledger_core::Amount;
///
/// let amount = Amount::new(100).unwrap();
/// assert_eq!(amount.value(), 100);
///
/// // Negative amounts are rejected
/// assert!(Amount::new(-100).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    /// Zero amount constant
    pub const ZERO: Self = Self(0);

    /// Create a new Amount from an integer.
    ///
    /// Returns an error if the value is negative.
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value < 0 {
            Err(AmountError::NegativeAmount(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Create an Amount from a JSON number.
    ///
    /// This is the boundary where a fractional amount can still arrive;
    /// it is rejected as non-integer before the sign check.
    pub fn from_json_number(value: &serde_json::Number) -> Result<Self, AmountError> {
        match value.as_i64() {
            Some(v) => Self::new(v),
            None => {
                if value.is_f64() {
                    Err(AmountError::NonIntegerAmount(value.to_string()))
                } else {
                    // u64 beyond i64::MAX
                    Err(AmountError::NonIntegerAmount(value.to_string()))
                }
            }
        }
    }

    /// Get the inner integer value
    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Check if the amount is zero
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition - returns None on overflow
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction - returns None if the result would be negative
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        let result = self.0.checked_sub(other.0)?;
        if result < 0 {
            None
        } else {
            Some(Amount(result))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}
