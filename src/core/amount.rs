//! Arbitrary-precision game quantities
//!
//! HP, attack, defense and currency all grow past what `f64` can hold
//! exactly, so every quantity is an [`Amount`] backed by a big decimal.
//! At storage and transport boundaries an `Amount` is a plain decimal string.

use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_traits::{FromPrimitive, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::core::error::CombatError;

/// Opaque arbitrary-precision decimal value
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(BigDecimal);

impl Amount {
    pub fn zero() -> Self {
        Self(BigDecimal::zero())
    }

    pub fn from_u64(value: u64) -> Self {
        Self(BigDecimal::from(value))
    }

    /// Parse a decimal string such as `"1500"`, `"2.5"` or `"1e400"`
    pub fn parse(text: &str) -> Result<Self, CombatError> {
        BigDecimal::from_str(text.trim())
            .map(Self)
            .map_err(|e| CombatError::InvalidAmount(format!("{text:?}: {e}")))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > BigDecimal::zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < BigDecimal::zero()
    }

    /// Division, `None` when `divisor` is zero
    pub fn checked_div(&self, divisor: &Amount) -> Option<Amount> {
        if divisor.is_zero() {
            return None;
        }
        Some(Self(&self.0 / &divisor.0))
    }

    /// Multiply by a plain factor (enrage, ultimate)
    ///
    /// The factor is taken at its exact binary value, so prefer factors
    /// like 1.5 or 3.0; percentages go through integer multiply and divide.
    /// Non-finite factors collapse to zero.
    pub fn scale(&self, factor: f64) -> Amount {
        let factor = BigDecimal::from_f64(factor).unwrap_or_else(BigDecimal::zero);
        Self(&self.0 * &factor)
    }

    /// Drop the fractional part, rounding toward zero
    pub fn trunc(&self) -> Amount {
        Self(self.0.with_scale(0))
    }

    /// `self / other` as a float, for threshold checks only
    ///
    /// Returns 0.0 when `other` is zero.
    pub fn ratio(&self, other: &Amount) -> f64 {
        self.checked_div(other)
            .and_then(|q| q.0.to_f64())
            .unwrap_or(0.0)
    }

    pub fn clamp_min_zero(&self) -> Amount {
        if self.is_negative() {
            Self::zero()
        } else {
            self.clone()
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Amount {
    type Error = CombatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Amount> for String {
    fn from(value: Amount) -> Self {
        value.to_string()
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl<'a> Add<&'a Amount> for &'a Amount {
    type Output = Amount;
    fn add(self, rhs: &'a Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl<'a> Sub<&'a Amount> for &'a Amount {
    type Output = Amount;
    fn sub(self, rhs: &'a Amount) -> Amount {
        Amount(&self.0 - &rhs.0)
    }
}

impl<'a> Mul<&'a Amount> for &'a Amount {
    type Output = Amount;
    fn mul(self, rhs: &'a Amount) -> Amount {
        Amount(&self.0 * &rhs.0)
    }
}
