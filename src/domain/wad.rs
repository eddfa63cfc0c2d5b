//! 18-decimal fixed-point fraction.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Amount, Rounding};
use crate::error::Result;
use crate::math::mul_div;

/// Scale factor: `1.0` in 18-decimal fixed point.
const WAD: u128 = 1_000_000_000_000_000_000;

/// An 18-decimal fixed-point fraction (`1e18` = 1.0).
///
/// `Wad` carries every fraction in the engine: fee rates, slippage
/// penalties, coverage ratios, oracle prices, and price-per-share.  All
/// multiplication and division route through the 256-bit
/// [`mul_div`](crate::math::mul_div) so products of two wads never
/// overflow silently.
///
/// # Examples
///
/// ```
/// use tranche_amm::domain::{Rounding, Wad};
///
/// let half = Wad::from_ratio(1, 2, Rounding::Down).unwrap();
/// let quarter = half.mul(half, Rounding::Down).unwrap();
/// assert_eq!(quarter, Wad::from_ratio(1, 4, Rounding::Down).unwrap());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
#[must_use]
pub struct Wad(u128);

impl Wad {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// One (`1e18`).
    pub const ONE: Self = Self(WAD);

    /// Largest representable fraction; stands in for an infinite
    /// coverage ratio when liabilities are zero.
    pub const MAX: Self = Self(u128::MAX);

    /// Creates a `Wad` from a raw 18-decimal fixed-point value.
    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Returns the raw 18-decimal fixed-point value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if the fraction is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Builds the fraction `numerator / denominator`.
    ///
    /// # Errors
    ///
    /// [`SwapError::DivisionByZero`](crate::error::SwapError) if the
    /// denominator is zero, [`SwapError::Overflow`](crate::error::SwapError)
    /// if the scaled ratio exceeds the representable range.
    pub fn from_ratio(numerator: u128, denominator: u128, rounding: Rounding) -> Result<Self> {
        Ok(Self(mul_div(numerator, WAD, denominator, rounding)?))
    }

    /// Checked addition.
    #[must_use]
    pub const fn checked_add(&self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction.
    #[must_use]
    pub const fn checked_sub(&self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating subtraction; clamps at zero.
    pub const fn saturating_sub(&self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Absolute difference.
    pub const fn abs_diff(&self, other: Self) -> Self {
        Self(self.0.abs_diff(other.0))
    }

    /// Returns the smaller of the two fractions.
    pub const fn min(self, other: Self) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Fixed-point multiplication: `self × other / 1e18`.
    ///
    /// # Errors
    ///
    /// Propagates overflow from [`mul_div`](crate::math::mul_div).
    pub fn mul(&self, other: Self, rounding: Rounding) -> Result<Self> {
        Ok(Self(mul_div(self.0, other.0, WAD, rounding)?))
    }

    /// Fixed-point division: `self × 1e18 / other`.
    ///
    /// # Errors
    ///
    /// [`SwapError::DivisionByZero`](crate::error::SwapError) if `other`
    /// is zero; overflow if the quotient exceeds the range.
    pub fn div(&self, other: Self, rounding: Rounding) -> Result<Self> {
        Ok(Self(mul_div(self.0, WAD, other.0, rounding)?))
    }

    /// Integer power by repeated fixed-point multiplication, rounding
    /// down at every step.  `powi(0)` is one.
    ///
    /// # Errors
    ///
    /// Propagates overflow from intermediate products.
    pub fn powi(&self, mut exp: u32) -> Result<Self> {
        let mut base = *self;
        let mut acc = Self::ONE;
        while exp > 0 {
            if exp & 1 == 1 {
                acc = acc.mul(base, Rounding::Down)?;
            }
            exp >>= 1;
            if exp > 0 {
                base = base.mul(base, Rounding::Down)?;
            }
        }
        Ok(acc)
    }

    /// Scales a raw token amount by this fraction:
    /// `amount × self / 1e18`.
    ///
    /// # Errors
    ///
    /// Propagates overflow from [`mul_div`](crate::math::mul_div).
    pub fn apply(&self, amount: Amount, rounding: Rounding) -> Result<Amount> {
        Ok(Amount::new(mul_div(amount.get(), self.0, WAD, rounding)?))
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / WAD;
        let frac = self.0 % WAD;
        if frac == 0 {
            write!(f, "{int}")
        } else {
            let s = format!("{frac:018}");
            write!(f, "{int}.{}", s.trim_end_matches('0'))
        }
    }
}
