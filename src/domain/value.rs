//! USD value in the common unit of account.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A value denominated in the exchange's common unit of account (USD),
/// carried in 18-decimal fixed point regardless of any asset's native
/// decimals.
///
/// `Value` is the currency swaps are routed through: the sell leg
/// produces a `Value`, the buy leg consumes one.  Arithmetic is checked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
#[must_use]
pub struct Value(u128);

impl Value {
    /// Zero value.
    pub const ZERO: Self = Self(0);

    /// Creates a `Value` from a raw 18-decimal fixed-point USD quantity.
    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Returns the raw 18-decimal fixed-point USD quantity.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if the value is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
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
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
