//! Token decimal places.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwapError};

/// Highest supported decimal count; `10^30` still fits comfortably in
/// `u128` alongside an 18-decimal price.
const MAX_DECIMALS: u8 = 30;

/// Number of decimal places of an asset's native unit.
///
/// Conversion between native units and the 18-decimal unit of account
/// multiplies or divides by [`scale`](Self::scale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Decimals(u8);

impl Decimals {
    /// Creates a `Decimals`, validating the supported range.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::InvalidConfiguration`] above 30 decimals.
    pub const fn new(value: u8) -> Result<Self> {
        if value > MAX_DECIMALS {
            return Err(SwapError::InvalidConfiguration("decimals exceed 30"));
        }
        Ok(Self(value))
    }

    /// Returns the decimal count.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Returns `10^decimals`, the number of native units per whole token.
    #[must_use]
    pub const fn scale(&self) -> u128 {
        10u128.pow(self.0 as u32)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn valid_range() {
        let Ok(d) = Decimals::new(6) else {
            panic!("expected Ok");
        };
        assert_eq!(d.get(), 6);
        assert_eq!(d.scale(), 1_000_000);
    }

    #[test]
    fn upper_bound() {
        assert!(Decimals::new(30).is_ok());
        assert!(Decimals::new(31).is_err());
    }

    #[test]
    fn zero_decimals() {
        let Ok(d) = Decimals::new(0) else {
            panic!("expected Ok");
        };
        assert_eq!(d.scale(), 1);
    }
}
