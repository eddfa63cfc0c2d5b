//! Chain-agnostic account identifier.

use serde::{Deserialize, Serialize};

/// A generic, chain-agnostic identifier for an account: an admin, a
/// liquidity provider, a trader, the router, or the fee recipient.
///
/// Wraps a fixed-size `[u8; 32]` byte array.  The all-zero account is a
/// rejected sentinel in every admin setter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Account([u8; 32]);

impl Account {
    /// Creates an `Account` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 32-byte representation.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Returns the all-zero account.
    #[must_use]
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Returns `true` if this is the all-zero sentinel.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_and_sentinel() {
        let acct = Account::from_bytes([9u8; 32]);
        assert_eq!(acct.as_bytes(), [9u8; 32]);
        assert!(Account::zero().is_zero());
        assert!(!acct.is_zero());
    }
}
