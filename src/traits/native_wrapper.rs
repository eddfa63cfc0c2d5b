//! Native-asset wrapping.

use crate::domain::{Account, Amount};
use crate::error::Result;
use crate::traits::TokenLedger;

/// Wraps and unwraps the chain-native asset at the router boundary.
///
/// Pools only ever hold the wrapped representation; the router's native
/// entry points call `wrap` on the way in and `unwrap` on the way out so
/// callers can trade the native asset directly.
pub trait NativeWrapper {
    /// Converts `amount` of native asset into wrapped tokens credited to
    /// `to` on `ledger`.
    ///
    /// # Errors
    ///
    /// Any host error; the engine treats an error as "nothing moved".
    fn wrap(&self, ledger: &mut dyn TokenLedger, to: Account, amount: Amount) -> Result<()>;

    /// Converts `amount` of wrapped tokens held by `from` back into
    /// native asset.
    ///
    /// # Errors
    ///
    /// Same contract as [`wrap`](Self::wrap).
    fn unwrap(&self, ledger: &mut dyn TokenLedger, from: Account, amount: Amount) -> Result<()>;
}
