//! External asset custody.

use crate::domain::{Account, Amount, AssetId};
use crate::error::Result;

/// Custody of underlying assets, implemented by the host.
///
/// The engine holds assets in omnibus form: `debit` moves tokens from a
/// user into the engine's custody, `credit` moves them back out.  Both
/// are *fallible external calls* — the engine sequences its own state
/// changes so that a failed transfer never leaves the ledger partially
/// updated (fallible calls first, infallible commit last, or a
/// compensating restore when a later call fails).
pub trait TokenLedger {
    /// Pulls `amount` of `asset` from `from` into engine custody.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::TransferFailed`] (or any host error) when
    /// the transfer cannot be completed; the engine treats any error as
    /// "nothing moved".
    ///
    /// [`SwapError::TransferFailed`]: crate::error::SwapError::TransferFailed
    fn debit(&mut self, asset: AssetId, from: Account, amount: Amount) -> Result<()>;

    /// Pushes `amount` of `asset` from engine custody to `to`.
    ///
    /// # Errors
    ///
    /// Same contract as [`debit`](Self::debit).
    fn credit(&mut self, asset: AssetId, to: Account, amount: Amount) -> Result<()>;

    /// Current balance of `owner` in `asset`.
    fn balance_of(&self, asset: AssetId, owner: Account) -> Amount;
}
