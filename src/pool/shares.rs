//! Pool share accounting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Account, Amount, Timestamp};
use crate::error::{Result, SwapError};
use crate::traits::{ApprovalMessage, ApprovalVerifier, Signature};

/// Fungible claim tickets on a pool's liabilities.
///
/// Shares are minted on deposit and burned on withdrawal; each share is
/// worth `liabilities / supply` of the underlying asset, so LP fees
/// folded into liabilities accrue to holders without any per-holder
/// bookkeeping.
///
/// Mutations that pools interleave with external transfers come in
/// `check_*`/`commit_*` pairs: the check runs with the other fallible
/// preconditions, the commit runs after the external call succeeded and
/// cannot fail.
///
/// An allowance of [`Amount::MAX`] is infinite and is never decremented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLedger {
    supply: Amount,
    balances: BTreeMap<Account, Amount>,
    allowances: BTreeMap<(Account, Account), Amount>,
    nonces: BTreeMap<Account, u64>,
}

impl ShareLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total shares outstanding.
    #[must_use]
    pub const fn supply(&self) -> Amount {
        self.supply
    }

    /// Shares held by `owner`.
    #[must_use]
    pub fn balance_of(&self, owner: Account) -> Amount {
        self.balances.get(&owner).copied().unwrap_or(Amount::ZERO)
    }

    /// Shares `spender` may currently move on behalf of `owner`.
    #[must_use]
    pub fn allowance(&self, owner: Account, spender: Account) -> Amount {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Current approval nonce of `owner`.
    #[must_use]
    pub fn nonce(&self, owner: Account) -> u64 {
        self.nonces.get(&owner).copied().unwrap_or(0)
    }

    pub(crate) fn check_mint(&self, to: Account, amount: Amount) -> Result<()> {
        if to.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        if self.supply.checked_add(amount).is_none() {
            return Err(SwapError::Overflow("share supply"));
        }
        if self.balance_of(to).checked_add(amount).is_none() {
            return Err(SwapError::Overflow("share balance"));
        }
        Ok(())
    }

    /// Preconditions established by [`check_mint`](Self::check_mint).
    pub(crate) fn commit_mint(&mut self, to: Account, amount: Amount) {
        self.supply = self.supply.checked_add(amount).unwrap_or(Amount::MAX);
        let balance = self.balance_of(to).checked_add(amount).unwrap_or(Amount::MAX);
        self.balances.insert(to, balance);
    }

    pub(crate) fn check_burn(&self, from: Account, amount: Amount) -> Result<()> {
        if self.balance_of(from) < amount {
            return Err(SwapError::InsufficientShares);
        }
        Ok(())
    }

    /// Preconditions established by [`check_burn`](Self::check_burn).
    pub(crate) fn commit_burn(&mut self, from: Account, amount: Amount) {
        let balance = self
            .balance_of(from)
            .checked_sub(amount)
            .unwrap_or(Amount::ZERO);
        if balance.is_zero() {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, balance);
        }
        self.supply = self.supply.checked_sub(amount).unwrap_or(Amount::ZERO);
    }

    /// Grants `spender` an allowance of `amount` over `owner`'s shares,
    /// replacing any previous allowance.
    ///
    /// # Errors
    ///
    /// [`SwapError::ZeroAddress`] for a zero spender.
    pub fn approve(&mut self, owner: Account, spender: Account, amount: Amount) -> Result<()> {
        if spender.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        if amount.is_zero() {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
        Ok(())
    }

    /// Consumes `amount` of `spender`'s allowance over `owner`'s shares.
    /// An infinite ([`Amount::MAX`]) allowance is not decremented.
    ///
    /// # Errors
    ///
    /// [`SwapError::InsufficientShares`] when the allowance is too low.
    pub(crate) fn spend_allowance(
        &mut self,
        owner: Account,
        spender: Account,
        amount: Amount,
    ) -> Result<()> {
        let current = self.allowance(owner, spender);
        if current < amount {
            return Err(SwapError::InsufficientShares);
        }
        if current != Amount::MAX {
            let remaining = current.checked_sub(amount).unwrap_or(Amount::ZERO);
            if remaining.is_zero() {
                self.allowances.remove(&(owner, spender));
            } else {
                self.allowances.insert((owner, spender), remaining);
            }
        }
        Ok(())
    }

    /// Moves `amount` shares from `from` to `to`.
    ///
    /// # Errors
    ///
    /// [`SwapError::ZeroAddress`] for a zero recipient,
    /// [`SwapError::InsufficientShares`] for a short balance,
    /// [`SwapError::Overflow`] if the recipient balance would overflow.
    pub fn transfer(&mut self, from: Account, to: Account, amount: Amount) -> Result<()> {
        if to.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        let from_balance = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(SwapError::InsufficientShares)?;
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(SwapError::Overflow("share balance"))?;
        if from_balance.is_zero() {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, from_balance);
        }
        self.balances.insert(to, to_balance);
        Ok(())
    }

    /// Applies a signed off-ledger approval.
    ///
    /// The owner's current nonce must match the message and is consumed
    /// on success, so a message can never be replayed.
    ///
    /// # Errors
    ///
    /// [`SwapError::Expired`] past the message's expiry;
    /// [`SwapError::InvalidSignature`] on a nonce mismatch or a
    /// signature that does not verify.
    pub fn permit(
        &mut self,
        verifier: &dyn ApprovalVerifier,
        message: &ApprovalMessage,
        signature: &Signature,
        now: Timestamp,
    ) -> Result<()> {
        if now > message.expiry {
            return Err(SwapError::Expired);
        }
        if message.nonce != self.nonce(message.owner) {
            return Err(SwapError::InvalidSignature);
        }
        if !verifier.verify(message, signature) {
            return Err(SwapError::InvalidSignature);
        }
        self.approve(message.owner, message.spender, message.shares)?;
        self.nonces.insert(message.owner, message.nonce + 1);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    struct AcceptAll;

    impl ApprovalVerifier for AcceptAll {
        fn verify(&self, _message: &ApprovalMessage, _signature: &Signature) -> bool {
            true
        }
    }

    struct RejectAll;

    impl ApprovalVerifier for RejectAll {
        fn verify(&self, _message: &ApprovalMessage, _signature: &Signature) -> bool {
            false
        }
    }

    fn alice() -> Account {
        Account::from_bytes([1u8; 32])
    }

    fn bob() -> Account {
        Account::from_bytes([2u8; 32])
    }

    fn minted(owner: Account, amount: u128) -> ShareLedger {
        let mut ledger = ShareLedger::new();
        let Ok(()) = ledger.check_mint(owner, Amount::new(amount)) else {
            panic!("expected Ok");
        };
        ledger.commit_mint(owner, Amount::new(amount));
        ledger
    }

    fn message(shares: u128, nonce: u64, expiry: u64) -> ApprovalMessage {
        ApprovalMessage {
            owner: alice(),
            spender: bob(),
            shares: Amount::new(shares),
            nonce,
            expiry: Timestamp::from_secs(expiry),
        }
    }

    fn sig() -> Signature {
        Signature([0u8; 64])
    }

    #[test]
    fn mint_and_burn_track_supply() {
        let mut ledger = minted(alice(), 1_000);
        assert_eq!(ledger.supply(), Amount::new(1_000));
        assert_eq!(ledger.balance_of(alice()), Amount::new(1_000));

        let Ok(()) = ledger.check_burn(alice(), Amount::new(400)) else {
            panic!("expected Ok");
        };
        ledger.commit_burn(alice(), Amount::new(400));
        assert_eq!(ledger.supply(), Amount::new(600));
        assert_eq!(ledger.balance_of(alice()), Amount::new(600));
    }

    #[test]
    fn burn_more_than_balance_rejected() {
        let ledger = minted(alice(), 100);
        let r = ledger.check_burn(alice(), Amount::new(101));
        assert!(matches!(r, Err(SwapError::InsufficientShares)));
    }

    #[test]
    fn mint_to_zero_account_rejected() {
        let ledger = ShareLedger::new();
        let r = ledger.check_mint(Account::zero(), Amount::new(1));
        assert!(matches!(r, Err(SwapError::ZeroAddress)));
    }

    #[test]
    fn transfer_moves_balance() {
        let mut ledger = minted(alice(), 1_000);
        let Ok(()) = ledger.transfer(alice(), bob(), Amount::new(300)) else {
            panic!("expected Ok");
        };
        assert_eq!(ledger.balance_of(alice()), Amount::new(700));
        assert_eq!(ledger.balance_of(bob()), Amount::new(300));
        assert_eq!(ledger.supply(), Amount::new(1_000));
    }

    #[test]
    fn transfer_short_balance_rejected() {
        let mut ledger = minted(alice(), 10);
        let r = ledger.transfer(alice(), bob(), Amount::new(11));
        assert!(matches!(r, Err(SwapError::InsufficientShares)));
    }

    #[test]
    fn allowance_is_spent_down() {
        let mut ledger = minted(alice(), 1_000);
        let Ok(()) = ledger.approve(alice(), bob(), Amount::new(500)) else {
            panic!("expected Ok");
        };
        let Ok(()) = ledger.spend_allowance(alice(), bob(), Amount::new(200)) else {
            panic!("expected Ok");
        };
        assert_eq!(ledger.allowance(alice(), bob()), Amount::new(300));
        let r = ledger.spend_allowance(alice(), bob(), Amount::new(301));
        assert!(matches!(r, Err(SwapError::InsufficientShares)));
    }

    #[test]
    fn infinite_allowance_never_decrements() {
        let mut ledger = minted(alice(), 1_000);
        let Ok(()) = ledger.approve(alice(), bob(), Amount::MAX) else {
            panic!("expected Ok");
        };
        let Ok(()) = ledger.spend_allowance(alice(), bob(), Amount::new(999)) else {
            panic!("expected Ok");
        };
        assert_eq!(ledger.allowance(alice(), bob()), Amount::MAX);
    }

    #[test]
    fn permit_sets_allowance_and_consumes_nonce() {
        let mut ledger = minted(alice(), 1_000);
        let msg = message(500, 0, 2_000);
        let Ok(()) = ledger.permit(&AcceptAll, &msg, &sig(), Timestamp::from_secs(1_000)) else {
            panic!("expected Ok");
        };
        assert_eq!(ledger.allowance(alice(), bob()), Amount::new(500));
        assert_eq!(ledger.nonce(alice()), 1);

        // Replay of the same message fails on the consumed nonce.
        let r = ledger.permit(&AcceptAll, &msg, &sig(), Timestamp::from_secs(1_000));
        assert!(matches!(r, Err(SwapError::InvalidSignature)));
    }

    #[test]
    fn permit_past_expiry_rejected() {
        let mut ledger = minted(alice(), 1_000);
        let msg = message(500, 0, 999);
        let r = ledger.permit(&AcceptAll, &msg, &sig(), Timestamp::from_secs(1_000));
        assert!(matches!(r, Err(SwapError::Expired)));
    }

    #[test]
    fn permit_bad_signature_rejected() {
        let mut ledger = minted(alice(), 1_000);
        let msg = message(500, 0, 2_000);
        let r = ledger.permit(&RejectAll, &msg, &sig(), Timestamp::from_secs(1_000));
        assert!(matches!(r, Err(SwapError::InvalidSignature)));
        assert_eq!(ledger.nonce(alice()), 0);
    }
}
