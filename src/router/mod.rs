//! User-facing entry point for swaps and liquidity.
//!
//! The router is the only account pools accept calls from.  It stitches
//! the two legs of a swap together through the USD unit of account,
//! enforces caller-supplied minimum-output bounds and deadlines, and
//! handles wrapping for the chain-native asset.
//!
//! Every operation quotes before it executes: the bounds are checked
//! against the quote while no state has moved, and because execution
//! reuses the exact quoting arithmetic, the realized outcome always
//! equals the quote.  The only fallible step left after the first leg
//! of a swap is the second leg's outbound transfer; if that fails, the
//! sell-leg pool is restored from a snapshot and the input refunded.

use crate::domain::{Account, Amount, AssetId, Timestamp, Value, Wad};
use crate::error::{Result, SwapError};
use crate::factory::Factory;
use crate::traits::{ApprovalMessage, ApprovalVerifier, NativeWrapper, Signature, TokenLedger};

/// The swap router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Router {
    account: Account,
    wrapped_native: AssetId,
}

impl Router {
    /// Creates a router.
    ///
    /// `account` is the identity pools must be configured to accept
    /// (via [`Factory::set_router`]); `wrapped_native` is the asset the
    /// native variants wrap into.
    ///
    /// # Errors
    ///
    /// [`SwapError::ZeroAddress`] for a zero account or asset.
    pub fn new(account: Account, wrapped_native: AssetId) -> Result<Self> {
        if account.is_zero() || wrapped_native.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        Ok(Self {
            account,
            wrapped_native,
        })
    }

    /// The router's account identity.
    #[must_use]
    pub const fn account(&self) -> Account {
        self.account
    }

    /// The wrapped representation of the chain-native asset.
    #[must_use]
    pub const fn wrapped_native(&self) -> AssetId {
        self.wrapped_native
    }

    fn ensure_deadline(now: Timestamp, deadline: Timestamp) -> Result<()> {
        if now > deadline {
            return Err(SwapError::Expired);
        }
        Ok(())
    }

    // -- quoting -------------------------------------------------------------

    /// Quotes a two-leg swap end to end without touching any state.
    ///
    /// # Errors
    ///
    /// [`SwapError::SameToken`], [`SwapError::PoolNotFound`], oracle
    /// errors, and quote errors from either leg.
    pub fn get_amount_out(
        &self,
        factory: &Factory,
        amount_in: Amount,
        asset_in: AssetId,
        asset_out: AssetId,
        now: Timestamp,
    ) -> Result<Amount> {
        let (value, price_out) = Self::quote_sell_leg(factory, amount_in, asset_in, asset_out, now)?;
        if value.is_zero() {
            return Ok(Amount::ZERO);
        }
        let pool_out = factory.pool(asset_out).ok_or(SwapError::PoolNotFound)?;
        Ok(pool_out.quote_swap_out(value, price_out, now)?.amount_out)
    }

    /// Sell-leg quote shared by [`get_amount_out`](Self::get_amount_out)
    /// and execution; also resolves the buy-leg price so a swap fails
    /// fast on oracle problems.
    fn quote_sell_leg(
        factory: &Factory,
        amount_in: Amount,
        asset_in: AssetId,
        asset_out: AssetId,
        now: Timestamp,
    ) -> Result<(Value, Wad)> {
        if asset_in == asset_out {
            return Err(SwapError::SameToken);
        }
        let price_in = factory.oracle().get_price(asset_in, now)?;
        let price_out = factory.oracle().get_price(asset_out, now)?;
        let pool_in = factory.pool(asset_in).ok_or(SwapError::PoolNotFound)?;
        factory.pool(asset_out).ok_or(SwapError::PoolNotFound)?;
        let quote = pool_in.quote_swap_in(amount_in, price_in, now)?;
        Ok((quote.value, price_out))
    }

    // -- liquidity -----------------------------------------------------------

    /// Deposits `amount` of `asset` for `caller`, minting shares to
    /// `to`.  Returns the shares minted.
    ///
    /// # Errors
    ///
    /// [`SwapError::Expired`] past the deadline;
    /// [`SwapError::InsufficientLiquidityAmount`] if the minted shares
    /// would fall below `min_shares`; pool and transfer errors.
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        &self,
        factory: &mut Factory,
        ledger: &mut dyn TokenLedger,
        caller: Account,
        asset: AssetId,
        amount: Amount,
        min_shares: Amount,
        to: Account,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Result<Amount> {
        Self::ensure_deadline(now, deadline)?;
        let pool = factory.pool_mut(asset)?;
        if pool.quote_deposit(amount)?.shares < min_shares {
            return Err(SwapError::InsufficientLiquidityAmount);
        }
        pool.deposit(self.account, ledger, caller, to, amount, now)
    }

    /// Native-asset variant of [`add_liquidity`](Self::add_liquidity):
    /// wraps `amount` of the caller's native asset, then deposits the
    /// wrapped tokens.
    ///
    /// The wrap runs only after every precondition has been checked, so
    /// a rejected deposit leaves the caller's native balance untouched.
    ///
    /// # Errors
    ///
    /// As [`add_liquidity`](Self::add_liquidity), plus wrap errors.
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity_native(
        &self,
        factory: &mut Factory,
        ledger: &mut dyn TokenLedger,
        wrapper: &dyn NativeWrapper,
        caller: Account,
        amount: Amount,
        min_shares: Amount,
        to: Account,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Result<Amount> {
        Self::ensure_deadline(now, deadline)?;
        let asset = self.wrapped_native;
        let pool = factory.pool_mut(asset)?;
        if pool.quote_deposit(amount)?.shares < min_shares {
            return Err(SwapError::InsufficientLiquidityAmount);
        }
        wrapper.wrap(ledger, caller, amount)?;
        pool.deposit(self.account, ledger, caller, to, amount, now)
    }

    /// Burns `shares` of the caller's pool shares, paying the
    /// underlying to `to`.  Returns the payout.
    ///
    /// # Errors
    ///
    /// [`SwapError::Expired`];
    /// [`SwapError::InsufficientTokenAmount`] if the payout would fall
    /// below `min_amount`; pool and transfer errors.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        &self,
        factory: &mut Factory,
        ledger: &mut dyn TokenLedger,
        caller: Account,
        asset: AssetId,
        shares: Amount,
        min_amount: Amount,
        to: Account,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Result<Amount> {
        Self::ensure_deadline(now, deadline)?;
        let pool = factory.pool_mut(asset)?;
        if pool.quote_withdraw(shares)?.payout < min_amount {
            return Err(SwapError::InsufficientTokenAmount);
        }
        pool.withdraw(self.account, ledger, caller, to, shares, now)
    }

    /// Native-asset variant of
    /// [`remove_liquidity`](Self::remove_liquidity): withdraws wrapped
    /// tokens to `to`, then unwraps them into the native asset.
    ///
    /// # Errors
    ///
    /// As [`remove_liquidity`](Self::remove_liquidity), plus unwrap
    /// errors.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity_native(
        &self,
        factory: &mut Factory,
        ledger: &mut dyn TokenLedger,
        wrapper: &dyn NativeWrapper,
        caller: Account,
        shares: Amount,
        min_amount: Amount,
        to: Account,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Result<Amount> {
        let payout = self.remove_liquidity(
            factory,
            ledger,
            caller,
            self.wrapped_native,
            shares,
            min_amount,
            to,
            deadline,
            now,
        )?;
        wrapper.unwrap(ledger, to, payout)?;
        Ok(payout)
    }

    /// Withdraws on behalf of a share owner who signed an off-ledger
    /// approval instead of submitting a transaction.
    ///
    /// The message's nonce is consumed even if a later step fails, so a
    /// retry needs a fresh signature.
    ///
    /// # Errors
    ///
    /// Permit errors ([`SwapError::Expired`],
    /// [`SwapError::InvalidSignature`]); otherwise as
    /// [`remove_liquidity`](Self::remove_liquidity).
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity_with_permit(
        &self,
        factory: &mut Factory,
        ledger: &mut dyn TokenLedger,
        verifier: &dyn ApprovalVerifier,
        asset: AssetId,
        message: &ApprovalMessage,
        signature: &Signature,
        min_amount: Amount,
        to: Account,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Result<Amount> {
        Self::ensure_deadline(now, deadline)?;
        if message.spender != self.account {
            return Err(SwapError::InvalidSignature);
        }
        let pool = factory.pool_mut(asset)?;
        if pool.quote_withdraw(message.shares)?.payout < min_amount {
            return Err(SwapError::InsufficientTokenAmount);
        }
        pool.shares_mut().permit(verifier, message, signature, now)?;
        pool.shares_mut()
            .spend_allowance(message.owner, self.account, message.shares)?;
        pool.withdraw(self.account, ledger, message.owner, to, message.shares, now)
    }

    // -- swaps ---------------------------------------------------------------

    /// Swaps an exact `amount_in` of `asset_in` for at least `min_out`
    /// of `asset_out`.  Returns the amount paid out.
    ///
    /// # Errors
    ///
    /// [`SwapError::Expired`], [`SwapError::SameToken`],
    /// [`SwapError::InsufficientOutputAmount`] when the quoted output
    /// falls below `min_out`; oracle, pool, and transfer errors.  If
    /// the buy leg's outbound transfer fails, the sell leg is rolled
    /// back and the input refunded before the error is returned; a
    /// refund the ledger itself rejects is surfaced as that transfer
    /// error instead, with the input left in engine custody.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_tokens_for_tokens(
        &self,
        factory: &mut Factory,
        ledger: &mut dyn TokenLedger,
        caller: Account,
        amount_in: Amount,
        min_out: Amount,
        asset_in: AssetId,
        asset_out: AssetId,
        to: Account,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Result<Amount> {
        Self::ensure_deadline(now, deadline)?;
        let (value, price_out) =
            Self::quote_sell_leg(factory, amount_in, asset_in, asset_out, now)?;
        if value.is_zero() {
            return Err(SwapError::InsufficientOutputAmount);
        }
        let pool_out = factory.pool(asset_out).ok_or(SwapError::PoolNotFound)?;
        if pool_out.quote_swap_out(value, price_out, now)?.amount_out < min_out {
            return Err(SwapError::InsufficientOutputAmount);
        }
        let price_in = factory.oracle().get_price(asset_in, now)?;

        let pool_in = factory.pool_mut(asset_in)?;
        let snapshot = pool_in.snapshot();
        let value = pool_in.swap_in(self.account, ledger, caller, amount_in, price_in, now)?;
        let outcome = factory
            .pool_mut(asset_out)?
            .swap_out(self.account, ledger, to, value, price_out, now);
        match outcome {
            Ok(out) => {
                tracing::debug!(
                    asset_in = ?asset_in,
                    asset_out = ?asset_out,
                    amount_in = %amount_in,
                    amount_out = %out,
                    "swap"
                );
                Ok(out)
            }
            Err(err) => {
                tracing::warn!(error = %err, "buy leg failed, rolling back sell leg");
                factory.pool_mut(asset_in)?.restore(snapshot);
                if let Err(refund) = ledger.credit(asset_in, caller, amount_in) {
                    tracing::error!(
                        error = %refund,
                        asset = ?asset_in,
                        amount = %amount_in,
                        "swap refund rejected, input remains in engine custody"
                    );
                    return Err(refund);
                }
                Err(err)
            }
        }
    }

    /// Swaps an exact amount of the native asset for tokens.  The sell
    /// leg must resolve to the wrapped-native pool.
    ///
    /// The whole route is quoted and bounds-checked before the caller's
    /// native balance is wrapped, so an ordinary rejection never leaves
    /// the caller holding wrapped tokens.  If execution still fails
    /// after the wrap, the refunded wrapped input is unwrapped back.
    ///
    /// # Errors
    ///
    /// [`SwapError::InvalidInToken`] if `asset_in` is not the wrapped
    /// native asset; otherwise as
    /// [`swap_exact_tokens_for_tokens`](Self::swap_exact_tokens_for_tokens),
    /// plus wrap errors.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_native_for_tokens(
        &self,
        factory: &mut Factory,
        ledger: &mut dyn TokenLedger,
        wrapper: &dyn NativeWrapper,
        caller: Account,
        amount_in: Amount,
        min_out: Amount,
        asset_in: AssetId,
        asset_out: AssetId,
        to: Account,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Result<Amount> {
        if asset_in != self.wrapped_native {
            return Err(SwapError::InvalidInToken);
        }
        Self::ensure_deadline(now, deadline)?;
        let quoted = self.get_amount_out(factory, amount_in, asset_in, asset_out, now)?;
        if quoted.is_zero() || quoted < min_out {
            return Err(SwapError::InsufficientOutputAmount);
        }
        wrapper.wrap(ledger, caller, amount_in)?;
        match self.swap_exact_tokens_for_tokens(
            factory, ledger, caller, amount_in, min_out, asset_in, asset_out, to, deadline, now,
        ) {
            Ok(out) => Ok(out),
            Err(err) => {
                // the rollback refunded wrapped tokens; hand back native
                wrapper.unwrap(ledger, caller, amount_in)?;
                Err(err)
            }
        }
    }

    /// Swaps an exact amount of tokens for the native asset.  The buy
    /// leg must resolve to the wrapped-native pool; the payout is
    /// unwrapped to `to`.
    ///
    /// If the final unwrap fails, both pools are restored, the wrapped
    /// payout is reclaimed, and the input is refunded, so the caller
    /// sees either the full native payout or no change at all.
    ///
    /// # Errors
    ///
    /// [`SwapError::InvalidOutToken`] if `asset_out` is not the wrapped
    /// native asset; otherwise as
    /// [`swap_exact_tokens_for_tokens`](Self::swap_exact_tokens_for_tokens),
    /// plus unwrap errors.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_tokens_for_native(
        &self,
        factory: &mut Factory,
        ledger: &mut dyn TokenLedger,
        wrapper: &dyn NativeWrapper,
        caller: Account,
        amount_in: Amount,
        min_out: Amount,
        asset_in: AssetId,
        asset_out: AssetId,
        to: Account,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Result<Amount> {
        if asset_out != self.wrapped_native {
            return Err(SwapError::InvalidOutToken);
        }
        let snap_in = factory
            .pool(asset_in)
            .ok_or(SwapError::PoolNotFound)?
            .snapshot();
        let snap_out = factory
            .pool(asset_out)
            .ok_or(SwapError::PoolNotFound)?
            .snapshot();
        let out = self.swap_exact_tokens_for_tokens(
            factory, ledger, caller, amount_in, min_out, asset_in, asset_out, to, deadline, now,
        )?;
        if let Err(err) = wrapper.unwrap(ledger, to, out) {
            tracing::warn!(error = %err, "unwrap failed, rolling back swap");
            factory.pool_mut(asset_in)?.restore(snap_in);
            factory.pool_mut(asset_out)?.restore(snap_out);
            ledger.debit(asset_out, to, out)?;
            ledger.credit(asset_in, caller, amount_in)?;
            return Err(err);
        }
        Ok(out)
    }
}
