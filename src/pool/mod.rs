//! Single-asset liquidity pools.
//!
//! A pool holds exactly one asset and prices it in USD via the oracle.
//! Its ledger is three numbers:
//!
//! - `assets` — tokens backing liquidity provider claims;
//! - `liabilities` — tokens owed to liquidity providers;
//! - `protocol_fees` — tokens owed to the protocol's fee recipient.
//!
//! Tokens actually held always equal `assets + protocol_fees`.  The
//! coverage ratio `assets / liabilities` drives the slippage curve, and
//! `liabilities / share supply` is the price per share, which only ever
//! grows as LP fees fold into liabilities.
//!
//! Every mutating operation follows the same shape: validate, compute
//! the full outcome with checked arithmetic, perform the one external
//! transfer, then commit the precomputed ledger with no fallible step
//! left.  A failed transfer therefore never leaves a partial update.

mod shares;

pub use shares::ShareLedger;

use serde::{Deserialize, Serialize};

use crate::config::{FeeSchedule, PoolConfig, SlippageCurve};
use crate::domain::{Account, Amount, AssetId, Decimals, Rounding, Timestamp, Value, Wad};
use crate::error::{Result, SwapError};
use crate::math::mul_div;
use crate::traits::TokenLedger;

#[cfg(test)]
mod proptest_properties;

/// Outcome of a deposit, computed before any token moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositQuote {
    /// Balance fee charged on the deposit.
    pub fee: Amount,
    /// Shares that will be minted.
    pub shares: Amount,
}

/// Outcome of a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawQuote {
    /// Balance fee charged on the withdrawal.
    pub fee: Amount,
    /// Tokens paid to the withdrawer.
    pub payout: Amount,
}

/// Outcome of the sell leg of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapInQuote {
    /// USD value credited towards the buy leg.
    pub value: Value,
    /// Total trading fee charged on the input.
    pub fee: Amount,
    /// Portion of the fee owed to the protocol.
    pub protocol_fee: Amount,
    /// Portion of the fee folded into liabilities.
    pub lp_fee: Amount,
    /// Slippage bonus for restoring coverage.
    pub bonus: Amount,
}

/// Outcome of the buy leg of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutQuote {
    /// Tokens the credited value converts to before slippage and fees.
    pub gross: Amount,
    /// Slippage penalty for draining coverage.
    pub penalty: Amount,
    /// Total trading fee charged after slippage.
    pub fee: Amount,
    /// Portion of the fee owed to the protocol.
    pub protocol_fee: Amount,
    /// Portion of the fee folded into liabilities.
    pub lp_fee: Amount,
    /// Tokens paid to the buyer.
    pub amount_out: Amount,
}

/// Saved ledger fields for compensating rollback across multi-pool
/// operations.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LedgerSnapshot {
    assets: Amount,
    liabilities: Amount,
    protocol_fees: Amount,
    last_activity_at: Timestamp,
}

/// A single-asset pool: ledger, share token, and policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    asset: AssetId,
    name: String,
    symbol: String,
    decimals: Decimals,
    is_stablecoin: bool,
    base_fee: Wad,
    fees: FeeSchedule,
    slippage: SlippageCurve,
    deposit_cap: Amount,
    paused: bool,
    router: Option<Account>,
    last_activity_at: Timestamp,
    assets: Amount,
    liabilities: Amount,
    protocol_fees: Amount,
    shares: ShareLedger,
}

impl Pool {
    /// Creates an empty pool.
    ///
    /// The deposit cap starts at zero, so deposits are disabled until
    /// the admin raises it.  `tranche` labels the share token metadata.
    ///
    /// # Errors
    ///
    /// Configuration errors from [`PoolConfig::validate`] and the
    /// policy validators.
    pub fn new(
        config: &PoolConfig,
        tranche: &str,
        fees: FeeSchedule,
        slippage: SlippageCurve,
    ) -> Result<Self> {
        config.validate()?;
        fees.validate()?;
        slippage.validate()?;
        Ok(Self {
            asset: config.asset(),
            name: format!("{} Pool ({tranche})", config.symbol()),
            symbol: format!("TLP-{}", config.symbol()),
            decimals: config.decimals(),
            is_stablecoin: config.is_stablecoin(),
            base_fee: config.base_fee(),
            fees,
            slippage,
            deposit_cap: Amount::ZERO,
            paused: false,
            router: None,
            last_activity_at: Timestamp::ZERO,
            assets: Amount::ZERO,
            liabilities: Amount::ZERO,
            protocol_fees: Amount::ZERO,
            shares: ShareLedger::new(),
        })
    }

    // -- views ---------------------------------------------------------------

    /// Underlying asset.
    #[must_use]
    pub const fn asset(&self) -> AssetId {
        self.asset
    }

    /// Share token name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Share token symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Decimal places of the underlying asset.
    #[must_use]
    pub const fn decimals(&self) -> Decimals {
        self.decimals
    }

    /// Whether the underlying asset is a stablecoin.
    #[must_use]
    pub const fn is_stablecoin(&self) -> bool {
        self.is_stablecoin
    }

    /// Base trading fee rate.
    #[must_use]
    pub const fn base_fee(&self) -> Wad {
        self.base_fee
    }

    /// Current deposit cap on `assets`.
    #[must_use]
    pub const fn deposit_cap(&self) -> Amount {
        self.deposit_cap
    }

    /// Whether deposits, withdrawals, and swaps are paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// The registered router, if any.
    #[must_use]
    pub const fn router(&self) -> Option<Account> {
        self.router
    }

    /// Instant of the last ledger mutation; drives fee escalation.
    #[must_use]
    pub const fn last_activity_at(&self) -> Timestamp {
        self.last_activity_at
    }

    /// Tokens backing LP claims.
    #[must_use]
    pub const fn assets(&self) -> Amount {
        self.assets
    }

    /// Tokens owed to LPs.
    #[must_use]
    pub const fn liabilities(&self) -> Amount {
        self.liabilities
    }

    /// Tokens owed to the protocol fee recipient.
    #[must_use]
    pub const fn protocol_fees(&self) -> Amount {
        self.protocol_fees
    }

    /// Share accounting.
    #[must_use]
    pub const fn shares(&self) -> &ShareLedger {
        &self.shares
    }

    /// Mutable share accounting, for approvals, transfers, and permits.
    pub fn shares_mut(&mut self) -> &mut ShareLedger {
        &mut self.shares
    }

    /// Coverage ratio `assets / liabilities`; [`Wad::MAX`] when there
    /// are no liabilities.
    ///
    /// # Errors
    ///
    /// Overflow if the ratio exceeds the representable range.
    pub fn coverage_ratio(&self) -> Result<Wad> {
        Self::coverage_of(self.assets, self.liabilities)
    }

    /// Price per share `liabilities / supply`; one for an empty pool.
    ///
    /// # Errors
    ///
    /// Overflow if the ratio exceeds the representable range.
    pub fn price_per_share(&self) -> Result<Wad> {
        let supply = self.shares.supply();
        if supply.is_zero() {
            return Ok(Wad::ONE);
        }
        Wad::from_ratio(self.liabilities.get(), supply.get(), Rounding::Down)
    }

    /// Effective trading fee rate at instant `now`, escalated by the
    /// time since the pool's last ledger activity.
    ///
    /// # Errors
    ///
    /// Propagates arithmetic failure from the escalation product.
    pub fn trading_fee_rate(&self, now: Timestamp) -> Result<Wad> {
        self.fees
            .rate_for(self.base_fee, now.elapsed_since(self.last_activity_at))
    }

    /// Converts a native-unit token amount to USD value at `price`.
    ///
    /// # Errors
    ///
    /// Propagates overflow from the conversion.
    pub fn amount_to_value(&self, amount: Amount, price: Wad, rounding: Rounding) -> Result<Value> {
        Ok(Value::new(mul_div(
            amount.get(),
            price.get(),
            self.decimals.scale(),
            rounding,
        )?))
    }

    /// Converts a USD value to a native-unit token amount at `price`.
    ///
    /// # Errors
    ///
    /// [`SwapError::DivisionByZero`] for a zero price; overflow from
    /// the conversion.
    pub fn value_to_amount(&self, value: Value, price: Wad, rounding: Rounding) -> Result<Amount> {
        Ok(Amount::new(mul_div(
            value.get(),
            self.decimals.scale(),
            price.get(),
            rounding,
        )?))
    }

    fn coverage_of(assets: Amount, liabilities: Amount) -> Result<Wad> {
        if liabilities.is_zero() {
            return Ok(Wad::MAX);
        }
        Wad::from_ratio(assets.get(), liabilities.get(), Rounding::Down)
    }

    fn ensure_router(&self, caller: Account) -> Result<()> {
        match self.router {
            Some(router) if caller == router => Ok(()),
            _ => Err(SwapError::NotRouter),
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.paused {
            return Err(SwapError::Paused);
        }
        Ok(())
    }

    // -- administration (via the factory) ------------------------------------

    pub(crate) fn set_router(&mut self, router: Account) {
        self.router = Some(router);
    }

    pub(crate) fn set_deposit_cap(&mut self, cap: Amount) {
        self.deposit_cap = cap;
    }

    pub(crate) fn set_base_fee(&mut self, base_fee: Wad) -> Result<()> {
        if base_fee.is_zero() {
            return Err(SwapError::FeeIsZero);
        }
        if base_fee > Wad::ONE {
            return Err(SwapError::InvalidConfiguration("base fee exceeds 100%"));
        }
        self.base_fee = base_fee;
        Ok(())
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Sweeps accrued protocol fees to `fee_to`.
    pub(crate) fn collect_fees(
        &mut self,
        ledger: &mut dyn TokenLedger,
        fee_to: Account,
    ) -> Result<Amount> {
        let swept = self.protocol_fees;
        if swept.is_zero() {
            return Ok(Amount::ZERO);
        }
        ledger.credit(self.asset, fee_to, swept)?;
        self.protocol_fees = Amount::ZERO;
        tracing::info!(asset = ?self.asset, amount = %swept, "protocol fees swept");
        Ok(swept)
    }

    pub(crate) const fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            assets: self.assets,
            liabilities: self.liabilities,
            protocol_fees: self.protocol_fees,
            last_activity_at: self.last_activity_at,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: LedgerSnapshot) {
        self.assets = snapshot.assets;
        self.liabilities = snapshot.liabilities;
        self.protocol_fees = snapshot.protocol_fees;
        self.last_activity_at = snapshot.last_activity_at;
    }

    // -- liquidity -----------------------------------------------------------

    /// Prices a deposit of `amount` without executing it.
    ///
    /// The balance fee is charged only when the deposit lands the pool
    /// above full coverage; a deposit into an under-covered or balanced
    /// pool is free.
    ///
    /// # Errors
    ///
    /// [`SwapError::AmountIsZero`]; arithmetic failures.
    pub fn quote_deposit(&self, amount: Amount) -> Result<DepositQuote> {
        if amount.is_zero() {
            return Err(SwapError::AmountIsZero);
        }
        let assets_after = self
            .assets
            .checked_add(amount)
            .ok_or(SwapError::Overflow("deposit assets"))?;
        let liabilities_after = self
            .liabilities
            .checked_add(amount)
            .ok_or(SwapError::Overflow("deposit liabilities"))?;
        let cr_after = Self::coverage_of(assets_after, liabilities_after)?;
        let fee = self
            .slippage
            .deposit_fee_rate(cr_after)?
            .apply(amount, Rounding::Up)?;
        let net = amount
            .checked_sub(fee)
            .ok_or(SwapError::Underflow("deposit fee"))?;
        let pps = self.price_per_share()?;
        let shares = Amount::new(mul_div(net.get(), Wad::ONE.get(), pps.get(), Rounding::Down)?);
        Ok(DepositQuote { fee, shares })
    }

    /// Deposits `amount` of the underlying asset, minting shares to
    /// `to`.  Returns the shares minted.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotRouter`], [`SwapError::Paused`],
    /// [`SwapError::DepositExceedsCap`]; quote errors; transfer errors
    /// from the ledger, in which case nothing changed.
    pub fn deposit(
        &mut self,
        caller: Account,
        ledger: &mut dyn TokenLedger,
        from: Account,
        to: Account,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Amount> {
        self.ensure_router(caller)?;
        self.ensure_live()?;
        let assets_after_gross = self
            .assets
            .checked_add(amount)
            .ok_or(SwapError::Overflow("deposit assets"))?;
        if assets_after_gross > self.deposit_cap {
            return Err(SwapError::DepositExceedsCap);
        }
        let quote = self.quote_deposit(amount)?;
        let net = amount
            .checked_sub(quote.fee)
            .ok_or(SwapError::Underflow("deposit fee"))?;
        let assets = self
            .assets
            .checked_add(net)
            .ok_or(SwapError::Overflow("deposit assets"))?;
        let liabilities = self
            .liabilities
            .checked_add(net)
            .ok_or(SwapError::Overflow("deposit liabilities"))?;
        let protocol_fees = self
            .protocol_fees
            .checked_add(quote.fee)
            .ok_or(SwapError::Overflow("protocol fees"))?;
        self.shares.check_mint(to, quote.shares)?;

        ledger.debit(self.asset, from, amount)?;

        self.assets = assets;
        self.liabilities = liabilities;
        self.protocol_fees = protocol_fees;
        self.last_activity_at = now;
        self.shares.commit_mint(to, quote.shares);
        tracing::debug!(
            asset = ?self.asset,
            amount = %amount,
            shares = %quote.shares,
            fee = %quote.fee,
            "deposit"
        );
        Ok(quote.shares)
    }

    /// Prices a withdrawal of `shares` without executing it.
    ///
    /// The balance fee mirrors the deposit side: withdrawing from an
    /// under-covered pool pays, withdrawing from a covered pool is
    /// free, so a full exit from a fresh pool returns exactly the
    /// deposit.
    ///
    /// # Errors
    ///
    /// [`SwapError::AmountIsZero`];
    /// [`SwapError::AmountExceedsAssets`] when the pool cannot cover
    /// the redemption; arithmetic failures.
    pub fn quote_withdraw(&self, shares: Amount) -> Result<WithdrawQuote> {
        if shares.is_zero() {
            return Err(SwapError::AmountIsZero);
        }
        let pps = self.price_per_share()?;
        let gross = Amount::new(mul_div(
            shares.get(),
            pps.get(),
            Wad::ONE.get(),
            Rounding::Down,
        )?);
        if gross > self.assets {
            return Err(SwapError::AmountExceedsAssets);
        }
        let assets_after = self
            .assets
            .checked_sub(gross)
            .ok_or(SwapError::Underflow("withdraw assets"))?;
        let liabilities_after = self
            .liabilities
            .checked_sub(gross)
            .ok_or(SwapError::Underflow("withdraw liabilities"))?;
        let cr_after = Self::coverage_of(assets_after, liabilities_after)?;
        let fee = self
            .slippage
            .withdraw_fee_rate(cr_after)?
            .apply(gross, Rounding::Up)?;
        let payout = gross
            .checked_sub(fee)
            .ok_or(SwapError::Underflow("withdraw fee"))?;
        Ok(WithdrawQuote { fee, payout })
    }

    /// Burns `shares` from `owner` and pays the underlying to `to`.
    /// Returns the payout.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotRouter`], [`SwapError::Paused`],
    /// [`SwapError::InsufficientShares`]; quote errors; transfer errors
    /// from the ledger, in which case nothing changed.
    pub fn withdraw(
        &mut self,
        caller: Account,
        ledger: &mut dyn TokenLedger,
        owner: Account,
        to: Account,
        shares: Amount,
        now: Timestamp,
    ) -> Result<Amount> {
        self.ensure_router(caller)?;
        self.ensure_live()?;
        let quote = self.quote_withdraw(shares)?;
        let gross = quote
            .payout
            .checked_add(quote.fee)
            .ok_or(SwapError::Overflow("withdraw gross"))?;
        let assets = self
            .assets
            .checked_sub(gross)
            .ok_or(SwapError::Underflow("withdraw assets"))?;
        let liabilities = self
            .liabilities
            .checked_sub(gross)
            .ok_or(SwapError::Underflow("withdraw liabilities"))?;
        let protocol_fees = self
            .protocol_fees
            .checked_add(quote.fee)
            .ok_or(SwapError::Overflow("protocol fees"))?;
        self.shares.check_burn(owner, shares)?;

        ledger.credit(self.asset, to, quote.payout)?;

        self.assets = assets;
        self.liabilities = liabilities;
        self.protocol_fees = protocol_fees;
        self.last_activity_at = now;
        self.shares.commit_burn(owner, shares);
        tracing::debug!(
            asset = ?self.asset,
            shares = %shares,
            payout = %quote.payout,
            fee = %quote.fee,
            "withdraw"
        );
        Ok(quote.payout)
    }

    // -- swaps ---------------------------------------------------------------

    /// Slippage bonus for an inflow of `amount`: the coverage-potential
    /// drop it causes, scaled by liabilities and capped at the curve
    /// cap times `amount`.  Rounds in the pool's favor.
    fn slippage_gain(&self, amount: Amount) -> Result<Amount> {
        if self.liabilities.is_zero() {
            return Ok(Amount::ZERO);
        }
        let assets_after = self
            .assets
            .checked_add(amount)
            .ok_or(SwapError::Overflow("swap-in assets"))?;
        let before = self.slippage.penalty_at(self.coverage_ratio()?)?;
        let after = self
            .slippage
            .penalty_at(Self::coverage_of(assets_after, self.liabilities)?)?;
        let bonus = before
            .saturating_sub(after)
            .apply(self.liabilities, Rounding::Down)?;
        let most = self.slippage.cap().apply(amount, Rounding::Down)?;
        Ok(bonus.min(most))
    }

    /// Slippage penalty for an outflow of `gross`, mirroring
    /// [`slippage_gain`](Self::slippage_gain).
    fn slippage_loss(&self, gross: Amount) -> Result<Amount> {
        if self.liabilities.is_zero() {
            return Ok(Amount::ZERO);
        }
        let assets_after = self
            .assets
            .checked_sub(gross)
            .ok_or(SwapError::AmountExceedsAssets)?;
        let before = self.slippage.penalty_at(self.coverage_ratio()?)?;
        let after = self
            .slippage
            .penalty_at(Self::coverage_of(assets_after, self.liabilities)?)?;
        let penalty = after
            .saturating_sub(before)
            .apply(self.liabilities, Rounding::Up)?;
        let most = self.slippage.cap().apply(gross, Rounding::Up)?;
        Ok(penalty.min(most))
    }

    /// Prices the sell leg: `amount` of this asset in, USD value out.
    ///
    /// A saturated (halted) fee rate consumes the whole input and
    /// produces zero value, which trips the caller's minimum-output
    /// bound downstream.
    ///
    /// # Errors
    ///
    /// [`SwapError::AmountIsZero`]; arithmetic failures.
    pub fn quote_swap_in(&self, amount: Amount, price: Wad, now: Timestamp) -> Result<SwapInQuote> {
        if amount.is_zero() {
            return Err(SwapError::AmountIsZero);
        }
        let rate = self.trading_fee_rate(now)?;
        let fee = rate.apply(amount, Rounding::Up)?;
        let net = amount
            .checked_sub(fee)
            .ok_or(SwapError::Underflow("swap-in fee"))?;
        let (protocol_fee, lp_fee) = self.fees.split(fee)?;
        let bonus = self.slippage_gain(amount)?;
        let value = if net.is_zero() {
            Value::ZERO
        } else {
            let credited = net
                .checked_add(bonus)
                .ok_or(SwapError::Overflow("swap-in bonus"))?;
            self.amount_to_value(credited, price, Rounding::Down)?
        };
        Ok(SwapInQuote {
            value,
            fee,
            protocol_fee,
            lp_fee,
            bonus,
        })
    }

    /// Executes the sell leg: pulls `amount` from `from` and returns
    /// the USD value credited towards the buy leg.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotRouter`], [`SwapError::Paused`]; quote errors;
    /// transfer errors from the ledger, in which case nothing changed.
    pub fn swap_in(
        &mut self,
        caller: Account,
        ledger: &mut dyn TokenLedger,
        from: Account,
        amount: Amount,
        price: Wad,
        now: Timestamp,
    ) -> Result<Value> {
        self.ensure_router(caller)?;
        self.ensure_live()?;
        let quote = self.quote_swap_in(amount, price, now)?;
        let assets = self
            .assets
            .checked_add(amount)
            .ok_or(SwapError::Overflow("swap-in assets"))?
            .checked_sub(quote.protocol_fee)
            .ok_or(SwapError::Underflow("swap-in assets"))?;
        let liabilities = self
            .liabilities
            .checked_add(quote.lp_fee)
            .ok_or(SwapError::Overflow("swap-in liabilities"))?;
        let protocol_fees = self
            .protocol_fees
            .checked_add(quote.protocol_fee)
            .ok_or(SwapError::Overflow("protocol fees"))?;

        ledger.debit(self.asset, from, amount)?;

        self.assets = assets;
        self.liabilities = liabilities;
        self.protocol_fees = protocol_fees;
        self.last_activity_at = now;
        tracing::debug!(
            asset = ?self.asset,
            amount = %amount,
            value = %quote.value,
            fee = %quote.fee,
            bonus = %quote.bonus,
            "swap in"
        );
        Ok(quote.value)
    }

    /// Prices the buy leg: USD `value` in, tokens out.
    ///
    /// # Errors
    ///
    /// [`SwapError::AmountIsZero`];
    /// [`SwapError::AmountExceedsAssets`] when the pool cannot cover
    /// the outflow; arithmetic failures.
    pub fn quote_swap_out(&self, value: Value, price: Wad, now: Timestamp) -> Result<SwapOutQuote> {
        if value.is_zero() {
            return Err(SwapError::AmountIsZero);
        }
        let gross = self.value_to_amount(value, price, Rounding::Down)?;
        if gross > self.assets {
            return Err(SwapError::AmountExceedsAssets);
        }
        let penalty = self.slippage_loss(gross)?;
        let after_slippage = gross
            .checked_sub(penalty)
            .ok_or(SwapError::Underflow("swap-out penalty"))?;
        let rate = self.trading_fee_rate(now)?;
        let fee = rate.apply(after_slippage, Rounding::Up)?;
        let (protocol_fee, lp_fee) = self.fees.split(fee)?;
        let amount_out = after_slippage
            .checked_sub(fee)
            .ok_or(SwapError::Underflow("swap-out fee"))?;
        Ok(SwapOutQuote {
            gross,
            penalty,
            fee,
            protocol_fee,
            lp_fee,
            amount_out,
        })
    }

    /// Executes the buy leg: consumes USD `value` and pays tokens to
    /// `to`.  Returns the amount paid.
    ///
    /// The slippage penalty stays in `assets` without any matching
    /// liability, lifting coverage for the LPs who bore the imbalance.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotRouter`], [`SwapError::Paused`]; quote errors;
    /// transfer errors from the ledger, in which case nothing changed.
    pub fn swap_out(
        &mut self,
        caller: Account,
        ledger: &mut dyn TokenLedger,
        to: Account,
        value: Value,
        price: Wad,
        now: Timestamp,
    ) -> Result<Amount> {
        self.ensure_router(caller)?;
        self.ensure_live()?;
        let quote = self.quote_swap_out(value, price, now)?;
        let outflow = quote
            .amount_out
            .checked_add(quote.protocol_fee)
            .ok_or(SwapError::Overflow("swap-out outflow"))?;
        let assets = self
            .assets
            .checked_sub(outflow)
            .ok_or(SwapError::AmountExceedsAssets)?;
        let liabilities = self
            .liabilities
            .checked_add(quote.lp_fee)
            .ok_or(SwapError::Overflow("swap-out liabilities"))?;
        let protocol_fees = self
            .protocol_fees
            .checked_add(quote.protocol_fee)
            .ok_or(SwapError::Overflow("protocol fees"))?;

        ledger.credit(self.asset, to, quote.amount_out)?;

        self.assets = assets;
        self.liabilities = liabilities;
        self.protocol_fees = protocol_fees;
        self.last_activity_at = now;
        tracing::debug!(
            asset = ?self.asset,
            value = %value,
            amount = %quote.amount_out,
            fee = %quote.fee,
            penalty = %quote.penalty,
            "swap out"
        );
        Ok(quote.amount_out)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod testing {
    use std::collections::BTreeMap;

    use super::*;

    /// Minimal in-memory token custody for tests.
    #[derive(Debug, Default)]
    pub struct TestLedger {
        balances: BTreeMap<(AssetId, Account), Amount>,
    }

    impl TestLedger {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fund(&mut self, asset: AssetId, owner: Account, amount: Amount) {
            self.balances.insert((asset, owner), amount);
        }
    }

    impl TokenLedger for TestLedger {
        fn debit(&mut self, asset: AssetId, from: Account, amount: Amount) -> Result<()> {
            let balance = self.balance_of(asset, from);
            let remaining = balance
                .checked_sub(amount)
                .ok_or(SwapError::TransferFailed("insufficient balance"))?;
            self.balances.insert((asset, from), remaining);
            Ok(())
        }

        fn credit(&mut self, asset: AssetId, to: Account, amount: Amount) -> Result<()> {
            let balance = self.balance_of(asset, to);
            let total = balance
                .checked_add(amount)
                .ok_or(SwapError::TransferFailed("balance overflow"))?;
            self.balances.insert((asset, to), total);
            Ok(())
        }

        fn balance_of(&self, asset: AssetId, owner: Account) -> Amount {
            self.balances
                .get(&(asset, owner))
                .copied()
                .unwrap_or(Amount::ZERO)
        }
    }

    pub fn router() -> Account {
        Account::from_bytes([9u8; 32])
    }

    pub fn trader() -> Account {
        Account::from_bytes([5u8; 32])
    }

    pub fn weth() -> AssetId {
        AssetId::from_bytes([10u8; 32])
    }

    /// 0.15% base fee, 18 decimals, unlimited cap, router wired.
    pub fn pool() -> Pool {
        let Ok(decimals) = Decimals::new(18) else {
            panic!("valid decimals");
        };
        let Ok(config) = PoolConfig::new(
            weth(),
            "WETH",
            decimals,
            false,
            Wad::new(1_500_000_000_000_000),
        ) else {
            panic!("valid config");
        };
        let Ok(mut pool) = Pool::new(
            &config,
            "A",
            FeeSchedule::default(),
            SlippageCurve::default(),
        ) else {
            panic!("valid pool");
        };
        pool.set_router(router());
        pool.set_deposit_cap(Amount::MAX);
        pool
    }

    /// A pool seeded with one balanced deposit at `t = 100`, trader
    /// still holding an equal amount.
    pub fn seeded(deposit: u128) -> (Pool, TestLedger) {
        let mut p = pool();
        let mut ledger = TestLedger::new();
        ledger.fund(weth(), trader(), Amount::new(deposit.saturating_mul(2)));
        let Ok(_) = p.deposit(
            router(),
            &mut ledger,
            trader(),
            trader(),
            Amount::new(deposit),
            Timestamp::from_secs(100),
        ) else {
            panic!("seed deposit failed");
        };
        (p, ledger)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::testing::{pool, router, seeded, trader, weth, TestLedger};
    use super::*;

    fn funded_ledger(amount: u128) -> TestLedger {
        let mut ledger = TestLedger::new();
        ledger.fund(weth(), trader(), Amount::new(amount));
        ledger
    }

    fn t(secs: u64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    #[test]
    fn empty_pool_views() {
        let p = pool();
        let Ok(cr) = p.coverage_ratio() else {
            panic!("expected Ok");
        };
        let Ok(pps) = p.price_per_share() else {
            panic!("expected Ok");
        };
        assert_eq!(cr, Wad::MAX);
        assert_eq!(pps, Wad::ONE);
    }

    #[test]
    fn first_deposit_mints_one_to_one() {
        let (p, _) = seeded(1_000_000);
        assert_eq!(p.assets(), Amount::new(1_000_000));
        assert_eq!(p.liabilities(), Amount::new(1_000_000));
        assert_eq!(p.protocol_fees(), Amount::ZERO);
        assert_eq!(p.shares().balance_of(trader()), Amount::new(1_000_000));
        let Ok(cr) = p.coverage_ratio() else {
            panic!("expected Ok");
        };
        assert_eq!(cr, Wad::ONE);
    }

    #[test]
    fn deposit_requires_router() {
        let mut p = pool();
        let mut ledger = funded_ledger(1_000);
        let r = p.deposit(
            trader(),
            &mut ledger,
            trader(),
            trader(),
            Amount::new(1_000),
            t(100),
        );
        assert!(matches!(r, Err(SwapError::NotRouter)));
    }

    #[test]
    fn deposit_blocked_when_paused() {
        let mut p = pool();
        p.set_paused(true);
        let mut ledger = funded_ledger(1_000);
        let r = p.deposit(
            router(),
            &mut ledger,
            trader(),
            trader(),
            Amount::new(1_000),
            t(100),
        );
        assert!(matches!(r, Err(SwapError::Paused)));
    }

    #[test]
    fn deposit_cap_enforced() {
        let mut p = pool();
        p.set_deposit_cap(Amount::new(500));
        let mut ledger = funded_ledger(1_000);
        let r = p.deposit(
            router(),
            &mut ledger,
            trader(),
            trader(),
            Amount::new(501),
            t(100),
        );
        assert!(matches!(r, Err(SwapError::DepositExceedsCap)));
        assert!(p
            .deposit(
                router(),
                &mut ledger,
                trader(),
                trader(),
                Amount::new(500),
                t(100),
            )
            .is_ok());
    }

    #[test]
    fn failed_transfer_leaves_pool_unchanged() {
        let mut p = pool();
        let mut ledger = TestLedger::new();
        let r = p.deposit(
            router(),
            &mut ledger,
            trader(),
            trader(),
            Amount::new(1_000),
            t(100),
        );
        assert!(matches!(r, Err(SwapError::TransferFailed(_))));
        assert_eq!(p.assets(), Amount::ZERO);
        assert_eq!(p.shares().supply(), Amount::ZERO);
    }

    #[test]
    fn full_exit_returns_exact_deposit() {
        let (mut p, mut ledger) = seeded(1_000_000);
        let before = ledger.balance_of(weth(), trader());
        let Ok(payout) = p.withdraw(
            router(),
            &mut ledger,
            trader(),
            trader(),
            Amount::new(1_000_000),
            t(100),
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(payout, Amount::new(1_000_000));
        assert_eq!(p.assets(), Amount::ZERO);
        assert_eq!(p.liabilities(), Amount::ZERO);
        assert_eq!(p.shares().supply(), Amount::ZERO);
        let Some(expected) = before.checked_add(payout) else {
            panic!("overflow");
        };
        assert_eq!(ledger.balance_of(weth(), trader()), expected);
    }

    #[test]
    fn withdraw_from_undercovered_pool_pays_balance_fee() {
        let (mut p, mut ledger) = seeded(1_000_000);
        let Ok(_) = p.swap_out(
            router(),
            &mut ledger,
            trader(),
            Value::new(200_000),
            Wad::ONE,
            t(100),
        ) else {
            panic!("expected Ok");
        };
        let Ok(quote) = p.quote_withdraw(Amount::new(100_000)) else {
            panic!("expected Ok");
        };
        assert!(quote.fee > Amount::ZERO);
        assert!(quote.payout < Amount::new(100_000));
    }

    #[test]
    fn withdraw_blocked_when_paused() {
        let (mut p, mut ledger) = seeded(1_000_000);
        p.set_paused(true);
        let r = p.withdraw(
            router(),
            &mut ledger,
            trader(),
            trader(),
            Amount::new(1_000),
            t(100),
        );
        assert!(matches!(r, Err(SwapError::Paused)));
        assert_eq!(p.liabilities(), Amount::new(1_000_000));
        p.set_paused(false);
        assert!(p
            .withdraw(
                router(),
                &mut ledger,
                trader(),
                trader(),
                Amount::new(1_000),
                t(100),
            )
            .is_ok());
    }

    #[test]
    fn swap_in_credits_value_and_accrues_fees() {
        let (mut p, mut ledger) = seeded(1_000_000);
        let Ok(value) = p.swap_in(
            router(),
            &mut ledger,
            trader(),
            Amount::new(100_000),
            Wad::ONE,
            t(100),
        ) else {
            panic!("expected Ok");
        };
        // fee = 0.15% of 100_000 = 150, protocol 82, lp 68; value is
        // net plus a small coverage bonus
        assert!(value >= Value::new(99_850));
        assert!(value <= Value::new(99_880));
        assert_eq!(p.protocol_fees(), Amount::new(82));
        assert_eq!(p.liabilities(), Amount::new(1_000_068));
        assert_eq!(p.assets(), Amount::new(1_099_918));
    }

    #[test]
    fn swap_quotes_match_execution() {
        let (mut p, mut ledger) = seeded(1_000_000);
        let now = t(130);
        let amount = Amount::new(77_777);
        let Ok(quote) = p.quote_swap_in(amount, Wad::ONE, now) else {
            panic!("expected Ok");
        };
        let Ok(value) = p.swap_in(router(), &mut ledger, trader(), amount, Wad::ONE, now) else {
            panic!("expected Ok");
        };
        assert_eq!(value, quote.value);
    }

    #[test]
    fn swap_out_conserves_tokens() {
        let (mut p, mut ledger) = seeded(1_000_000);
        let Ok(out) = p.swap_out(
            router(),
            &mut ledger,
            trader(),
            Value::new(50_000),
            Wad::ONE,
            t(100),
        ) else {
            panic!("expected Ok");
        };
        assert!(out < Amount::new(50_000));
        assert!(out > Amount::new(49_800));
        // tokens held (assets + protocol fees) plus the payout must
        // equal the tokens deposited
        let Some(held) = p.assets().checked_add(p.protocol_fees()) else {
            panic!("overflow");
        };
        assert_eq!(held.checked_add(out), Some(Amount::new(1_000_000)));
    }

    #[test]
    fn swap_out_beyond_assets_rejected() {
        let (mut p, mut ledger) = seeded(1_000);
        let r = p.swap_out(
            router(),
            &mut ledger,
            trader(),
            Value::new(2_000),
            Wad::ONE,
            t(100),
        );
        assert!(matches!(r, Err(SwapError::AmountExceedsAssets)));
    }

    #[test]
    fn idle_pool_doubles_fee_then_halts() {
        let (p, _) = seeded(1_000_000);
        let Ok(fresh) = p.quote_swap_in(Amount::new(100_000), Wad::ONE, t(159)) else {
            panic!("expected Ok");
        };
        let Ok(stale) = p.quote_swap_in(Amount::new(100_000), Wad::ONE, t(160)) else {
            panic!("expected Ok");
        };
        let Ok(halted) = p.quote_swap_in(Amount::new(100_000), Wad::ONE, t(170)) else {
            panic!("expected Ok");
        };
        assert_eq!(fresh.fee, Amount::new(150));
        assert_eq!(stale.fee, Amount::new(300));
        assert_eq!(halted.fee, Amount::new(100_000));
        assert_eq!(halted.value, Value::ZERO);
    }

    #[test]
    fn price_per_share_grows_with_lp_fees() {
        let (mut p, mut ledger) = seeded(1_000_000);
        let Ok(_) = p.swap_in(
            router(),
            &mut ledger,
            trader(),
            Amount::new(100_000),
            Wad::ONE,
            t(100),
        ) else {
            panic!("expected Ok");
        };
        let Ok(pps) = p.price_per_share() else {
            panic!("expected Ok");
        };
        assert!(pps > Wad::ONE);
    }

    #[test]
    fn unit_conversions_respect_decimals() {
        let Ok(decimals) = Decimals::new(6) else {
            panic!("valid decimals");
        };
        let Ok(config) = PoolConfig::new(
            weth(),
            "USDC",
            decimals,
            true,
            Wad::new(1_500_000_000_000_000),
        ) else {
            panic!("valid config");
        };
        let Ok(p) = Pool::new(
            &config,
            "A",
            FeeSchedule::default(),
            SlippageCurve::default(),
        ) else {
            panic!("valid pool");
        };
        // 2 whole tokens at $1500 = $3000
        let Ok(price) = Wad::from_ratio(1_500, 1, Rounding::Down) else {
            panic!("valid price");
        };
        let Ok(value) = p.amount_to_value(Amount::new(2_000_000), price, Rounding::Down) else {
            panic!("expected Ok");
        };
        assert_eq!(value, Value::new(3_000_000_000_000_000_000_000));
        let Ok(back) = p.value_to_amount(value, price, Rounding::Down) else {
            panic!("expected Ok");
        };
        assert_eq!(back, Amount::new(2_000_000));
    }

    #[test]
    fn collect_fees_sweeps_and_resets() {
        let (mut p, mut ledger) = seeded(1_000_000);
        let Ok(_) = p.swap_in(
            router(),
            &mut ledger,
            trader(),
            Amount::new(100_000),
            Wad::ONE,
            t(100),
        ) else {
            panic!("expected Ok");
        };
        let fee_to = Account::from_bytes([7u8; 32]);
        let Ok(swept) = p.collect_fees(&mut ledger, fee_to) else {
            panic!("expected Ok");
        };
        assert_eq!(swept, Amount::new(82));
        assert_eq!(p.protocol_fees(), Amount::ZERO);
        assert_eq!(ledger.balance_of(weth(), fee_to), Amount::new(82));
    }
}
