//! Pool registry and administration.
//!
//! The factory owns every [`Pool`] and the [`PriceOracle`], and is the
//! only place pools are created or administered.  All admin operations
//! are gated on the factory admin; batch operations validate every
//! entry before touching any pool, so a bad entry leaves no partial
//! update.

use std::collections::BTreeMap;

use crate::config::{FeeSchedule, PoolConfig, SlippageCurve};
use crate::domain::{Account, Amount, AssetId, Wad};
use crate::error::{Result, SwapError};
use crate::oracle::PriceOracle;
use crate::pool::Pool;
use crate::traits::TokenLedger;

/// The pool registry: tranche label, roles, policies, oracle, pools.
#[derive(Debug)]
pub struct Factory {
    tranche: String,
    admin: Account,
    fee_to: Account,
    router: Option<Account>,
    oracle: PriceOracle,
    fee_schedule: FeeSchedule,
    slippage: SlippageCurve,
    pools: BTreeMap<AssetId, Pool>,
    all_pools: Vec<AssetId>,
}

impl Factory {
    /// Creates a factory with no pools.
    ///
    /// `tranche` labels this deployment (risk tranches run as separate
    /// factories); the policies are inherited by every pool it creates.
    ///
    /// # Errors
    ///
    /// [`SwapError::ZeroAddress`] for a zero admin or fee recipient;
    /// validation errors from the policies.
    pub fn new(
        tranche: impl Into<String>,
        admin: Account,
        fee_to: Account,
        oracle: PriceOracle,
        fee_schedule: FeeSchedule,
        slippage: SlippageCurve,
    ) -> Result<Self> {
        if admin.is_zero() || fee_to.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        fee_schedule.validate()?;
        slippage.validate()?;
        Ok(Self {
            tranche: tranche.into(),
            admin,
            fee_to,
            router: None,
            oracle,
            fee_schedule,
            slippage,
            pools: BTreeMap::new(),
            all_pools: Vec::new(),
        })
    }

    // -- views ---------------------------------------------------------------

    /// Tranche label of this deployment.
    #[must_use]
    pub fn tranche(&self) -> &str {
        &self.tranche
    }

    /// Current admin.
    #[must_use]
    pub const fn admin(&self) -> Account {
        self.admin
    }

    /// Protocol fee recipient.
    #[must_use]
    pub const fn fee_to(&self) -> Account {
        self.fee_to
    }

    /// Registered router, if any.
    #[must_use]
    pub const fn router(&self) -> Option<Account> {
        self.router
    }

    /// The price oracle.
    #[must_use]
    pub const fn oracle(&self) -> &PriceOracle {
        &self.oracle
    }

    /// Mutable oracle access; oracle operations carry their own
    /// authorization.
    pub fn oracle_mut(&mut self) -> &mut PriceOracle {
        &mut self.oracle
    }

    /// The pool for `asset`, if one exists.
    #[must_use]
    pub fn pool(&self, asset: AssetId) -> Option<&Pool> {
        self.pools.get(&asset)
    }

    /// Assets with pools, in creation order.
    #[must_use]
    pub fn all_pools(&self) -> &[AssetId] {
        &self.all_pools
    }

    /// Number of pools.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.all_pools.len()
    }

    pub(crate) fn pool_mut(&mut self, asset: AssetId) -> Result<&mut Pool> {
        self.pools.get_mut(&asset).ok_or(SwapError::PoolNotFound)
    }

    fn ensure_admin(&self, caller: Account) -> Result<()> {
        if caller != self.admin {
            return Err(SwapError::NotAdmin);
        }
        Ok(())
    }

    // -- pool lifecycle ------------------------------------------------------

    /// Creates a pool for the configured asset.
    ///
    /// The pool starts with a zero deposit cap and inherits the
    /// factory's fee schedule, slippage curve, and router.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotAdmin`]; [`SwapError::PoolExists`] for a
    /// duplicate asset; validation errors from the config.
    pub fn create_pool(&mut self, caller: Account, config: &PoolConfig) -> Result<()> {
        self.ensure_admin(caller)?;
        let asset = config.asset();
        if self.pools.contains_key(&asset) {
            return Err(SwapError::PoolExists);
        }
        let mut pool = Pool::new(
            config,
            &self.tranche,
            self.fee_schedule.clone(),
            self.slippage.clone(),
        )?;
        if let Some(router) = self.router {
            pool.set_router(router);
        }
        tracing::info!(asset = ?asset, symbol = config.symbol(), "pool created");
        self.pools.insert(asset, pool);
        self.all_pools.push(asset);
        Ok(())
    }

    // -- roles ---------------------------------------------------------------

    /// Transfers the admin role.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotAdmin`]; [`SwapError::ZeroAddress`].
    pub fn set_admin(&mut self, caller: Account, new_admin: Account) -> Result<()> {
        self.ensure_admin(caller)?;
        if new_admin.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        tracing::info!(admin = ?new_admin, "factory admin transferred");
        self.admin = new_admin;
        Ok(())
    }

    /// Changes the protocol fee recipient.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotAdmin`]; [`SwapError::ZeroAddress`].
    pub fn set_fee_to(&mut self, caller: Account, fee_to: Account) -> Result<()> {
        self.ensure_admin(caller)?;
        if fee_to.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        self.fee_to = fee_to;
        Ok(())
    }

    /// Registers the router and propagates it to every pool, present
    /// and future.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotAdmin`]; [`SwapError::ZeroAddress`].
    pub fn set_router(&mut self, caller: Account, router: Account) -> Result<()> {
        self.ensure_admin(caller)?;
        if router.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        self.router = Some(router);
        for pool in self.pools.values_mut() {
            pool.set_router(router);
        }
        tracing::info!(router = ?router, "router registered");
        Ok(())
    }

    /// Replaces the oracle wholesale.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotAdmin`].
    pub fn set_oracle(&mut self, caller: Account, oracle: PriceOracle) -> Result<()> {
        self.ensure_admin(caller)?;
        tracing::warn!("oracle replaced");
        self.oracle = oracle;
        Ok(())
    }

    // -- batch pool administration -------------------------------------------

    fn check_batch(&self, assets: &[AssetId], other_len: usize) -> Result<()> {
        if assets.len() != other_len {
            return Err(SwapError::NotSameLength);
        }
        for asset in assets {
            if !self.pools.contains_key(asset) {
                return Err(SwapError::PoolNotFound);
            }
        }
        Ok(())
    }

    /// Sets deposit caps for a batch of pools, all-or-nothing.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotAdmin`]; [`SwapError::NotSameLength`];
    /// [`SwapError::PoolNotFound`] for any unknown asset.
    pub fn set_deposit_caps(
        &mut self,
        caller: Account,
        assets: &[AssetId],
        caps: &[Amount],
    ) -> Result<()> {
        self.ensure_admin(caller)?;
        self.check_batch(assets, caps.len())?;
        for (asset, cap) in assets.iter().zip(caps) {
            if let Some(pool) = self.pools.get_mut(asset) {
                pool.set_deposit_cap(*cap);
            }
        }
        Ok(())
    }

    /// Sets base fees for a batch of pools, all-or-nothing.
    ///
    /// # Errors
    ///
    /// As [`set_deposit_caps`](Self::set_deposit_caps), plus
    /// [`SwapError::FeeIsZero`] and configuration errors for any
    /// out-of-range fee.
    pub fn set_base_fees(
        &mut self,
        caller: Account,
        assets: &[AssetId],
        base_fees: &[Wad],
    ) -> Result<()> {
        self.ensure_admin(caller)?;
        self.check_batch(assets, base_fees.len())?;
        for fee in base_fees {
            if fee.is_zero() {
                return Err(SwapError::FeeIsZero);
            }
            if *fee > Wad::ONE {
                return Err(SwapError::InvalidConfiguration("base fee exceeds 100%"));
            }
        }
        for (asset, fee) in assets.iter().zip(base_fees) {
            if let Some(pool) = self.pools.get_mut(asset) {
                pool.set_base_fee(*fee)?;
            }
        }
        Ok(())
    }

    /// Pauses or unpauses a batch of pools, all-or-nothing.
    ///
    /// # Errors
    ///
    /// As [`set_deposit_caps`](Self::set_deposit_caps).
    pub fn set_paused(
        &mut self,
        caller: Account,
        assets: &[AssetId],
        paused: &[bool],
    ) -> Result<()> {
        self.ensure_admin(caller)?;
        self.check_batch(assets, paused.len())?;
        for (asset, flag) in assets.iter().zip(paused) {
            if let Some(pool) = self.pools.get_mut(asset) {
                pool.set_paused(*flag);
            }
        }
        tracing::warn!(count = assets.len(), "pool pause flags changed");
        Ok(())
    }

    /// Pauses or unpauses every pool at once, the emergency brake.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotAdmin`].
    pub fn set_paused_for_all(&mut self, caller: Account, paused: bool) -> Result<()> {
        self.ensure_admin(caller)?;
        for pool in self.pools.values_mut() {
            pool.set_paused(paused);
        }
        tracing::warn!(paused, "all pools pause flag changed");
        Ok(())
    }

    /// Sweeps accrued protocol fees from every pool to the fee
    /// recipient.  Returns the non-zero sweeps.
    ///
    /// Each pool's sweep is atomic on its own; a failed transfer stops
    /// the run but leaves earlier sweeps in place.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotAdmin`]; transfer errors from the ledger.
    pub fn collect_fees(
        &mut self,
        caller: Account,
        ledger: &mut dyn TokenLedger,
    ) -> Result<Vec<(AssetId, Amount)>> {
        self.ensure_admin(caller)?;
        let fee_to = self.fee_to;
        let mut swept = Vec::new();
        for (asset, pool) in &mut self.pools {
            let amount = pool.collect_fees(ledger, fee_to)?;
            if !amount.is_zero() {
                swept.push((*asset, amount));
            }
        }
        Ok(swept)
    }
}
