//! Push-based price oracle with feed cross-checking.
//!
//! Prices arrive by being *pushed* by allow-listed accounts and are
//! served to pools only after passing the [`OracleConfig`] acceptance
//! policy: freshness, and agreement with an optional independent
//! reference [`PriceFeed`].  The feed-only override drops pushed prices
//! entirely and serves the reference feed alone.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::OracleConfig;
use crate::domain::{Account, AssetId, Rounding, Timestamp, Wad};
use crate::error::{Result, SwapError};
use crate::traits::PriceFeed;

/// A pushed price and the instant it was pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    price: Wad,
    updated_at: Timestamp,
}

impl PriceRecord {
    /// USD price per whole token, 18 decimals.
    #[must_use]
    pub const fn price(&self) -> Wad {
        self.price
    }

    /// Instant the price was pushed.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

/// The price oracle: an allow-listed set of pushers, a record per
/// asset, and optional reference feeds for cross-checking.
pub struct PriceOracle {
    admin: Account,
    pushers: BTreeSet<Account>,
    records: BTreeMap<AssetId, PriceRecord>,
    feeds: BTreeMap<AssetId, Box<dyn PriceFeed>>,
    config: OracleConfig,
}

impl fmt::Debug for PriceOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceOracle")
            .field("admin", &self.admin)
            .field("pushers", &self.pushers)
            .field("records", &self.records)
            .field("feeds", &self.feeds.len())
            .field("config", &self.config)
            .finish()
    }
}

impl PriceOracle {
    /// Creates an oracle with an empty pusher set and no records.
    ///
    /// # Errors
    ///
    /// [`SwapError::ZeroAddress`] for a zero admin; configuration
    /// errors from [`OracleConfig::validate`].
    pub fn new(admin: Account, config: OracleConfig) -> Result<Self> {
        if admin.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        config.validate()?;
        Ok(Self {
            admin,
            pushers: BTreeSet::new(),
            records: BTreeMap::new(),
            feeds: BTreeMap::new(),
            config,
        })
    }

    /// Current admin account.
    #[must_use]
    pub const fn admin(&self) -> Account {
        self.admin
    }

    /// Current acceptance policy.
    #[must_use]
    pub const fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Whether `account` may push prices.
    #[must_use]
    pub fn is_pusher(&self, account: Account) -> bool {
        self.pushers.contains(&account)
    }

    /// Latest raw record for `asset`, unfiltered by the acceptance
    /// policy.
    #[must_use]
    pub fn record(&self, asset: AssetId) -> Option<PriceRecord> {
        self.records.get(&asset).copied()
    }

    fn ensure_admin(&self, caller: Account) -> Result<()> {
        if caller != self.admin {
            return Err(SwapError::NotAdmin);
        }
        Ok(())
    }

    /// Transfers the admin role.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotAdmin`] unless `caller` is the current admin;
    /// [`SwapError::ZeroAddress`] for a zero successor.
    pub fn set_admin(&mut self, caller: Account, new_admin: Account) -> Result<()> {
        self.ensure_admin(caller)?;
        if new_admin.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        tracing::info!(admin = ?new_admin, "oracle admin transferred");
        self.admin = new_admin;
        Ok(())
    }

    /// Adds or removes a pusher.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotAdmin`] for non-admin callers;
    /// [`SwapError::ZeroAddress`] for the zero account.
    pub fn set_pusher(&mut self, caller: Account, pusher: Account, allowed: bool) -> Result<()> {
        self.ensure_admin(caller)?;
        if pusher.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        if allowed {
            self.pushers.insert(pusher);
        } else {
            self.pushers.remove(&pusher);
        }
        tracing::info!(pusher = ?pusher, allowed, "pusher set updated");
        Ok(())
    }

    /// Registers (or replaces) the reference feed for `asset`.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotAdmin`] for non-admin callers;
    /// [`SwapError::ZeroAddress`] for the zero asset id.
    pub fn register_feed(
        &mut self,
        caller: Account,
        asset: AssetId,
        feed: Box<dyn PriceFeed>,
    ) -> Result<()> {
        self.ensure_admin(caller)?;
        if asset.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        self.feeds.insert(asset, feed);
        tracing::info!(asset = ?asset, "reference feed registered");
        Ok(())
    }

    /// Flips the feed-only override.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotAdmin`] for non-admin callers.
    pub fn set_feed_only(&mut self, caller: Account, feed_only: bool) -> Result<()> {
        self.ensure_admin(caller)?;
        self.config.set_feed_only(feed_only);
        tracing::warn!(feed_only, "feed-only override changed");
        Ok(())
    }

    /// Records a pushed price for one asset.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotPusher`] unless `caller` is allow-listed;
    /// [`SwapError::ZeroAddress`] for the zero asset id;
    /// [`SwapError::InvalidPrice`] for a zero price.
    pub fn push_price(
        &mut self,
        caller: Account,
        asset: AssetId,
        price: Wad,
        now: Timestamp,
    ) -> Result<()> {
        self.push_prices(caller, &[asset], &[price], now)
    }

    /// Records pushed prices for a batch of assets, all-or-nothing.
    ///
    /// Every entry is validated before any record is written, so a bad
    /// entry in the middle of the batch leaves no partial update.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotSameLength`] if the slices differ in length;
    /// otherwise as [`push_price`](Self::push_price).
    pub fn push_prices(
        &mut self,
        caller: Account,
        assets: &[AssetId],
        prices: &[Wad],
        now: Timestamp,
    ) -> Result<()> {
        if !self.pushers.contains(&caller) {
            return Err(SwapError::NotPusher);
        }
        if assets.len() != prices.len() {
            return Err(SwapError::NotSameLength);
        }
        for (asset, price) in assets.iter().zip(prices) {
            if asset.is_zero() {
                return Err(SwapError::ZeroAddress);
            }
            if price.is_zero() {
                return Err(SwapError::InvalidPrice("zero price pushed"));
            }
        }
        for (asset, price) in assets.iter().zip(prices) {
            self.records.insert(
                *asset,
                PriceRecord {
                    price: *price,
                    updated_at: now,
                },
            );
            tracing::debug!(asset = ?asset, price = %price, at = %now, "price pushed");
        }
        Ok(())
    }

    /// Serves the accepted price for `asset` at instant `now`.
    ///
    /// Under normal policy the pushed record is required; if a
    /// reference feed is registered and currently usable, the pushed
    /// price must also agree with it within the configured tolerance.
    /// Under the feed-only override the reference feed is required and
    /// served directly.
    ///
    /// # Errors
    ///
    /// [`SwapError::NoPrice`] when the required source is absent;
    /// [`SwapError::StalePrice`] when it is older than the staleness
    /// bound; [`SwapError::PriceDiffExceedsTolerance`] when the
    /// cross-check fails.
    pub fn get_price(&self, asset: AssetId, now: Timestamp) -> Result<Wad> {
        if self.config.feed_only() {
            let feed = self.feeds.get(&asset).ok_or(SwapError::NoPrice)?;
            let (price, at) = feed.latest_price()?;
            if price.is_zero() {
                return Err(SwapError::InvalidPrice("zero feed price"));
            }
            if now.elapsed_since(at) > self.config.max_age_secs() {
                return Err(SwapError::StalePrice);
            }
            return Ok(price);
        }
        let record = self.records.get(&asset).ok_or(SwapError::NoPrice)?;
        if now.elapsed_since(record.updated_at) > self.config.max_age_secs() {
            return Err(SwapError::StalePrice);
        }
        if let Some(feed) = self.feeds.get(&asset) {
            self.cross_check(record.price, feed.as_ref(), now)?;
        }
        Ok(record.price)
    }

    /// Serves accepted prices for a batch of assets, all-or-nothing.
    ///
    /// # Errors
    ///
    /// The first failure from [`get_price`](Self::get_price).
    pub fn get_prices(&self, assets: &[AssetId], now: Timestamp) -> Result<Vec<Wad>> {
        assets
            .iter()
            .map(|asset| self.get_price(*asset, now))
            .collect()
    }

    /// A feed that errors, returns zero, or is itself stale cannot
    /// invalidate a pushed price; only a live disagreeing feed can.
    fn cross_check(&self, pushed: Wad, feed: &dyn PriceFeed, now: Timestamp) -> Result<()> {
        let Ok((reference, at)) = feed.latest_price() else {
            return Ok(());
        };
        if reference.is_zero() || now.elapsed_since(at) > self.config.max_age_secs() {
            return Ok(());
        }
        let diff = pushed.abs_diff(reference).div(reference, Rounding::Up)?;
        if diff > self.config.tolerance() {
            return Err(SwapError::PriceDiffExceedsTolerance);
        }
        Ok(())
    }
}
