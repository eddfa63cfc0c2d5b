//! Per-pool immutable parameters.

use serde::{Deserialize, Serialize};

use crate::domain::{AssetId, Decimals, Wad};
use crate::error::{Result, SwapError};

/// Immutable parameters fixed at pool creation.
///
/// Everything mutable about a pool (deposit cap, pause flag, base fee
/// overrides) is administered through the factory after creation; this
/// struct holds only what can never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    asset: AssetId,
    symbol: String,
    decimals: Decimals,
    is_stablecoin: bool,
    base_fee: Wad,
}

impl PoolConfig {
    /// Creates a pool config, validating all invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::ZeroAddress`] for the zero asset id,
    /// [`SwapError::FeeIsZero`] for a zero base fee, and
    /// [`SwapError::InvalidConfiguration`] if the base fee exceeds 100%.
    pub fn new(
        asset: AssetId,
        symbol: impl Into<String>,
        decimals: Decimals,
        is_stablecoin: bool,
        base_fee: Wad,
    ) -> Result<Self> {
        let config = Self {
            asset,
            symbol: symbol.into(),
            decimals,
            is_stablecoin,
            base_fee,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all config invariants.
    ///
    /// # Errors
    ///
    /// See [`PoolConfig::new`].
    pub fn validate(&self) -> Result<()> {
        if self.asset.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        if self.base_fee.is_zero() {
            return Err(SwapError::FeeIsZero);
        }
        if self.base_fee > Wad::ONE {
            return Err(SwapError::InvalidConfiguration("base fee exceeds 100%"));
        }
        Ok(())
    }

    /// Identifier of the underlying asset.
    #[must_use]
    pub const fn asset(&self) -> AssetId {
        self.asset
    }

    /// Ticker symbol of the underlying asset.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Decimal places of the underlying asset's native unit.
    #[must_use]
    pub const fn decimals(&self) -> Decimals {
        self.decimals
    }

    /// Whether the asset is a stablecoin.  Informational; deployments
    /// typically pair it with a flatter [`SlippageCurve`] calibration.
    ///
    /// [`SlippageCurve`]: crate::config::SlippageCurve
    #[must_use]
    pub const fn is_stablecoin(&self) -> bool {
        self.is_stablecoin
    }

    /// Base trading fee rate before staleness escalation.
    #[must_use]
    pub const fn base_fee(&self) -> Wad {
        self.base_fee
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn asset() -> AssetId {
        AssetId::from_bytes([7u8; 32])
    }

    fn decimals() -> Decimals {
        let Ok(d) = Decimals::new(18) else {
            panic!("valid decimals");
        };
        d
    }

    #[test]
    fn valid_config() {
        let r = PoolConfig::new(asset(), "WETH", decimals(), false, Wad::new(1_500_000_000_000_000));
        assert!(r.is_ok());
    }

    #[test]
    fn zero_asset_rejected() {
        let r = PoolConfig::new(
            AssetId::zero(),
            "WETH",
            decimals(),
            false,
            Wad::new(1_500_000_000_000_000),
        );
        assert!(matches!(r, Err(SwapError::ZeroAddress)));
    }

    #[test]
    fn zero_fee_rejected() {
        let r = PoolConfig::new(asset(), "WETH", decimals(), false, Wad::ZERO);
        assert!(matches!(r, Err(SwapError::FeeIsZero)));
    }

    #[test]
    fn excess_fee_rejected() {
        let r = PoolConfig::new(
            asset(),
            "WETH",
            decimals(),
            false,
            Wad::new(1_000_000_000_000_000_001),
        );
        assert!(matches!(r, Err(SwapError::InvalidConfiguration(_))));
    }
}
