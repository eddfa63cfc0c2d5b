//! Coverage-ratio penalty curve.

use serde::{Deserialize, Serialize};

use crate::domain::{Rounding, Wad};
use crate::error::{Result, SwapError};

/// Coefficients of the slippage penalty curve and the liquidity balance
/// fee.
///
/// The penalty potential is `g(cr) = min(k / cr^exponent, cap)` — a
/// convex, decreasing function of the coverage ratio `cr`.  Pools charge
/// the *difference* of this potential between the pre- and post-trade
/// coverage ratio, scaled by liabilities: trades that push a pool
/// towards depletion pay the potential increase, trades that restore a
/// depleted pool earn the potential decrease back.  Over any closed path
/// of coverage ratios the two telescope, so the pool never pays out more
/// slippage than it collected plus the (capped) initial potential.
///
/// The balance fee applies to liquidity operations: depositing into an
/// already over-collateralized pool or withdrawing from an
/// under-collateralized one pays `balance_fee × |cr_after − 1|`, capped
/// at `balance_fee_cap`.  A pool at or moving towards balance pays
/// nothing.
///
/// All coefficients are policy-tunable; the defaults reproduce the
/// observed production calibration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageCurve {
    k: Wad,
    exponent: u32,
    cap: Wad,
    balance_fee: Wad,
    balance_fee_cap: Wad,
}

impl SlippageCurve {
    /// Creates a curve, validating all invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::InvalidConfiguration`] if the exponent is
    /// zero or above 32, if `k` exceeds `cap`, if `cap` exceeds 100%, or
    /// if the balance fee exceeds its own cap or the cap exceeds 100%.
    pub fn new(k: Wad, exponent: u32, cap: Wad, balance_fee: Wad, balance_fee_cap: Wad) -> Result<Self> {
        let curve = Self {
            k,
            exponent,
            cap,
            balance_fee,
            balance_fee_cap,
        };
        curve.validate()?;
        Ok(curve)
    }

    /// Validates all curve invariants.
    ///
    /// # Errors
    ///
    /// See [`SlippageCurve::new`].
    pub fn validate(&self) -> Result<()> {
        if self.exponent == 0 || self.exponent > 32 {
            return Err(SwapError::InvalidConfiguration(
                "penalty exponent out of range",
            ));
        }
        if self.cap > Wad::ONE {
            return Err(SwapError::InvalidConfiguration("penalty cap exceeds 100%"));
        }
        if self.k > self.cap {
            return Err(SwapError::InvalidConfiguration(
                "penalty coefficient exceeds cap",
            ));
        }
        if self.balance_fee_cap > Wad::ONE {
            return Err(SwapError::InvalidConfiguration(
                "balance fee cap exceeds 100%",
            ));
        }
        if self.balance_fee > self.balance_fee_cap {
            return Err(SwapError::InvalidConfiguration(
                "balance fee exceeds its cap",
            ));
        }
        Ok(())
    }

    /// Maximum penalty fraction ever charged on a single trade.
    #[must_use]
    pub const fn cap(&self) -> Wad {
        self.cap
    }

    /// The penalty potential `g(cr) = min(k / cr^exponent, cap)`.
    ///
    /// `g` is zero at infinite coverage ([`Wad::MAX`], the empty-pool
    /// sentinel) and saturates at `cap` as the coverage ratio falls
    /// towards zero.
    ///
    /// # Errors
    ///
    /// Propagates overflow from the fixed-point power.
    pub fn penalty_at(&self, cr: Wad) -> Result<Wad> {
        if cr == Wad::MAX {
            return Ok(Wad::ZERO);
        }
        if cr.is_zero() {
            return Ok(self.cap);
        }
        let denom = cr.powi(self.exponent)?;
        if denom.is_zero() {
            // cr^n rounded to nothing; the true penalty is above cap.
            return Ok(self.cap);
        }
        Ok(self.k.div(denom, Rounding::Up)?.min(self.cap))
    }

    /// Balance fee rate for a deposit whose post-operation coverage
    /// ratio is `cr_after`: zero at or below balance, otherwise
    /// `balance_fee × (cr_after − 1)` capped.
    ///
    /// # Errors
    ///
    /// Propagates overflow from the fee product.
    pub fn deposit_fee_rate(&self, cr_after: Wad) -> Result<Wad> {
        if cr_after <= Wad::ONE {
            return Ok(Wad::ZERO);
        }
        if cr_after == Wad::MAX {
            return Ok(self.balance_fee_cap);
        }
        let distance = cr_after.saturating_sub(Wad::ONE);
        Ok(self
            .balance_fee
            .mul(distance, Rounding::Up)?
            .min(self.balance_fee_cap))
    }

    /// Balance fee rate for a withdrawal whose post-operation coverage
    /// ratio is `cr_after`: zero at or above balance, otherwise
    /// `balance_fee × (1 − cr_after)` capped.
    ///
    /// # Errors
    ///
    /// Propagates overflow from the fee product.
    pub fn withdraw_fee_rate(&self, cr_after: Wad) -> Result<Wad> {
        if cr_after >= Wad::ONE {
            return Ok(Wad::ZERO);
        }
        let distance = Wad::ONE.saturating_sub(cr_after);
        Ok(self
            .balance_fee
            .mul(distance, Rounding::Up)?
            .min(self.balance_fee_cap))
    }
}

impl Default for SlippageCurve {
    /// Production calibration: `g(cr) = min(0.00002 / cr^7, 30%)`,
    /// balance fee 0.1% per unit of coverage-ratio distance, capped at
    /// 10%.
    fn default() -> Self {
        Self {
            k: Wad::new(20_000_000_000_000),
            exponent: 7,
            cap: Wad::new(300_000_000_000_000_000),
            balance_fee: Wad::new(1_000_000_000_000_000),
            balance_fee_cap: Wad::new(100_000_000_000_000_000),
        }
    }
}
