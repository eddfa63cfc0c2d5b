//! Trading-fee split and staleness escalation schedule.

use serde::{Deserialize, Serialize};

use crate::domain::{Amount, Rounding, Wad};
use crate::error::{Result, SwapError};

/// Protocol/LP fee split and the dynamic-fee escalation step function.
///
/// The effective trading fee rate of a pool is its base rate multiplied
/// by an escalation factor that grows with the time since the pool's
/// last ledger activity:
///
/// - elapsed < `stale_after_secs` — multiplier ×1;
/// - `stale_after_secs` ≤ elapsed < `halt_after_secs` — multiplier
///   `stale_multiplier` (observed calibration ×2);
/// - elapsed ≥ `halt_after_secs` — the rate saturates at `halted_rate`
///   (100% by default), which consumes the whole trade and effectively
///   disables trading until fresh activity resets the clock.
///
/// The exact shape between and beyond the two observed calibration
/// points is policy, not physics, which is why this is a configurable
/// step function rather than a hard-coded curve.
///
/// Every trading fee is split into a protocol share (swept to the fee
/// recipient) and an LP share (folded into liabilities, raising the
/// price per share).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    protocol_share: Wad,
    stale_after_secs: u64,
    halt_after_secs: u64,
    stale_multiplier: Wad,
    halted_rate: Wad,
}

impl FeeSchedule {
    /// Creates a schedule, validating all invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::InvalidConfiguration`] if `protocol_share`
    /// or `halted_rate` exceed 100%, if `stale_multiplier` is below ×1,
    /// or if the thresholds are not strictly ordered.
    pub fn new(
        protocol_share: Wad,
        stale_after_secs: u64,
        halt_after_secs: u64,
        stale_multiplier: Wad,
        halted_rate: Wad,
    ) -> Result<Self> {
        let schedule = Self {
            protocol_share,
            stale_after_secs,
            halt_after_secs,
            stale_multiplier,
            halted_rate,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Validates all schedule invariants.
    ///
    /// # Errors
    ///
    /// See [`FeeSchedule::new`].
    pub fn validate(&self) -> Result<()> {
        if self.protocol_share > Wad::ONE {
            return Err(SwapError::InvalidConfiguration(
                "protocol share exceeds 100%",
            ));
        }
        if self.halted_rate > Wad::ONE {
            return Err(SwapError::InvalidConfiguration("halted rate exceeds 100%"));
        }
        if self.stale_multiplier < Wad::ONE {
            return Err(SwapError::InvalidConfiguration(
                "stale multiplier below one",
            ));
        }
        if self.stale_after_secs >= self.halt_after_secs {
            return Err(SwapError::InvalidConfiguration(
                "stale threshold must precede halt threshold",
            ));
        }
        Ok(())
    }

    /// Returns the protocol's share of every trading fee.
    #[must_use]
    pub const fn protocol_share(&self) -> Wad {
        self.protocol_share
    }

    /// Effective fee rate for a pool with base rate `base_fee` whose
    /// last ledger activity was `elapsed_secs` ago.
    ///
    /// Non-decreasing in `elapsed_secs` and bounded above by the
    /// saturating `halted_rate`.
    ///
    /// # Errors
    ///
    /// Propagates overflow from the multiplier product.
    pub fn rate_for(&self, base_fee: Wad, elapsed_secs: u64) -> Result<Wad> {
        if elapsed_secs >= self.halt_after_secs {
            return Ok(self.halted_rate);
        }
        if elapsed_secs >= self.stale_after_secs {
            let escalated = base_fee.mul(self.stale_multiplier, Rounding::Up)?;
            return Ok(escalated.min(self.halted_rate));
        }
        Ok(base_fee.min(self.halted_rate))
    }

    /// Splits a total fee into `(protocol, lp)` parts.
    ///
    /// The protocol part rounds down so the LP side absorbs the odd
    /// unit.
    ///
    /// # Errors
    ///
    /// Propagates overflow from the share product.
    pub fn split(&self, total_fee: Amount) -> Result<(Amount, Amount)> {
        let protocol = self.protocol_share.apply(total_fee, Rounding::Down)?;
        let lp = total_fee
            .checked_sub(protocol)
            .ok_or(SwapError::Underflow("lp fee underflow"))?;
        Ok((protocol, lp))
    }
}

impl Default for FeeSchedule {
    /// Observed calibration: 55% protocol share, ×2 at 60 s, halt at
    /// 70 s with a saturated 100% rate.
    fn default() -> Self {
        Self {
            protocol_share: Wad::new(550_000_000_000_000_000),
            stale_after_secs: 60,
            halt_after_secs: 70,
            stale_multiplier: Wad::new(2_000_000_000_000_000_000),
            halted_rate: Wad::ONE,
        }
    }
}
