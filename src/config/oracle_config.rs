//! Oracle acceptance policy.

use serde::{Deserialize, Serialize};

use crate::domain::Wad;
use crate::error::{Result, SwapError};

/// Acceptance policy for oracle prices.
///
/// A price is served only if it passes this policy: it must be younger
/// than `max_age_secs`, and when both a pushed price and a reference
/// feed are available their relative difference must stay within
/// `tolerance`.  Setting `feed_only` bypasses pushed prices entirely and
/// serves the reference feed alone, which is the emergency escape hatch
/// when the pusher set is compromised or offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    tolerance: Wad,
    max_age_secs: u64,
    feed_only: bool,
}

impl OracleConfig {
    /// Creates a config, validating all invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::InvalidConfiguration`] if the tolerance
    /// exceeds 100% or the staleness bound is zero.
    pub fn new(tolerance: Wad, max_age_secs: u64, feed_only: bool) -> Result<Self> {
        let config = Self {
            tolerance,
            max_age_secs,
            feed_only,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all config invariants.
    ///
    /// # Errors
    ///
    /// See [`OracleConfig::new`].
    pub fn validate(&self) -> Result<()> {
        if self.tolerance > Wad::ONE {
            return Err(SwapError::InvalidConfiguration(
                "price tolerance exceeds 100%",
            ));
        }
        if self.max_age_secs == 0 {
            return Err(SwapError::InvalidConfiguration(
                "zero price staleness bound",
            ));
        }
        Ok(())
    }

    /// Maximum relative difference tolerated between a pushed price and
    /// the reference feed.
    #[must_use]
    pub const fn tolerance(&self) -> Wad {
        self.tolerance
    }

    /// Maximum age in seconds before a price is considered stale.
    #[must_use]
    pub const fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }

    /// Whether pushed prices are bypassed in favor of reference feeds.
    #[must_use]
    pub const fn feed_only(&self) -> bool {
        self.feed_only
    }

    /// Flips the feed-only override.
    pub fn set_feed_only(&mut self, feed_only: bool) {
        self.feed_only = feed_only;
    }
}

impl Default for OracleConfig {
    /// 2% cross-check tolerance, 5-minute staleness bound, pushed
    /// prices enabled.
    fn default() -> Self {
        Self {
            tolerance: Wad::new(20_000_000_000_000_000),
            max_age_secs: 300,
            feed_only: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(OracleConfig::default().validate().is_ok());
    }

    #[test]
    fn excess_tolerance_rejected() {
        let r = OracleConfig::new(Wad::new(1_000_000_000_000_000_001), 300, false);
        assert!(r.is_err());
    }

    #[test]
    fn zero_age_rejected() {
        let r = OracleConfig::new(Wad::ZERO, 0, false);
        assert!(r.is_err());
    }

    #[test]
    fn feed_only_toggles() {
        let mut config = OracleConfig::default();
        assert!(!config.feed_only());
        config.set_feed_only(true);
        assert!(config.feed_only());
    }
}
