//! Reference price feeds.

use crate::domain::{Timestamp, Wad};
use crate::error::Result;

/// A read-only reference price source for one asset.
///
/// Feeds are registered per asset on the oracle and serve two roles:
/// cross-checking pushed prices against an independent source, and
/// acting as the sole source under the feed-only override.  Prices are
/// USD per whole token, 18 decimals.
pub trait PriceFeed {
    /// Latest price and the instant it was produced.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::NoPrice`] (or any host error) when the feed
    /// cannot produce a price.
    ///
    /// [`SwapError::NoPrice`]: crate::error::SwapError::NoPrice
    fn latest_price(&self) -> Result<(Wad, Timestamp)>;
}
