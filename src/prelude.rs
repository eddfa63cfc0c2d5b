//! Convenience re-exports of the types most integrations need.
//!
//! ```
//! use tranche_amm::prelude::*;
//! ```

pub use crate::config::{FeeSchedule, OracleConfig, PoolConfig, SlippageCurve};
pub use crate::domain::{Account, Amount, AssetId, Decimals, Rounding, Timestamp, Value, Wad};
pub use crate::error::{ErrorKind, Result, SwapError};
pub use crate::factory::Factory;
pub use crate::oracle::{PriceOracle, PriceRecord};
pub use crate::pool::{
    DepositQuote, Pool, ShareLedger, SwapInQuote, SwapOutQuote, WithdrawQuote,
};
pub use crate::router::Router;
pub use crate::traits::{
    ApprovalMessage, ApprovalVerifier, NativeWrapper, PriceFeed, Signature, TokenLedger,
};
