//! Unified error types for the tranche AMM engine.
//!
//! All fallible operations across the crate return [`SwapError`] as their
//! error type.  Every error aborts the whole top-level operation — no
//! partial ledger mutation is ever observable — and no error is fatal to
//! the exchange as a whole: subsequent operations proceed against
//! unchanged state.
//!
//! [`SwapError::kind`] classifies each variant into one of the coarse
//! [`ErrorKind`] families so callers can distinguish, say, a rejected
//! authorization from a tripped slippage bound without matching on every
//! variant.

use thiserror::Error;

/// Convenience alias used by every fallible operation in the crate.
pub type Result<T> = core::result::Result<T, SwapError>;

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input: zero identifier, zero amount, mismatched arrays.
    Validation,
    /// Caller is not the admin, router, or an authorized pusher.
    Authorization,
    /// Operation conflicts with current ledger state.
    State,
    /// Caller-supplied minimum-output bound tripped.
    Slippage,
    /// No valid price could be produced.
    Oracle,
    /// Deadline passed before execution.
    Expiry,
    /// Checked arithmetic failed.
    Arithmetic,
}

/// Unified error enum for the whole engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SwapError {
    // -- validation ---------------------------------------------------------
    /// An identifier argument was the all-zero sentinel.
    #[error("zero address")]
    ZeroAddress,
    /// An amount argument was zero.
    #[error("amount is 0")]
    AmountIsZero,
    /// A base fee of zero was supplied at pool creation.
    #[error("fee is 0")]
    FeeIsZero,
    /// Batch arrays have different lengths.
    #[error("array arguments are not the same length")]
    NotSameLength,
    /// Swap input and output assets are identical.
    #[error("same token for both swap legs")]
    SameToken,
    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    /// A pushed or fed price value is unusable.
    #[error("invalid price: {0}")]
    InvalidPrice(&'static str),

    // -- authorization ------------------------------------------------------
    /// Caller is not the factory admin.
    #[error("caller is not admin")]
    NotAdmin,
    /// Caller is not the registered router.
    #[error("caller is not router")]
    NotRouter,
    /// Caller is not an authorized price pusher.
    #[error("caller is not a pusher")]
    NotPusher,
    /// Offline-approval signature did not verify.
    #[error("invalid approval signature")]
    InvalidSignature,

    // -- state --------------------------------------------------------------
    /// A pool for this asset already exists.
    #[error("pool exists")]
    PoolExists,
    /// No pool is registered for this asset.
    #[error("pool not found")]
    PoolNotFound,
    /// The pool is paused.
    #[error("pool is paused")]
    Paused,
    /// Deposit would push `assets` above the deposit cap.
    #[error("deposit exceeds cap")]
    DepositExceedsCap,
    /// Requested withdrawal exceeds the pool's available assets.
    #[error("amount exceeds assets")]
    AmountExceedsAssets,
    /// Share balance or allowance too low for the requested burn/transfer.
    #[error("insufficient share balance")]
    InsufficientShares,
    /// A collaborator transfer was rejected.
    #[error("transfer failed: {0}")]
    TransferFailed(&'static str),

    // -- slippage bounds ----------------------------------------------------
    /// Swap output fell below the caller's minimum.
    #[error("insufficient output amount")]
    InsufficientOutputAmount,
    /// Minted liquidity fell below the caller's minimum.
    #[error("insufficient liquidity amount")]
    InsufficientLiquidityAmount,
    /// Burn payout fell below the caller's minimum.
    #[error("insufficient token amount")]
    InsufficientTokenAmount,
    /// Native-asset swap sell leg does not resolve to the wrapped asset.
    #[error("invalid in token")]
    InvalidInToken,
    /// Native-asset swap buy leg does not resolve to the wrapped asset.
    #[error("invalid out token")]
    InvalidOutToken,

    // -- oracle -------------------------------------------------------------
    /// No valid price source exists for the asset.
    #[error("no price for asset")]
    NoPrice,
    /// The newest price is older than the configured maximum age.
    #[error("price is stale")]
    StalePrice,
    /// Pushed and feed prices disagree beyond the configured tolerance.
    #[error("price difference exceeds tolerance")]
    PriceDiffExceedsTolerance,

    // -- expiry -------------------------------------------------------------
    /// The operation deadline passed.
    #[error("expired")]
    Expired,

    // -- arithmetic ---------------------------------------------------------
    /// Checked addition or multiplication overflowed.
    #[error("overflow: {0}")]
    Overflow(&'static str),
    /// Checked subtraction underflowed.
    #[error("underflow: {0}")]
    Underflow(&'static str),
    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
}

impl SwapError {
    /// Classifies the error into its [`ErrorKind`] family.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroAddress
            | Self::AmountIsZero
            | Self::FeeIsZero
            | Self::NotSameLength
            | Self::SameToken
            | Self::InvalidConfiguration(_)
            | Self::InvalidPrice(_) => ErrorKind::Validation,

            Self::NotAdmin | Self::NotRouter | Self::NotPusher | Self::InvalidSignature => {
                ErrorKind::Authorization
            }

            Self::PoolExists
            | Self::PoolNotFound
            | Self::Paused
            | Self::DepositExceedsCap
            | Self::AmountExceedsAssets
            | Self::InsufficientShares
            | Self::TransferFailed(_) => ErrorKind::State,

            Self::InsufficientOutputAmount
            | Self::InsufficientLiquidityAmount
            | Self::InsufficientTokenAmount
            | Self::InvalidInToken
            | Self::InvalidOutToken => ErrorKind::Slippage,

            Self::NoPrice | Self::StalePrice | Self::PriceDiffExceedsTolerance => {
                ErrorKind::Oracle
            }

            Self::Expired => ErrorKind::Expiry,

            Self::Overflow(_) | Self::Underflow(_) | Self::DivisionByZero => ErrorKind::Arithmetic,
        }
    }
}
