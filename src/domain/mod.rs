//! Fundamental domain value types for the pricing and accounting engine.
//!
//! All quantities are integer-backed newtypes with validated constructors:
//! raw token units ([`Amount`]), 18-decimal fixed-point fractions
//! ([`Wad`]), USD values in the common unit of account ([`Value`]), and
//! chain-agnostic 32-byte identifiers ([`AssetId`], [`Account`]).
//! Division always takes an explicit [`Rounding`] direction.

mod account;
mod amount;
mod asset_id;
mod decimals;
mod rounding;
mod timestamp;
mod value;
mod wad;

pub use account::Account;
pub use amount::Amount;
pub use asset_id::AssetId;
pub use decimals::Decimals;
pub use rounding::Rounding;
pub use timestamp::Timestamp;
pub use value::Value;
pub use wad::Wad;
