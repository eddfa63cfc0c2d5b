//! Behavioral seams between the engine and its host environment.
//!
//! The engine owns all pricing and accounting state but none of the
//! token custody or cryptography.  Those concerns enter through four
//! traits the host implements:
//!
//! - [`TokenLedger`] — moves underlying assets in and out of the
//!   engine's omnibus custody.
//! - [`PriceFeed`] — a read-only reference price source used to
//!   cross-check pushed prices.
//! - [`ApprovalVerifier`] — verifies signed off-ledger share approvals.
//! - [`NativeWrapper`] — wraps and unwraps the chain-native asset at
//!   the router boundary.

mod approval_verifier;
mod native_wrapper;
mod price_feed;
mod token_ledger;

pub use approval_verifier::{ApprovalMessage, ApprovalVerifier, Signature};
pub use native_wrapper::NativeWrapper;
pub use price_feed::PriceFeed;
pub use token_ledger::TokenLedger;
