//! Pricing and accounting engine for a single-sided, oracle-priced
//! exchange.
//!
//! Unlike a constant-product AMM, liquidity here is provided per asset:
//! each [`Pool`](pool::Pool) holds exactly one token, values it in USD
//! through the [`PriceOracle`](oracle::PriceOracle), and tracks three
//! ledger fields (`assets`, `liabilities`, `protocol_fees`).  Swaps
//! route through the USD unit of account — the sell leg converts tokens
//! to value, the buy leg converts value to tokens — so any asset pairs
//! with any other without pairwise pools.  Imbalance between a pool's
//! assets and liabilities is priced by a convex slippage curve that
//! penalizes trades draining coverage and rewards trades restoring it.
//!
//! ```text
//!                     ┌────────────┐
//!        push_prices  │ PriceOracle│  cross-check
//!        ───────────► │            │ ◄─────────── PriceFeed
//!                     └─────┬──────┘
//!                           │ USD prices
//!                     ┌─────▼──────┐
//!        admin ─────► │  Factory   │  creates / administers
//!                     └─────┬──────┘
//!                           │ owns
//!              ┌────────────┼────────────┐
//!        ┌─────▼─────┐┌─────▼─────┐┌─────▼─────┐
//!        │ Pool WETH ││ Pool USDC ││ Pool ...  │
//!        └─────▲─────┘└─────▲─────┘└───────────┘
//!              │ swap_in    │ swap_out
//!              └─────┬──────┴──────┐
//!                    │   Router    │ ◄── traders, LPs
//!                    └─────────────┘
//! ```
//!
//! The engine is deterministic and host-agnostic: it never reads a
//! clock or holds tokens itself.  Time enters as [`Timestamp`]
//! arguments and custody enters through the [`traits`] seams
//! ([`TokenLedger`](traits::TokenLedger),
//! [`PriceFeed`](traits::PriceFeed),
//! [`ApprovalVerifier`](traits::ApprovalVerifier),
//! [`NativeWrapper`](traits::NativeWrapper)).
//!
//! # Module guide
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`domain`] | Validated newtypes: [`Amount`], [`Value`], [`Wad`], identifiers, timestamps |
//! | [`math`] | 256-bit intermediate `mul_div` with explicit rounding |
//! | [`config`] | Validated policy blueprints: fees, slippage curve, oracle acceptance |
//! | [`traits`] | Host seams: custody, feeds, signatures, native wrapping |
//! | [`error`] | The unified [`SwapError`] and its [`ErrorKind`] taxonomy |
//! | [`oracle`] | Push-based oracle with feed cross-checking |
//! | [`pool`] | Single-asset pools: deposits, withdrawals, swap legs, shares |
//! | [`factory`] | Pool registry, roles, batch administration |
//! | [`router`] | Two-leg swaps, bounds, deadlines, native variants |
//!
//! # Example
//!
//! ```
//! use tranche_amm::prelude::*;
//!
//! let admin = Account::from_bytes([1u8; 32]);
//! let oracle = PriceOracle::new(admin, OracleConfig::default())?;
//! let factory = Factory::new(
//!     "A",
//!     admin,
//!     Account::from_bytes([2u8; 32]),
//!     oracle,
//!     FeeSchedule::default(),
//!     SlippageCurve::default(),
//! )?;
//! assert_eq!(factory.pool_count(), 0);
//! # Ok::<(), SwapError>(())
//! ```
//!
//! [`Timestamp`]: domain::Timestamp
//! [`Amount`]: domain::Amount
//! [`Value`]: domain::Value
//! [`Wad`]: domain::Wad
//! [`SwapError`]: error::SwapError
//! [`ErrorKind`]: error::ErrorKind

pub mod config;
pub mod domain;
pub mod error;
pub mod factory;
pub mod math;
pub mod oracle;
pub mod pool;
pub mod prelude;
pub mod router;
pub mod traits;
