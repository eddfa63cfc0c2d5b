//! Declarative configuration blueprints.
//!
//! Every tunable policy of the engine lives in a validated config struct
//! constructed with `new() -> Result` and re-checkable via `validate()`:
//!
//! - [`PoolConfig`] — per-pool immutable parameters.
//! - [`FeeSchedule`] — protocol/LP fee split and the staleness
//!   escalation step function.
//! - [`SlippageCurve`] — coverage-ratio penalty curve coefficients.
//! - [`OracleConfig`] — cross-check tolerance, staleness bound, and the
//!   feed-only emergency override.
//!
//! All structs derive `serde` so a deployment can load them from files.

mod fee_schedule;
mod oracle_config;
mod pool_config;
mod slippage_curve;

pub use fee_schedule::FeeSchedule;
pub use oracle_config::OracleConfig;
pub use pool_config::PoolConfig;
pub use slippage_curve::SlippageCurve;
