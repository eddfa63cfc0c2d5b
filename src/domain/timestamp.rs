//! Logical timestamps.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A logical timestamp in whole seconds.
///
/// The engine never reads a wall clock: every time-sensitive operation
/// takes the current `Timestamp` as an argument, which keeps the ledger
/// deterministic and the staleness formulas testable.  A deadline of
/// [`Timestamp::MAX`] means "no deadline".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The earliest representable instant.
    pub const ZERO: Self = Self(0);

    /// The "no deadline" sentinel.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates a `Timestamp` from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the timestamp in whole seconds.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since `earlier`, saturating at zero if `earlier`
    /// is in the future.
    #[must_use]
    pub const fn elapsed_since(&self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
