//! Explicit rounding direction for integer division.

/// Rounding direction for division and fixed-point scaling.
///
/// Every division in the engine names its rounding direction so that the
/// exchange never rounds in the user's favour by accident: amounts paid
/// out round [`Down`](Rounding::Down), amounts required as input round
/// [`Up`](Rounding::Up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (floor).
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Returns `true` if this is [`Rounding::Down`].
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        assert!(Rounding::Up.is_up());
        assert!(!Rounding::Up.is_down());
        assert!(Rounding::Down.is_down());
        assert!(!Rounding::Down.is_up());
    }

    #[test]
    fn equality() {
        assert_eq!(Rounding::Up, Rounding::Up);
        assert_ne!(Rounding::Up, Rounding::Down);
    }
}
