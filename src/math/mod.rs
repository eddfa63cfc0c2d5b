//! Arithmetic utilities for the pricing engine.
//!
//! Every product of two 18-decimal fixed-point quantities can exceed
//! `u128`, so all scaling math in the crate routes through [`mul_div`],
//! which computes `a × b / d` with a full 256-bit intermediate and an
//! explicit [`Rounding`](crate::domain::Rounding) direction.

mod muldiv;

pub use muldiv::mul_div;
