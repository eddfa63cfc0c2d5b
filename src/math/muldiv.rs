//! 256-bit-intermediate multiply-then-divide.

use crate::domain::Rounding;
use crate::error::{Result, SwapError};

/// Computes `a × b / d` without intermediate overflow.
///
/// The product is carried in 256 bits (a `(hi, lo)` pair of `u128`s) and
/// divided by `d` with the requested [`Rounding`] direction.
///
/// # Errors
///
/// - [`SwapError::DivisionByZero`] if `d` is zero.
/// - [`SwapError::Overflow`] if the quotient does not fit in `u128`.
pub fn mul_div(a: u128, b: u128, d: u128, rounding: Rounding) -> Result<u128> {
    if d == 0 {
        return Err(SwapError::DivisionByZero);
    }
    let (hi, lo) = widening_mul(a, b);
    let (quotient, remainder) =
        div_256_by_128(hi, lo, d).ok_or(SwapError::Overflow("mul_div quotient exceeds u128"))?;

    match rounding {
        Rounding::Down => Ok(quotient),
        Rounding::Up => {
            if remainder == 0 {
                Ok(quotient)
            } else {
                quotient
                    .checked_add(1)
                    .ok_or(SwapError::Overflow("mul_div round-up exceeds u128"))
            }
        }
    }
}

/// Full 256-bit product of two `u128`s as `(hi, lo)`.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = (1u128 << 64) - 1;

    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    // Middle accumulator sits at bit offset 64; it may carry out twice.
    let (m1, c1) = lh.overflowing_add(hl);
    let (m2, c2) = m1.overflowing_add(ll >> 64);
    let carries = u128::from(c1) + u128::from(c2);

    let lo = (m2 << 64) | (ll & MASK);
    let hi = hh + (m2 >> 64) + (carries << 64);
    (hi, lo)
}

/// Divides the 256-bit value `(hi, lo)` by `d`, returning
/// `(quotient, remainder)`, or `None` if the quotient overflows `u128`.
///
/// Plain restoring long division, one bit of `lo` at a time; `hi < d`
/// holds on entry of the loop so the running remainder always fits.
fn div_256_by_128(hi: u128, lo: u128, d: u128) -> Option<(u128, u128)> {
    debug_assert!(d != 0);
    if hi == 0 {
        return Some((lo / d, lo % d));
    }
    if hi >= d {
        // Quotient has more than 128 bits.
        return None;
    }

    let mut rem = hi;
    let mut quo: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quo |= 1 << i;
        }
    }
    Some((quo, rem))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const WAD: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn small_values_round_down() {
        let Ok(r) = mul_div(10, 3, 4, Rounding::Down) else {
            panic!("expected Ok");
        };
        assert_eq!(r, 7); // 30 / 4 = 7.5
    }

    #[test]
    fn small_values_round_up() {
        let Ok(r) = mul_div(10, 3, 4, Rounding::Up) else {
            panic!("expected Ok");
        };
        assert_eq!(r, 8);
    }

    #[test]
    fn exact_division_same_both_roundings() {
        let Ok(down) = mul_div(100, 6, 3, Rounding::Down) else {
            panic!("expected Ok");
        };
        let Ok(up) = mul_div(100, 6, 3, Rounding::Up) else {
            panic!("expected Ok");
        };
        assert_eq!(down, 200);
        assert_eq!(up, 200);
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            mul_div(1, 1, 0, Rounding::Down),
            Err(SwapError::DivisionByZero)
        );
    }

    #[test]
    fn product_wider_than_u128() {
        // (2^127) * 4 / 8 = 2^126 — intermediate needs 129 bits.
        let a = 1u128 << 127;
        let Ok(r) = mul_div(a, 4, 8, Rounding::Down) else {
            panic!("expected Ok");
        };
        assert_eq!(r, 1u128 << 126);
    }

    #[test]
    fn wad_scale_price_conversion() {
        // 1e27 raw units of a 21-decimal token at price 1e18 per whole
        // token: value = 1e27 * 1e18 / 1e21 = 1e24.  The product 1e45
        // does not fit in u128.
        let amount = 10u128.pow(27);
        let price = WAD;
        let scale = 10u128.pow(21);
        let Ok(v) = mul_div(amount, price, scale, Rounding::Down) else {
            panic!("expected Ok");
        };
        assert_eq!(v, 10u128.pow(24));
    }

    #[test]
    fn quotient_overflow_detected() {
        let r = mul_div(u128::MAX, u128::MAX, 1, Rounding::Down);
        assert!(matches!(r, Err(SwapError::Overflow(_))));
    }

    #[test]
    fn max_times_max_div_max() {
        let Ok(r) = mul_div(u128::MAX, u128::MAX, u128::MAX, Rounding::Down) else {
            panic!("expected Ok");
        };
        assert_eq!(r, u128::MAX);
    }

    #[test]
    fn zero_factor() {
        let Ok(r) = mul_div(0, u128::MAX, 7, Rounding::Up) else {
            panic!("expected Ok");
        };
        assert_eq!(r, 0);
    }

    #[test]
    fn widening_mul_known_values() {
        assert_eq!(widening_mul(0, u128::MAX), (0, 0));
        assert_eq!(widening_mul(1, u128::MAX), (0, u128::MAX));
        // (2^64)^2 = 2^128 → hi = 1, lo = 0
        assert_eq!(widening_mul(1u128 << 64, 1u128 << 64), (1, 0));
        // MAX * MAX = 2^256 - 2^129 + 1 → hi = MAX - 1, lo = 1
        assert_eq!(widening_mul(u128::MAX, u128::MAX), (u128::MAX - 1, 1));
    }

    #[test]
    fn div_256_remainder() {
        // (hi=1, lo=5) = 2^128 + 5; divided by 7: 2^128 = 7*q + 4,
        // so remainder is (4 + 5) % 7 = 2.
        let Some((_, rem)) = div_256_by_128(1, 5, 7) else {
            panic!("expected Some");
        };
        assert_eq!(rem, 2);
    }

    #[test]
    fn round_trip_against_checked_mul() {
        // Where the product fits in u128, mul_div must agree with the
        // plain checked path.
        for a in [3u128, 12_345, WAD] {
            for b in [7u128, 99_999, 123] {
                for d in [2u128, 10, WAD] {
                    let Ok(got) = mul_div(a, b, d, Rounding::Down) else {
                        panic!("expected Ok");
                    };
                    assert_eq!(got, a * b / d);
                }
            }
        }
    }
}
