//! Randomized checks of the pool's ledger invariants.

#![allow(clippy::panic)]

use proptest::prelude::*;

use super::testing::{router, seeded, trader, weth};
use super::*;

proptest! {
    /// Depositing and immediately exiting in full never pays out more
    /// than went in.
    #[test]
    fn deposit_then_full_exit_never_profits(amount in 1u128..1_000_000_000_000) {
        let (mut p, mut ledger) = seeded(amount);
        let shares = p.shares().balance_of(trader());
        let now = Timestamp::from_secs(100);
        let Ok(payout) = p.withdraw(router(), &mut ledger, trader(), trader(), shares, now) else {
            panic!("expected Ok");
        };
        prop_assert!(payout <= Amount::new(amount));
    }

    /// The value credited by a sell leg never exceeds the input plus
    /// the capped slippage bonus (at unit price).
    #[test]
    fn swap_in_value_is_bounded(
        liquidity in 1_000u128..1_000_000_000_000,
        amount in 1u128..1_000_000_000_000,
    ) {
        let (mut p, mut ledger) = seeded(liquidity);
        ledger.fund(weth(), trader(), Amount::new(amount));
        let now = Timestamp::from_secs(100);
        let Ok(value) =
            p.swap_in(router(), &mut ledger, trader(), Amount::new(amount), Wad::ONE, now)
        else {
            panic!("expected Ok");
        };
        // cap is 30%, so value ≤ 1.3 × amount
        let bound = amount.saturating_mul(13) / 10 + 1;
        prop_assert!(value.get() <= bound);
    }

    /// Quotes are exact: executing a quoted trade yields the quoted
    /// numbers.
    #[test]
    fn quotes_match_execution(
        liquidity in 1_000u128..1_000_000_000_000,
        amount in 1u128..1_000_000_000,
    ) {
        let (mut p, mut ledger) = seeded(liquidity);
        ledger.fund(weth(), trader(), Amount::new(amount));
        let now = Timestamp::from_secs(100);
        let Ok(quote) = p.quote_swap_in(Amount::new(amount), Wad::ONE, now) else {
            panic!("expected Ok");
        };
        let Ok(value) =
            p.swap_in(router(), &mut ledger, trader(), Amount::new(amount), Wad::ONE, now)
        else {
            panic!("expected Ok");
        };
        prop_assert_eq!(value, quote.value);
        prop_assert_eq!(p.protocol_fees(), quote.protocol_fee);
    }

    /// Tokens held always equal `assets + protocol_fees`, and a buy leg
    /// never pays out more than the pool's assets.
    #[test]
    fn swap_out_conserves_and_respects_assets(
        liquidity in 1_000u128..1_000_000_000_000,
        value in 1u128..1_000_000_000_000,
    ) {
        let (mut p, mut ledger) = seeded(liquidity);
        let now = Timestamp::from_secs(100);
        match p.swap_out(router(), &mut ledger, trader(), Value::new(value), Wad::ONE, now) {
            Ok(out) => {
                let Some(held) = p.assets().checked_add(p.protocol_fees()) else {
                    panic!("overflow");
                };
                prop_assert_eq!(held.checked_add(out), Some(Amount::new(liquidity)));
            }
            Err(SwapError::AmountExceedsAssets) => {
                prop_assert!(value > liquidity);
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
