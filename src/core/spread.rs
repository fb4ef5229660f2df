//! Spread calculation for cross-venue quote comparison
//!
//! Pure math over a pair of prices for the same instrument on two venues.
//! All public functions reject non-finite and non-positive inputs so that
//! nothing downstream ever sees a NaN spread.

use serde::Serialize;
use std::fmt;

// =============================================================================
// Direction
// =============================================================================

/// Which leg to buy and which to sell, relative to the sorted venue pair
/// (venue A is the lexicographically smaller venue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Price on venue A is lower: buy on A, sell on B
    BuyASellB,
    /// Price on venue B is lower: buy on B, sell on A
    BuyBSellA,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::BuyASellB => write!(f, "BUY_A_SELL_B"),
            Direction::BuyBSellA => write!(f, "BUY_B_SELL_A"),
        }
    }
}

// =============================================================================
// SpreadQuote
// =============================================================================

/// Result of one pairwise spread computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpreadQuote {
    /// Price on venue A (the smaller venue of the sorted pair)
    pub price_a: f64,
    /// Price on venue B
    pub price_b: f64,
    /// Absolute price difference
    pub spread_abs: f64,
    /// Midpoint of the two prices
    pub mid_price: f64,
    /// Spread as a percentage of the midpoint
    pub spread_pct: f64,
    /// Which side is cheap
    pub direction: Direction,
    /// Profit estimate at the configured notional: `spread_abs × notional`
    pub implied_profit: f64,
}

impl SpreadQuote {
    /// Compute the spread between two venue prices.
    ///
    /// Returns `None` when either input is non-positive or non-finite, or
    /// when any derived field fails to be finite.
    #[inline]
    #[must_use]
    pub fn compute(price_a: f64, price_b: f64, notional_units: f64) -> Option<Self> {
        if !price_a.is_finite() || !price_b.is_finite() || price_a <= 0.0 || price_b <= 0.0 {
            return None;
        }

        let spread_abs = (price_a - price_b).abs();
        let mid_price = (price_a + price_b) / 2.0;
        let spread_pct = 100.0 * spread_abs / mid_price;
        let implied_profit = spread_abs * notional_units;
        let direction = if price_a < price_b {
            Direction::BuyASellB
        } else {
            Direction::BuyBSellA
        };

        if !spread_abs.is_finite()
            || !mid_price.is_finite()
            || !spread_pct.is_finite()
            || !implied_profit.is_finite()
        {
            return None;
        }

        Some(Self {
            price_a,
            price_b,
            spread_abs,
            mid_price,
            spread_pct,
            direction,
            implied_profit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        // 100 vs 101: abs 1.0, mid 100.5, pct ~0.995%, profit 1000 at 1000 units
        let q = SpreadQuote::compute(100.0, 101.0, 1_000.0).unwrap();
        assert_eq!(q.spread_abs, 1.0);
        assert_eq!(q.mid_price, 100.5);
        assert!((q.spread_pct - 0.995_024_875).abs() < 1e-6);
        assert_eq!(q.implied_profit, 1_000.0);
        assert_eq!(q.direction, Direction::BuyASellB);
    }

    #[test]
    fn test_direction_flips_with_price_order() {
        let q = SpreadQuote::compute(101.0, 100.0, 1_000.0).unwrap();
        assert_eq!(q.direction, Direction::BuyBSellA);
    }

    #[test]
    fn test_equal_prices_zero_spread() {
        let q = SpreadQuote::compute(100.0, 100.0, 1_000.0).unwrap();
        assert_eq!(q.spread_abs, 0.0);
        assert_eq!(q.spread_pct, 0.0);
        assert_eq!(q.implied_profit, 0.0);
        // Equal prices are "B is not higher", so the cheap side is B
        assert_eq!(q.direction, Direction::BuyBSellA);
    }

    #[test]
    fn test_pct_is_symmetric_in_inputs() {
        let q1 = SpreadQuote::compute(100.0, 103.0, 1_000.0).unwrap();
        let q2 = SpreadQuote::compute(103.0, 100.0, 1_000.0).unwrap();
        assert_eq!(q1.spread_pct, q2.spread_pct);
        assert_eq!(q1.spread_abs, q2.spread_abs);
        assert_ne!(q1.direction, q2.direction);
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        assert!(SpreadQuote::compute(0.0, 100.0, 1_000.0).is_none());
        assert!(SpreadQuote::compute(100.0, 0.0, 1_000.0).is_none());
        assert!(SpreadQuote::compute(-1.0, 100.0, 1_000.0).is_none());
    }

    #[test]
    fn test_rejects_non_finite_inputs() {
        assert!(SpreadQuote::compute(f64::NAN, 100.0, 1_000.0).is_none());
        assert!(SpreadQuote::compute(100.0, f64::INFINITY, 1_000.0).is_none());
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::BuyASellB.to_string(), "BUY_A_SELL_B");
        assert_eq!(Direction::BuyBSellA.to_string(), "BUY_B_SELL_A");
    }

    // =========================================================================
    // Property-based tests (proptest)
    // =========================================================================
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn never_panics(a in -1e12f64..1e12, b in -1e12f64..1e12) {
                let _ = SpreadQuote::compute(a, b, 1_000.0);
            }

            #[test]
            fn all_fields_finite(a in 0.001f64..1e9, b in 0.001f64..1e9) {
                let q = SpreadQuote::compute(a, b, 1_000.0).unwrap();
                prop_assert!(q.spread_abs.is_finite());
                prop_assert!(q.mid_price.is_finite());
                prop_assert!(q.spread_pct.is_finite());
                prop_assert!(q.implied_profit.is_finite());
            }

            #[test]
            fn pct_non_negative(a in 0.001f64..1e9, b in 0.001f64..1e9) {
                let q = SpreadQuote::compute(a, b, 1_000.0).unwrap();
                prop_assert!(q.spread_pct >= 0.0);
            }

            #[test]
            fn pct_symmetric(a in 0.001f64..1e9, b in 0.001f64..1e9) {
                let q1 = SpreadQuote::compute(a, b, 1_000.0).unwrap();
                let q2 = SpreadQuote::compute(b, a, 1_000.0).unwrap();
                prop_assert_eq!(q1.spread_pct, q2.spread_pct);
            }

            #[test]
            fn cheap_side_matches_direction(a in 0.001f64..1e9, b in 0.001f64..1e9) {
                let q = SpreadQuote::compute(a, b, 1_000.0).unwrap();
                match q.direction {
                    Direction::BuyASellB => prop_assert!(a < b),
                    Direction::BuyBSellA => prop_assert!(a >= b),
                }
            }
        }
    }
}
