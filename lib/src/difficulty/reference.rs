//! Arbitrary-precision difficulty formulas. These define the consensus rules;
//! the fixed-width path in [`super::fixed`] is measured against them.

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Pow, Zero};

use crate::{
    DIFFICULTY_BOUND_DIVISOR, DURATION_LIMIT, DYNAMIC_TIME_STEP, EXP_DIFF_PERIOD,
    HOMESTEAD_TIME_STEP, MAX_ADJUSTMENT_DOWN, MINIMUM_DIFFICULTY, types::Header,
};

/// block_diff = pdiff + pdiff / 2048 * (1 if time - ptime < 13 else -1) + 2^(period - 2)
pub fn frontier(time: u64, parent: &Header) -> BigUint {
    let adjust = &parent.difficulty / DIFFICULTY_BOUND_DIVISOR;
    let minimum = BigUint::from(MINIMUM_DIFFICULTY);

    let mut diff = if time_delta(time, parent) < BigInt::from(DURATION_LIMIT) {
        &parent.difficulty + adjust
    } else {
        &parent.difficulty - adjust
    };
    if diff < minimum {
        diff = minimum.clone();
    }

    if let Some(bomb) = bomb(&child_number(parent)) {
        diff += bomb;
        diff = diff.max(minimum);
    }
    diff
}

/// block_diff = pdiff + pdiff / 2048 * max(1 - (time - ptime) // 10, -99) + 2^(period - 2)
pub fn homestead(time: u64, parent: &Header) -> BigUint {
    let factor = adjustment_factor(time_delta(time, parent), HOMESTEAD_TIME_STEP, 1);
    let mut diff = adjust(&parent.difficulty, factor);

    if let Some(bomb) = bomb(&child_number(parent)) {
        diff += bomb;
    }
    diff
}

/// EIP-100 with a delayed bomb (EIP-649 and successors):
///
/// block_diff = pdiff + pdiff / 2048 * max((2 if uncles else 1) - (time - ptime) // 9, -99)
///              + 2^(fake_number // 100000 - 2)
///
/// `bomb_delay` is counted in child heights, so the parent is compared
/// against `bomb_delay - 1`.
pub fn dynamic(bomb_delay: u64, time: u64, parent: &Header) -> BigUint {
    let base = if parent.has_uncles() { 2 } else { 1 };
    let factor = adjustment_factor(time_delta(time, parent), DYNAMIC_TIME_STEP, base);
    let mut diff = adjust(&parent.difficulty, factor);

    let delay_from_parent = BigInt::from(bomb_delay) - BigInt::one();
    let number = BigInt::from(parent.number);
    let fake_number = if number >= delay_from_parent {
        magnitude(number - delay_from_parent)
    } else {
        BigUint::zero()
    };

    if let Some(bomb) = bomb(&fake_number) {
        diff += bomb;
    }
    diff
}

fn time_delta(time: u64, parent: &Header) -> BigInt {
    BigInt::from(time) - BigInt::from(parent.time)
}

fn child_number(parent: &Header) -> BigUint {
    BigUint::from(parent.number) + BigUint::one()
}

/// max(base - delta // step, -99), flooring the division
fn adjustment_factor(delta: BigInt, step: u64, base: i64) -> BigInt {
    let factor = BigInt::from(base) - delta.div_floor(&BigInt::from(step));
    factor.max(BigInt::from(-MAX_ADJUSTMENT_DOWN))
}

/// max(pdiff + pdiff / 2048 * factor, MINIMUM_DIFFICULTY)
fn adjust(difficulty: &BigUint, factor: BigInt) -> BigUint {
    let quotient = BigInt::from(difficulty / DIFFICULTY_BOUND_DIVISOR);
    let diff = BigInt::from(difficulty.clone()) + quotient * factor;
    let minimum = BigInt::from(MINIMUM_DIFFICULTY);
    if diff < minimum {
        magnitude(minimum)
    } else {
        magnitude(diff)
    }
}

/// 2^(number / 100000 - 2), or nothing while the period count is at most one
fn bomb(number: &BigUint) -> Option<BigUint> {
    let periods = number / EXP_DIFF_PERIOD;
    let two = BigUint::from(2u8);
    if periods < two {
        return None;
    }
    Some(Pow::pow(two.clone(), periods - two))
}

/// Callers only pass non-negative values.
fn magnitude(value: BigInt) -> BigUint {
    match value.into_parts() {
        (Sign::Minus, _) => BigUint::zero(),
        (_, magnitude) => magnitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hash;

    fn header(number: u64, time: u64, difficulty: u64) -> Header {
        Header::new(number, time, BigUint::from(difficulty))
    }

    #[test]
    fn frontier_raises_fast_and_lowers_slow_blocks() {
        let parent = header(499_999, 1_000_000, 1_000_000_000);
        // both include the 2^3 bomb
        assert_eq!(frontier(1_000_005, &parent), BigUint::from(1_000_488_289u64));
        assert_eq!(frontier(1_000_020, &parent), BigUint::from(999_511_727u64));
    }

    #[test]
    fn frontier_treats_earlier_child_as_fast() {
        let parent = header(10, 1_000_000, 1_000_000_000);
        assert_eq!(frontier(999_990, &parent), BigUint::from(1_000_488_281u64));
    }

    #[test]
    fn frontier_floors_at_minimum() {
        let parent = header(0, 1_000_000, MINIMUM_DIFFICULTY);
        assert_eq!(frontier(1_000_100, &parent), BigUint::from(MINIMUM_DIFFICULTY));
    }

    #[test]
    fn homestead_adjustment_steps() {
        let parent = header(1_499_999, 1_500_000_000, 60_000_000_000_000);
        let cases = [
            (0, 60_029_296_883_192u64),
            (9, 60_029_296_883_192),
            (10, 60_000_000_008_192),
            (20, 59_970_703_133_192),
            (5_000, 57_099_609_383_192),
        ];
        for (delta, expected) in cases {
            assert_eq!(
                homestead(parent.time + delta, &parent),
                BigUint::from(expected),
                "delta {delta}"
            );
        }
    }

    #[test]
    fn homestead_divides_negative_delta_by_floor() {
        let parent = header(10, 1_000_000, 1_000_000_000);
        assert_eq!(homestead(999_990, &parent), BigUint::from(1_000_976_562u64));
    }

    #[test]
    fn homestead_bomb_dominates_late_chain() {
        let parent = header(9_999_999, 1_000_000, MINIMUM_DIFFICULTY);
        // 131072 / 2048 = 64 for the one-step raise, plus 2^98
        let expected = BigUint::from(2u8).pow(98u32) + BigUint::from(MINIMUM_DIFFICULTY + 64);
        assert_eq!(homestead(1_000_000, &parent), expected);
    }

    #[test]
    fn dynamic_uncles_add_one_quotient() {
        let parent = header(12_999_999, 1_600_000_000, 1_000_000_000_000_000);
        let without = dynamic(9_700_000, 1_600_000_009, &parent);
        let with = dynamic(9_700_000, 1_600_000_009, &parent.clone().with_uncle_hash(Hash::zero()));
        assert_eq!(without, BigUint::from(1_000_002_147_483_648u64));
        assert_eq!(with, BigUint::from(1_000_490_428_733_648u64));
        assert_eq!(with - without, BigUint::from(1_000_000_000_000_000u64 / 2048));
    }

    #[test]
    fn dynamic_bomb_delay_boundaries() {
        let parent = header(2_999_999, 1_000_000, 1_000_000_000);
        assert_eq!(dynamic(3_000_000, 1_000_010, &parent), BigUint::from(1_000_000_000u64));

        let parent = header(3_199_999, 1_000_000, 1_000_000_000);
        assert_eq!(dynamic(3_000_000, 1_000_010, &parent), BigUint::from(1_000_000_001u64));
    }

    #[test]
    fn dynamic_zero_delay_counts_from_child() {
        let parent = header(250_000, 1_000_000, 1_000_000_000);
        assert_eq!(dynamic(0, 1_000_010, &parent), BigUint::from(1_000_000_001u64));
    }

    #[test]
    fn dynamic_clamps_slow_blocks() {
        let parent = header(100, 1_000_000, 1_000_000_000).with_uncle_hash(Hash::zero());
        assert_eq!(dynamic(5_000_000, 1_003_000, &parent), BigUint::from(951_660_181u64));
    }
}
