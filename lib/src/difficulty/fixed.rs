//! 256-bit twins of the formulas in [`super::reference`].
//!
//! Every step uses checked arithmetic. A step that would leave the 256-bit
//! range returns `ConsensusError::Overflow` naming the step, so a wrapped
//! value can never pass for a valid difficulty.

use crate::{
    DIFFICULTY_BOUND_DIVISOR_BIT_SHIFT, DURATION_LIMIT, DYNAMIC_TIME_STEP, EXP_DIFF_PERIOD,
    HOMESTEAD_TIME_STEP, MAX_ADJUSTMENT_DOWN, MINIMUM_DIFFICULTY, U256,
    error::{ConsensusError, Result},
    types::Header,
};

pub fn frontier(time: u64, parent: &Header) -> Result<U256> {
    let pdiff = parent_difficulty(parent)?;
    let adjust = pdiff >> DIFFICULTY_BOUND_DIVISOR_BIT_SHIFT;

    let diff = if time_delta(time, parent) < i128::from(DURATION_LIMIT) {
        pdiff
            .checked_add(adjust)
            .ok_or(ConsensusError::Overflow("frontier adjustment"))?
    } else {
        pdiff
            .checked_sub(adjust)
            .ok_or(ConsensusError::Overflow("frontier adjustment"))?
    };
    let diff = at_least_minimum(diff);

    match bomb(child_number(parent) / u128::from(EXP_DIFF_PERIOD))? {
        Some(bomb) => Ok(at_least_minimum(
            diff.checked_add(bomb)
                .ok_or(ConsensusError::Overflow("difficulty bomb"))?,
        )),
        None => Ok(diff),
    }
}

pub fn homestead(time: u64, parent: &Header) -> Result<U256> {
    let factor = adjustment_factor(time_delta(time, parent), HOMESTEAD_TIME_STEP, 1);
    let diff = adjust(parent_difficulty(parent)?, factor)?;
    add_bomb(diff, child_number(parent) / u128::from(EXP_DIFF_PERIOD))
}

pub fn dynamic(bomb_delay: u64, time: u64, parent: &Header) -> Result<U256> {
    let base = if parent.has_uncles() { 2 } else { 1 };
    let factor = adjustment_factor(time_delta(time, parent), DYNAMIC_TIME_STEP, base);
    let diff = adjust(parent_difficulty(parent)?, factor)?;

    // parent.number - (bomb_delay - 1), floored at zero
    let fake_number = child_number(parent).saturating_sub(u128::from(bomb_delay));
    add_bomb(diff, fake_number / u128::from(EXP_DIFF_PERIOD))
}

fn parent_difficulty(parent: &Header) -> Result<U256> {
    U256::from_biguint(&parent.difficulty).ok_or(ConsensusError::Overflow("parent difficulty"))
}

fn time_delta(time: u64, parent: &Header) -> i128 {
    i128::from(time) - i128::from(parent.time)
}

fn child_number(parent: &Header) -> u128 {
    u128::from(parent.number) + 1
}

/// max(base - delta // step, -99), the magnitude always fits in 64 bits
fn adjustment_factor(delta: i128, step: u64, base: i128) -> i128 {
    (base - delta.div_euclid(i128::from(step))).max(-MAX_ADJUSTMENT_DOWN)
}

/// max(pdiff + (pdiff >> 11) * factor, MINIMUM_DIFFICULTY)
fn adjust(pdiff: U256, factor: i128) -> Result<U256> {
    let quotient = pdiff >> DIFFICULTY_BOUND_DIVISOR_BIT_SHIFT;
    let magnitude = u64::try_from(factor.unsigned_abs())
        .map_err(|_| ConsensusError::Overflow("adjustment factor"))?;
    let step = quotient
        .checked_mul(U256::from(magnitude))
        .ok_or(ConsensusError::Overflow("adjustment"))?;

    let diff = if factor < 0 {
        pdiff.checked_sub(step)
    } else {
        pdiff.checked_add(step)
    };
    diff.map(at_least_minimum)
        .ok_or(ConsensusError::Overflow("adjustment"))
}

fn add_bomb(diff: U256, periods: u128) -> Result<U256> {
    match bomb(periods)? {
        Some(bomb) => diff
            .checked_add(bomb)
            .ok_or(ConsensusError::Overflow("difficulty bomb")),
        None => Ok(diff),
    }
}

/// 2^(periods - 2) for more than one period. A shift past bit 255 is an overflow.
fn bomb(periods: u128) -> Result<Option<U256>> {
    if periods <= 1 {
        return Ok(None);
    }
    let exponent = periods - 2;
    if exponent >= 256 {
        return Err(ConsensusError::Overflow("difficulty bomb"));
    }
    Ok(Some(U256::one() << exponent as usize))
}

fn at_least_minimum(diff: U256) -> U256 {
    diff.max(U256::from(MINIMUM_DIFFICULTY))
}
