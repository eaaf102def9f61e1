//! Difficulty of the next block.
//!
//! Every formula exists twice: an arbitrary-precision reference in
//! [`reference`] and a 256-bit twin in [`fixed`]. Both must return the same
//! number for every input whose reference result fits in 256 bits, which the
//! conformance harness checks. Change them together.

pub mod fixed;
pub mod reference;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    EXP_DIFF_PERIOD, U256,
    error::Result,
    types::{ChainConfig, Fork, Header},
};

/// The formula that computes a child block's difficulty.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyRule {
    Frontier,
    Homestead,
    /// EIP-100 adjustment with the bomb pushed back by `bomb_delay` blocks.
    Dynamic { bomb_delay: u64 },
}

impl DifficultyRule {
    pub fn for_fork(fork: Fork) -> Self {
        match (fork, fork.bomb_delay()) {
            (Fork::Frontier, _) => DifficultyRule::Frontier,
            (_, Some(bomb_delay)) => DifficultyRule::Dynamic { bomb_delay },
            (_, None) => DifficultyRule::Homestead,
        }
    }

    /// Evaluate with arbitrary precision. Never fails.
    pub fn reference(self, time: u64, parent: &Header) -> BigUint {
        match self {
            DifficultyRule::Frontier => reference::frontier(time, parent),
            DifficultyRule::Homestead => reference::homestead(time, parent),
            DifficultyRule::Dynamic { bomb_delay } => reference::dynamic(bomb_delay, time, parent),
        }
    }

    /// Exponent of the bomb term `2^exponent` this rule adds on top of `parent`,
    /// `None` while the period count is at most one.
    ///
    /// Cheap to compute for any height, so callers can tell a result will not
    /// fit in 256 bits before the reference builds it.
    pub fn bomb_exponent(self, parent: &Header) -> Option<u64> {
        let child = u128::from(parent.number) + 1;
        let number = match self {
            DifficultyRule::Frontier | DifficultyRule::Homestead => child,
            DifficultyRule::Dynamic { bomb_delay } => child.saturating_sub(u128::from(bomb_delay)),
        };
        let periods = number / u128::from(EXP_DIFF_PERIOD);
        // at most (2^64) / 100000, so it fits back into 64 bits
        (periods > 1).then(|| (periods - 2) as u64)
    }

    /// Whether the result is certain to need more than 256 bits because of the bomb alone.
    pub fn bomb_exceeds_256_bits(self, parent: &Header) -> bool {
        self.bomb_exponent(parent).is_some_and(|exponent| exponent >= 256)
    }

    /// Evaluate in 256 bits, failing with `ConsensusError::Overflow` instead of wrapping.
    pub fn fixed(self, time: u64, parent: &Header) -> Result<U256> {
        match self {
            DifficultyRule::Frontier => fixed::frontier(time, parent),
            DifficultyRule::Homestead => fixed::homestead(time, parent),
            DifficultyRule::Dynamic { bomb_delay } => fixed::dynamic(bomb_delay, time, parent),
        }
    }
}

fn select_rule(config: &ChainConfig, parent: &Header) -> DifficultyRule {
    let next = parent.number.saturating_add(1);
    let rule = config.difficulty_rule(next);
    trace!(number = next, ?rule, "selected difficulty rule");
    rule
}

/// The difficulty a block created at `time` on top of `parent` must have.
pub fn calc_difficulty(config: &ChainConfig, time: u64, parent: &Header) -> BigUint {
    select_rule(config, parent).reference(time, parent)
}

/// Fixed-width version of [`calc_difficulty`] for hot validation loops.
pub fn calc_difficulty_u256(config: &ChainConfig, time: u64, parent: &Header) -> Result<U256> {
    select_rule(config, parent).fixed(time, parent)
}
