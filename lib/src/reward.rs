use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::{
    BASE_UNITS_PER_COIN, FIRST_HALVING_HEIGHT, HALVING_INTERVAL, INITIAL_REWARD, REWARD_FLOOR,
    REWARD_FLOOR_HEIGHT,
};

/// How far back an uncle may be for its reward to be non-zero.
pub const UNCLE_DEPTH: u64 = 8;
/// The miner gets `1/32` of the block reward for every included uncle.
pub const UNCLE_INCLUSION_DIVISOR: u64 = 32;

/// Reward in base units for mining the block at `height`.
///
/// 2 coins until the first halving at 100000, halved every 50000 blocks
/// after that, and fixed at 0.06 coins from 300000 on.
pub fn block_reward(height: u64) -> BigUint {
    let initial = BigUint::from(INITIAL_REWARD) * BASE_UNITS_PER_COIN;
    if height < FIRST_HALVING_HEIGHT {
        return initial;
    }
    if height >= REWARD_FLOOR_HEIGHT {
        return BigUint::from(REWARD_FLOOR);
    }

    let halvings = 1 + (height - FIRST_HALVING_HEIGHT) / HALVING_INTERVAL;
    let mut reward = initial;
    for _ in 0..halvings {
        reward /= 2u8;
    }
    reward
}

/// Payouts for one block.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Rewards {
    /// block reward plus the inclusion bonus for every uncle
    pub miner: BigUint,
    /// one entry per uncle, in the order given
    pub uncles: Vec<BigUint>,
}

/// Block and uncle rewards for the block at `number` including uncles at `uncle_numbers`.
///
/// Uncle heights are expected to be validated upstream (`number - 7..number`);
/// an uncle `UNCLE_DEPTH` or more blocks back earns nothing.
pub fn accumulate_rewards(number: u64, uncle_numbers: &[u64]) -> Rewards {
    let block_reward = block_reward(number);
    let inclusion = &block_reward / UNCLE_INCLUSION_DIVISOR;

    let uncles: Vec<BigUint> = uncle_numbers
        .iter()
        .map(|&uncle| {
            let distance = (u128::from(uncle) + u128::from(UNCLE_DEPTH))
                .saturating_sub(u128::from(number));
            if distance == 0 {
                BigUint::zero()
            } else {
                &block_reward * distance / UNCLE_DEPTH
            }
        })
        .collect();

    let miner = block_reward + inclusion * uncles.len();
    Rewards { miner, uncles }
}
