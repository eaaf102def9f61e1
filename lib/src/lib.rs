pub mod conformance;
pub mod difficulty;
pub mod error;
pub mod reward;
pub mod types;
pub mod util;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use uint::construct_uint;

construct_uint! {
    // construct an unsigned 256-bit integer
    // 4 x 64bit
    #[derive(Serialize, Deserialize)]
    pub struct U256(4);
}

impl U256 {
    /// Narrow an arbitrary-precision value, `None` if it needs more than 256 bits.
    pub fn from_biguint(value: &BigUint) -> Option<Self> {
        if value.bits() > 256 {
            return None;
        }
        Some(U256::from_big_endian(&value.to_bytes_be()))
    }

    pub fn to_biguint(&self) -> BigUint {
        let mut bytes = [0u8; 32];
        self.to_big_endian(&mut bytes);
        BigUint::from_bytes_be(&bytes)
    }
}

/// The difficulty can never drop below this, before the bomb is added.
pub const MINIMUM_DIFFICULTY: u64 = 131_072;
/// Bound divisor of the difficulty, the fixed-width path shifts by its log2 instead
pub const DIFFICULTY_BOUND_DIVISOR: u64 = 2048;
pub const DIFFICULTY_BOUND_DIVISOR_BIT_SHIFT: usize = 11;
/// Frontier decides between raising and lowering the difficulty on this block time in seconds
pub const DURATION_LIMIT: u64 = 13;
/// Homestead block time step in seconds
pub const HOMESTEAD_TIME_STEP: u64 = 10;
/// Block time step in seconds for the bomb-delay eras
pub const DYNAMIC_TIME_STEP: u64 = 9;
/// The largest downward adjustment factor
pub const MAX_ADJUSTMENT_DOWN: i128 = 99;
/// Blocks per exponential difficulty period, a.k.a. the bomb
pub const EXP_DIFF_PERIOD: u64 = 100_000;

/// Base units per whole coin (18 decimals)
pub const BASE_UNITS_PER_COIN: u64 = 1_000_000_000_000_000_000;
/// Reward in coins paid before the first halving - multiply by 10^18 to get base units
pub const INITIAL_REWARD: u64 = 2;
/// Height of the first halving
pub const FIRST_HALVING_HEIGHT: u64 = 100_000;
/// Halving interval in blocks
pub const HALVING_INTERVAL: u64 = 50_000;
/// Height from which the reward stays at `REWARD_FLOOR`
pub const REWARD_FLOOR_HEIGHT: u64 = 300_000;
/// 0.06 coins in base units
pub const REWARD_FLOOR: u64 = 60_000_000_000_000_000;
