//! Cross-checks between the reference and fixed-width difficulty paths, and
//! checking against published difficulty vectors.

use std::collections::BTreeMap;
use std::io::Read;

use num_bigint::BigUint;
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::{
    MINIMUM_DIFFICULTY, U256,
    difficulty::{DifficultyRule, calc_difficulty, calc_difficulty_u256},
    error::{ConsensusError, Result},
    types::{ChainConfig, Hash, Header},
    util::{parse_big256, parse_uint64},
};

/// One entry of a difficulty vector file. Every field is a decimal or
/// `0x`-prefixed hex string.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyVector {
    #[serde(alias = "ParentTimestamp", deserialize_with = "uint64_string")]
    pub parent_timestamp: u64,
    #[serde(alias = "ParentDifficulty", deserialize_with = "big256_string")]
    pub parent_difficulty: BigUint,
    #[serde(alias = "CurrentTimestamp", deserialize_with = "uint64_string")]
    pub current_timestamp: u64,
    #[serde(
        alias = "CurrentBlockNumber",
        alias = "CurrentBlocknumber",
        deserialize_with = "uint64_string"
    )]
    pub current_block_number: u64,
    #[serde(alias = "CurrentDifficulty", deserialize_with = "big256_string")]
    pub current_difficulty: BigUint,
}

fn uint64_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse_uint64(&s).map_err(serde::de::Error::custom)
}

fn big256_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BigUint, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse_big256(&s).map_err(serde::de::Error::custom)
}

/// Read a JSON object of named vectors.
pub fn load_vectors<R: Read>(reader: R) -> Result<BTreeMap<String, DifficultyVector>> {
    Ok(serde_json::from_reader(reader)?)
}

impl DifficultyVector {
    /// The parent header the vector describes. Only the uncle-free case is encoded.
    pub fn parent(&self) -> Result<Header> {
        let number = self.current_block_number.checked_sub(1).ok_or_else(|| {
            ConsensusError::InvalidVector("current block number must be at least 1".to_owned())
        })?;
        Ok(Header::new(
            number,
            self.parent_timestamp,
            self.parent_difficulty.clone(),
        ))
    }

    /// Check that both difficulty paths reproduce the expected difficulty.
    pub fn check(&self, config: &ChainConfig) -> Result<()> {
        let parent = self.parent()?;

        let calculated = calc_difficulty(config, self.current_timestamp, &parent);
        if calculated != self.current_difficulty {
            return Err(ConsensusError::Mismatch {
                expected: self.current_difficulty.clone(),
                calculated,
            });
        }

        let calculated = calc_difficulty_u256(config, self.current_timestamp, &parent)?.to_biguint();
        if calculated != self.current_difficulty {
            return Err(ConsensusError::Mismatch {
                expected: self.current_difficulty.clone(),
                calculated,
            });
        }
        Ok(())
    }
}

/// Check every vector, returning the failing ones by name.
pub fn check_vectors(
    config: &ChainConfig,
    vectors: &BTreeMap<String, DifficultyVector>,
) -> Vec<(String, ConsensusError)> {
    vectors
        .iter()
        .filter_map(|(name, vector)| {
            vector.check(config).err().map(|err| {
                warn!(%name, %err, "difficulty vector failed");
                (name.clone(), err)
            })
        })
        .collect()
}

/// Outcome of running both paths on the same input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CrossCheck {
    Agree(BigUint),
    /// The reference result needs more than 256 bits, so the paths are not compared.
    /// `bits` is a lower bound when the bomb term alone is that wide.
    OutOfRange { bits: u64 },
    /// `fixed` is `None` when the fixed-width path reported an overflow.
    Diverged {
        reference: BigUint,
        fixed: Option<U256>,
    },
}

pub fn cross_check(rule: DifficultyRule, time: u64, parent: &Header) -> CrossCheck {
    // The reference would have to build 2^exponent; the bomb alone sets the
    // lowest bit count the result can have.
    if let Some(exponent) = rule.bomb_exponent(parent).filter(|exponent| *exponent >= 256) {
        debug!(?rule, exponent, "bomb term exceeds 256 bits");
        return CrossCheck::OutOfRange {
            bits: exponent + 1,
        };
    }

    let reference = rule.reference(time, parent);
    if reference.bits() > 256 {
        debug!(?rule, bits = reference.bits(), "reference result exceeds 256 bits");
        return CrossCheck::OutOfRange {
            bits: reference.bits(),
        };
    }

    match rule.fixed(time, parent) {
        Ok(fixed) if fixed.to_biguint() == reference => CrossCheck::Agree(reference),
        Ok(fixed) => {
            warn!(?rule, %reference, %fixed, number = parent.number, "difficulty paths diverged");
            CrossCheck::Diverged {
                reference,
                fixed: Some(fixed),
            }
        }
        Err(err) => {
            warn!(?rule, %reference, %err, number = parent.number, "fixed-width path failed");
            CrossCheck::Diverged {
                reference,
                fixed: None,
            }
        }
    }
}

/// A generated input for the differential sweep.
#[derive(Clone, Debug)]
pub struct SweepCase {
    pub parent: Header,
    pub time: u64,
    pub bomb_delay: u64,
}

impl SweepCase {
    pub fn rules(&self) -> [DifficultyRule; 3] {
        [
            DifficultyRule::Frontier,
            DifficultyRule::Homestead,
            DifficultyRule::Dynamic {
                bomb_delay: self.bomb_delay,
            },
        ]
    }
}

#[derive(Clone, Debug, Default)]
pub struct SweepReport {
    pub agreed: usize,
    pub out_of_range: usize,
    pub diverged: Vec<(SweepCase, DifficultyRule, CrossCheck)>,
}

/// Seeded generator of realistic inputs: heights below 50M, block times
/// of 1 to 3000 seconds and parent difficulties of 2 to 9 random bytes.
pub struct DifferentialSweep {
    rng: StdRng,
}

impl DifferentialSweep {
    pub const MAX_NUMBER: u64 = 50_000_000;
    pub const MAX_TIME_DELTA: u64 = 3_000;

    pub fn new(seed: u64) -> Self {
        DifferentialSweep {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_case(&mut self) -> SweepCase {
        let time_delta = self.rng.gen_range(1..=Self::MAX_TIME_DELTA);
        let mut bytes = vec![0u8; self.rng.gen_range(2..10)];
        self.rng.fill_bytes(&mut bytes);
        let difficulty = BigUint::from_bytes_be(&bytes).max(BigUint::from(MINIMUM_DIFFICULTY));

        let number = self.rng.gen_range(0..Self::MAX_NUMBER);
        let parent_time = self.rng.gen_range(0..=u64::MAX - time_delta);
        let mut parent = Header::new(number, parent_time, difficulty);
        if self.rng.gen_bool(0.5) {
            parent = parent.with_uncle_hash(Hash::zero());
        }

        SweepCase {
            time: parent_time + time_delta,
            bomb_delay: self.rng.gen_range(0..Self::MAX_NUMBER),
            parent,
        }
    }

    pub fn run(&mut self, iterations: usize) -> SweepReport {
        let mut report = SweepReport::default();
        for _ in 0..iterations {
            let case = self.next_case();
            for rule in case.rules() {
                match cross_check(rule, case.time, &case.parent) {
                    CrossCheck::Agree(_) => report.agreed += 1,
                    CrossCheck::OutOfRange { .. } => report.out_of_range += 1,
                    diverged => report.diverged.push((case.clone(), rule, diverged)),
                }
            }
        }
        report
    }
}
