use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::ConsensusError;

/// Opaque 256-bit identifier of a block or of its uncle list.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Hash([u8; 32]);

/// keccak256(rlp([])), the uncle hash of a block that has no uncles.
pub const EMPTY_UNCLE_HASH: Hash = Hash([
    0x1d, 0xcc, 0x4d, 0xe8, 0xde, 0xc7, 0x5d, 0x7a, 0xab, 0x85, 0xb5, 0x67, 0xb6, 0xcc, 0xd4, 0x1a,
    0xd3, 0x12, 0x45, 0x1b, 0x94, 0x8a, 0x74, 0x13, 0xf0, 0xa1, 0x42, 0xfd, 0x40, 0xd4, 0x93, 0x47,
]);

impl Hash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    pub fn zero() -> Self {
        Hash([0; 32])
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Hash {
    type Err = ConsensusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| ConsensusError::InvalidNumber(s.to_owned()))?;
        Ok(Hash(bytes))
    }
}

/// The parent header fields the difficulty calculation reads.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub parent_hash: Hash,
    /// `EMPTY_UNCLE_HASH` when the block references no uncles.
    pub uncle_hash: Hash,
    pub difficulty: BigUint,
    pub number: u64,
    /// seconds since the unix epoch
    pub time: u64,
}

impl Header {
    /// A header without uncles.
    pub fn new(number: u64, time: u64, difficulty: BigUint) -> Self {
        Header {
            parent_hash: Hash::zero(),
            uncle_hash: EMPTY_UNCLE_HASH,
            difficulty,
            number,
            time,
        }
    }

    pub fn with_uncle_hash(mut self, uncle_hash: Hash) -> Self {
        self.uncle_hash = uncle_hash;
        self
    }

    pub fn has_uncles(&self) -> bool {
        self.uncle_hash != EMPTY_UNCLE_HASH
    }
}
