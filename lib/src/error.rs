use num_bigint::BigUint;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsensusError {
    /// a fixed-width operation would leave the 256-bit range
    #[error("256-bit overflow in {0}")]
    Overflow(&'static str),
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
    #[error("invalid difficulty vector: {0}")]
    InvalidVector(String),
    #[error("difficulty mismatch: expected {expected}, calculated {calculated}")]
    Mismatch {
        expected: BigUint,
        calculated: BigUint,
    },
    #[error("failed to decode difficulty vectors: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConsensusError>;
