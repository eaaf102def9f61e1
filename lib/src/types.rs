mod config;
mod header;

pub use config::{ChainConfig, Fork};
pub use header::{EMPTY_UNCLE_HASH, Hash, Header};
