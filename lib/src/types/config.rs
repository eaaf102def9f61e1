use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyRule;

/// Protocol eras in activation order.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Fork {
    Frontier,
    Homestead,
    Byzantium,
    Constantinople,
    MuirGlacier,
    London,
    ArrowGlacier,
    GrayGlacier,
}

impl Fork {
    /// Bomb delay introduced by this fork, counted in child block heights.
    /// Frontier and Homestead run the undelayed bomb and have their own formulas.
    pub fn bomb_delay(self) -> Option<u64> {
        match self {
            Fork::Frontier | Fork::Homestead => None,
            Fork::Byzantium => Some(3_000_000),
            Fork::Constantinople => Some(5_000_000),
            Fork::MuirGlacier => Some(9_000_000),
            Fork::London => Some(9_700_000),
            Fork::ArrowGlacier => Some(10_700_000),
            Fork::GrayGlacier => Some(11_400_000),
        }
    }
}

/// Fork activation heights. `None` means the fork never activates.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ChainConfig {
    pub homestead_block: Option<u64>,
    pub byzantium_block: Option<u64>,
    pub constantinople_block: Option<u64>,
    pub muir_glacier_block: Option<u64>,
    pub london_block: Option<u64>,
    pub arrow_glacier_block: Option<u64>,
    pub gray_glacier_block: Option<u64>,
}

impl ChainConfig {
    /// Frontier rules forever.
    pub const FRONTIER: Self = Self {
        homestead_block: None,
        byzantium_block: None,
        constantinople_block: None,
        muir_glacier_block: None,
        london_block: None,
        arrow_glacier_block: None,
        gray_glacier_block: None,
    };

    /// The ethash mainnet schedule.
    pub const MAINNET: Self = Self {
        homestead_block: Some(1_150_000),
        byzantium_block: Some(4_370_000),
        constantinople_block: Some(7_280_000),
        muir_glacier_block: Some(9_200_000),
        london_block: Some(12_965_000),
        arrow_glacier_block: Some(13_773_000),
        gray_glacier_block: Some(15_050_000),
    };

    /// Frontier until `height`, Homestead from then on.
    pub fn homestead(height: u64) -> Self {
        Self {
            homestead_block: Some(height),
            ..Self::FRONTIER
        }
    }

    pub fn activation(&self, fork: Fork) -> Option<u64> {
        match fork {
            Fork::Frontier => Some(0),
            Fork::Homestead => self.homestead_block,
            Fork::Byzantium => self.byzantium_block,
            Fork::Constantinople => self.constantinople_block,
            Fork::MuirGlacier => self.muir_glacier_block,
            Fork::London => self.london_block,
            Fork::ArrowGlacier => self.arrow_glacier_block,
            Fork::GrayGlacier => self.gray_glacier_block,
        }
    }

    pub fn is_active(&self, fork: Fork, number: u64) -> bool {
        self.activation(fork).is_some_and(|height| number >= height)
    }

    /// The newest fork active at block `number`.
    pub fn fork_at(&self, number: u64) -> Fork {
        const NEWEST_FIRST: [Fork; 7] = [
            Fork::GrayGlacier,
            Fork::ArrowGlacier,
            Fork::London,
            Fork::MuirGlacier,
            Fork::Constantinople,
            Fork::Byzantium,
            Fork::Homestead,
        ];
        NEWEST_FIRST
            .into_iter()
            .find(|fork| self.is_active(*fork, number))
            .unwrap_or(Fork::Frontier)
    }

    /// The difficulty formula that applies to block `number`.
    pub fn difficulty_rule(&self, number: u64) -> DifficultyRule {
        DifficultyRule::for_fork(self.fork_at(number))
    }
}
