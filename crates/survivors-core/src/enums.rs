//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Top-level session phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run started yet.
    #[default]
    Idle,
    /// Combat round in progress.
    Active,
    /// Combat frozen by the player.
    Paused,
    /// Between rounds: shop and crafting are open.
    Shop,
    /// Player died; waiting for a restart.
    GameOver,
}

/// Observable state of the wave scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// No round has been started.
    #[default]
    Idle,
    /// Enemies of the current wave are still being spawned.
    Spawning,
    /// Wave fully spawned; the wave timer is counting down.
    WaveTimerRunning,
    /// Wave cleared; pausing before the next wave.
    Grace,
    /// Round timer expired; waiting for the next round to be started.
    RoundEnded,
}

/// Item quality tier. Ordered from common to legendary.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    /// Shop price of an item of this rarity.
    pub fn cost(self) -> u32 {
        match self {
            Rarity::Common => 50,
            Rarity::Uncommon => 100,
            Rarity::Rare => 200,
            Rarity::Epic => 300,
            Rarity::Legendary => 500,
        }
    }

    /// Case-insensitive parse of a rarity name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "common" => Some(Self::Common),
            "uncommon" => Some(Self::Uncommon),
            "rare" => Some(Self::Rare),
            "epic" => Some(Self::Epic),
            "legendary" => Some(Self::Legendary),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }

    /// The next tier up, saturating at legendary.
    pub fn upgraded(self) -> Self {
        match self {
            Self::Common => Self::Uncommon,
            Self::Uncommon => Self::Rare,
            Self::Rare => Self::Epic,
            Self::Epic | Self::Legendary => Self::Legendary,
        }
    }
}
