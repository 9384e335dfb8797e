//! Events emitted by the simulation for rendering and UI feedback.

use serde::{Deserialize, Serialize};

use crate::items::ItemId;
use crate::types::Position;

/// Observable side effects of a tick or of a processed command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    // --- Combat ---
    EnemySpawned { position: Position },
    EnemyDied { position: Position },
    /// Damage number over an enemy.
    DamageDealt {
        position: Position,
        value: f64,
        is_crit: bool,
    },
    /// Damage number over the player.
    PlayerDamaged { position: Position, value: f64 },
    Dodged { position: Position },
    Healed { position: Position },
    /// Pickup particles and currency display refresh.
    CurrencyPickedUp { value: u32, total: u32 },

    // --- Progression ---
    WaveStarted { round: u32, wave: u32 },
    RoundComplete { round: u32 },
    GameOver { round: u32 },

    // --- Shop ---
    ItemPurchased { item_id: ItemId, cost: u32 },
    ShopRerolled { cost: u32 },
    CraftStarted { first: ItemId, second: ItemId },
    CraftCompleted { item_id: ItemId, from_cache: bool },
    CraftFailed { reason: String },
    ItemDiscarded { item_id: ItemId },

    /// An intent was refused; nothing changed.
    ActionRejected { reason: String },
}
