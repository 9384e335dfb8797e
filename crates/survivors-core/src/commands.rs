//! Player intents sent from the presentation layer to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::items::ItemId;

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Run lifecycle ---
    /// Start the first round of a fresh run.
    StartRun,
    /// Reset everything and start again from round 1.
    Restart,
    /// Leave the shop and start the next round.
    StartNextRound,
    /// Freeze combat.
    Pause,
    /// Unfreeze combat.
    Resume,

    // --- Input ---
    /// Current movement direction (normalized by the simulation).
    SetMovement { x: f64, y: f64 },

    // --- Shop ---
    /// Buy one of the current shop offers.
    BuyItem { item_id: ItemId },
    /// Buy and equip any pool item, such as a freshly crafted one.
    EquipItem { item_id: ItemId },
    /// Replace the shop offers.
    RerollShop,

    // --- Crafting ---
    /// Fuse two pool items into a new one.
    CraftItems { first: ItemId, second: ItemId },
    /// Remove a generated item from the item pool.
    DiscardItem { item_id: ItemId },
}
