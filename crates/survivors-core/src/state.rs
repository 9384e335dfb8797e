//! Game state snapshot: the complete visible state published after each tick.

use serde::{Deserialize, Serialize};

use crate::enums::{GamePhase, WavePhase};
use crate::events::GameEvent;
use crate::items::{Item, ItemStack};
use crate::stats::Stats;
use crate::types::{Position, SimTime};

/// Complete read-only view of the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub player: PlayerView,
    pub round: RoundView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<Position>,
    pub currency_drops: Vec<CurrencyView>,
    /// Per-run inventory, stacked.
    pub inventory: Vec<ItemStack>,
    pub shop: ShopView,
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: Position,
    pub stats: Stats,
    /// Whether contact damage is currently ignored.
    pub invulnerable: bool,
}

/// Round HUD data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundView {
    pub round_number: u32,
    pub wave_number: u32,
    pub wave_phase: WavePhase,
    /// Whole seconds left in the round, never negative.
    pub time_remaining_secs: u32,
    pub wave_time_remaining_ms: f64,
    pub grace_remaining_ms: f64,
    pub enemy_count: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnemyView {
    pub position: Position,
    pub current_health: f64,
    pub max_health: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyView {
    pub position: Position,
    pub value: u32,
    /// Moving toward the player rather than bobbing.
    pub magnetized: bool,
}

/// Shop and crafting state. Populated while the shop is open.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopView {
    pub offers: Vec<ShopOffer>,
    /// Every item that can appear in the shop.
    pub item_pool: Vec<Item>,
    pub reroll_cost: u32,
    pub craft_cost: u32,
    pub craft_pending: bool,
    /// Result of the last successful craft, until the next one starts.
    pub last_crafted: Option<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopOffer {
    pub item: Item,
    pub cost: u32,
    pub affordable: bool,
}
