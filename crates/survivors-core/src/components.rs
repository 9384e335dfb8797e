//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use serde::{Deserialize, Serialize};

use crate::types::Position;

/// Marks the player entity. Exactly one exists per session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player;

/// Enemy state. Position and velocity are separate components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub max_health: f64,
    pub current_health: f64,
    pub speed: f64,
    pub contact_damage: f64,
    /// Cleared on death or removal; dead enemies are filtered lazily.
    pub alive: bool,
}

/// Single-use damage carrier fired by a weapon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub damage: f64,
    /// Firing position, for the range cutoff.
    pub origin: Position,
    pub max_range: f64,
    pub active: bool,
}

/// Currency dropped by a killed enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyDrop {
    pub value: u32,
    pub active: bool,
    /// Bob phase offset (radians), randomized at spawn.
    pub bob_phase: f64,
    /// Vertical position the bob oscillates around.
    pub rest_y: f64,
}

/// Circular collision body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Collider {
    pub radius: f64,
}

/// Auto-firing weapon carried by the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub base_damage: f64,
    /// Remaining cooldown (ms). Ready when not positive.
    pub cooldown_ms: f64,
}

/// Contact-damage invulnerability window.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Invulnerability {
    /// Clock time of the last hit or dodge (ms).
    pub last_hit_ms: f64,
    /// Length of the current window (ms).
    pub duration_ms: f64,
}

/// Health regeneration bookkeeping.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RegenTimer {
    /// Clock time of the last regenerated point (ms).
    pub last_regen_ms: f64,
}

/// Requested movement direction from the input layer. Not normalized.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MovementIntent {
    pub x: f64,
    pub y: f64,
}

// Position and Velocity are defined in types.rs and used as components too.
