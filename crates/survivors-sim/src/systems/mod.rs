//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions that take `&mut World` (or `&World` for
//! read-only work). Session-level state such as player stats or the wave
//! scheduler is passed in explicitly.

pub mod cleanup;
pub mod collision;
pub mod currency;
pub mod enemy;
pub mod movement;
pub mod projectile;
pub mod regen;
pub mod separation;
pub mod snapshot;
pub mod wave_scheduler;
pub mod weapon;
