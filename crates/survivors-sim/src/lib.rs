//! Simulation engine for the survivors arena.
//!
//! Owns the hecs ECS world, runs systems once per externally driven tick,
//! and produces `GameStateSnapshot`s for the presentation layer.

pub mod combat;
pub mod engine;
pub mod systems;
pub mod targeting;
pub mod world_setup;

pub use engine::{SessionEngine, SimConfig};

#[cfg(test)]
mod tests;
