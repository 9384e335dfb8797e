//! Core types and definitions for the survivors arena simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! stats and item effects, components, commands, events, state snapshots,
//! errors, and tuning constants. It has no dependency on any runtime
//! framework or on the ECS.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod items;
pub mod state;
pub mod stats;
pub mod types;
