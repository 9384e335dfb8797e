//! Headless survivors arena runner.
//!
//! This crate runs the session engine on a fixed-rate game-loop thread,
//! steers it with a simple autopilot and reports the finished run as JSON.

pub mod autopilot;
pub mod config;
pub mod game_loop;
pub mod logging;
pub mod state;
