//! Runner configuration, read from an optional JSON file.
//!
//! Every field has a default, so a config file only needs the values it
//! changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use survivors_core::constants::TICK_RATE;
use survivors_core::types::ArenaBounds;
use survivors_sim::SimConfig;

/// Where crafting results come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FusionBackend {
    /// Deterministic local fusion.
    #[default]
    Offline,
    /// A language model reached through an external program that reads the
    /// prompt on stdin and prints the JSON reply.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub seed: u64,
    pub arena: ArenaBounds,
    /// Simulation ticks per second of game time.
    pub tick_rate: u32,
    /// Wall-clock speed multiplier. 1.0 plays in real time.
    pub speed: f64,
    /// Stop once this many rounds are cleared. 0 plays until game over.
    pub rounds_to_play: u32,
    /// Directory for the persistent item registry. In-memory when absent.
    pub store_dir: Option<PathBuf>,
    /// Drop previously generated items and fusion history on startup.
    pub reset_items: bool,
    pub fusion: FusionBackend,
    /// Spend currency in the shop between rounds.
    pub auto_shop: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            arena: ArenaBounds::default(),
            tick_rate: TICK_RATE,
            speed: 1.0,
            rounds_to_play: 3,
            store_dir: None,
            reset_items: false,
            fusion: FusionBackend::Offline,
            auto_shop: true,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        serde_json::from_str(&json)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            seed: self.seed,
            arena: self.arena,
        }
    }

    /// Game time advanced by one tick.
    pub fn tick_ms(&self) -> f64 {
        1000.0 / self.tick_rate.max(1) as f64
    }

    /// Wall-clock time between two ticks.
    pub fn tick_duration(&self) -> Duration {
        let nominal = Duration::from_nanos(1_000_000_000 / self.tick_rate.max(1) as u64);
        if self.speed > 0.001 {
            nominal.div_f64(self.speed)
        } else {
            nominal
        }
    }
}
