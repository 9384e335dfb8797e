//! Scripted player for headless runs.
//!
//! The autopilot reads published snapshots and answers with commands: it
//! starts the run, steers away from nearby enemies (or toward loose
//! currency), shops between rounds and decides when the run is over.

use serde::Serialize;

use survivors_core::commands::PlayerCommand;
use survivors_core::enums::GamePhase;
use survivors_core::items::ItemStack;
use survivors_core::state::GameStateSnapshot;
use survivors_core::types::Position;

use crate::config::AppConfig;

/// Enemies closer than this push the player away.
const THREAT_RADIUS: f64 = 160.0;

/// What to do after looking at one snapshot.
#[derive(Debug, Default)]
pub struct Decision {
    pub commands: Vec<PlayerCommand>,
    pub finished: bool,
}

pub struct Autopilot {
    auto_shop: bool,
    rounds_to_play: u32,
    started: bool,
    /// Round whose shop visit has already been handled.
    shopped_round: Option<u32>,
}

impl Autopilot {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            auto_shop: config.auto_shop,
            rounds_to_play: config.rounds_to_play,
            started: false,
            shopped_round: None,
        }
    }

    pub fn step(&mut self, snapshot: &GameStateSnapshot) -> Decision {
        let mut decision = Decision::default();
        match snapshot.phase {
            GamePhase::Idle => {
                if !self.started {
                    self.started = true;
                    decision.commands.push(PlayerCommand::StartRun);
                }
            }
            GamePhase::Active => {
                let (x, y) = steer(snapshot);
                decision.commands.push(PlayerCommand::SetMovement { x, y });
            }
            GamePhase::Shop => {
                let round = snapshot.round.round_number;
                if self.rounds_to_play > 0 && round >= self.rounds_to_play {
                    decision.finished = true;
                } else if self.shopped_round != Some(round) {
                    self.shopped_round = Some(round);
                    if self.auto_shop {
                        decision.commands.extend(shopping_list(snapshot));
                    }
                    decision.commands.push(PlayerCommand::StartNextRound);
                }
            }
            GamePhase::Paused => decision.commands.push(PlayerCommand::Resume),
            GamePhase::GameOver => decision.finished = true,
        }
        decision
    }
}

/// Movement direction for this snapshot. Unnormalized; the engine
/// normalizes intents.
pub fn steer(snapshot: &GameStateSnapshot) -> (f64, f64) {
    let player = snapshot.player.position;

    let mut away = (0.0, 0.0);
    for enemy in &snapshot.enemies {
        let dx = player.x - enemy.position.x;
        let dy = player.y - enemy.position.y;
        let dist_sq = dx * dx + dy * dy;
        if dist_sq > 0.0 && dist_sq < THREAT_RADIUS * THREAT_RADIUS {
            away.0 += dx / dist_sq;
            away.1 += dy / dist_sq;
        }
    }
    if away != (0.0, 0.0) {
        return away;
    }

    nearest(&player, snapshot.currency_drops.iter().map(|d| d.position))
        .map_or((0.0, 0.0), |target| (target.x - player.x, target.y - player.y))
}

fn nearest(origin: &Position, candidates: impl Iterator<Item = Position>) -> Option<Position> {
    candidates.min_by(|a, b| origin.distance_to(a).total_cmp(&origin.distance_to(b)))
}

/// Commands for one shop visit: fuse the first two owned items if that
/// pair has never been fused, then buy the cheapest offers that fit the
/// remaining budget.
pub fn shopping_list(snapshot: &GameStateSnapshot) -> Vec<PlayerCommand> {
    let mut commands = Vec::new();
    let mut budget = snapshot.player.stats.currency;

    let shop = &snapshot.shop;
    if let [a, b, ..] = snapshot.inventory.as_slice() {
        let (first, second) = (&a.item.id, &b.item.id);
        let already_fused = shop.item_pool.iter().any(|item| {
            item.parents.as_ref().is_some_and(|(p, q)| {
                (p == first && q == second) || (p == second && q == first)
            })
        });
        if !already_fused && !shop.craft_pending && budget >= shop.craft_cost {
            budget -= shop.craft_cost;
            commands.push(PlayerCommand::CraftItems {
                first: first.clone(),
                second: second.clone(),
            });
        }
    }

    let mut offers: Vec<_> = shop.offers.iter().collect();
    offers.sort_by_key(|offer| offer.cost);
    for offer in offers {
        if offer.cost <= budget {
            budget -= offer.cost;
            commands.push(PlayerCommand::BuyItem {
                item_id: offer.item.id.clone(),
            });
        }
    }
    commands
}

/// Final report printed when the run ends.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub rounds_cleared: u32,
    pub game_over: bool,
    pub elapsed_ms: f64,
    pub health: f64,
    pub currency: u32,
    pub inventory: Vec<ItemStack>,
    /// Ids of fused items in the pool.
    pub generated_items: Vec<String>,
}

impl RunSummary {
    pub fn new(seed: u64, snapshot: &GameStateSnapshot) -> Self {
        let game_over = snapshot.phase == GamePhase::GameOver;
        let round = snapshot.round.round_number;
        Self {
            seed,
            rounds_cleared: if game_over {
                round.saturating_sub(1)
            } else {
                round
            },
            game_over,
            elapsed_ms: snapshot.time.now_ms,
            health: snapshot.player.stats.current_health,
            currency: snapshot.player.stats.currency,
            inventory: snapshot.inventory.clone(),
            generated_items: snapshot
                .shop
                .item_pool
                .iter()
                .filter(|item| item.is_generated())
                .map(|item| item.id.clone())
                .collect(),
        }
    }
}
