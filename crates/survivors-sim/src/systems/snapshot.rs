//! Snapshot system: queries the ECS world and builds a complete
//! `GameStateSnapshot`.
//!
//! This system is read-only; it never modifies the world.

use hecs::{Entity, World};

use survivors_core::components::*;
use survivors_core::enums::GamePhase;
use survivors_core::events::GameEvent;
use survivors_core::items::ItemStack;
use survivors_core::state::*;
use survivors_core::stats::Stats;
use survivors_core::types::{Position, SimTime};

use super::currency;
use super::wave_scheduler::WaveScheduler;

/// Session state that lives outside the world.
pub struct SessionView<'a> {
    pub time: SimTime,
    pub phase: GamePhase,
    pub player: Entity,
    pub stats: &'a Stats,
    pub scheduler: &'a WaveScheduler,
    pub inventory: &'a [ItemStack],
    pub shop: ShopView,
}

pub fn build_snapshot(
    world: &World,
    session: SessionView<'_>,
    events: Vec<GameEvent>,
) -> GameStateSnapshot {
    let player = build_player(world, session.player, session.stats, session.time.now_ms);
    let enemies = build_enemies(world);
    let info = session.scheduler.round_info(enemies.len() as u32);

    GameStateSnapshot {
        time: session.time,
        phase: session.phase,
        round: RoundView {
            round_number: info.round_number,
            wave_number: session.scheduler.current_wave,
            wave_phase: session.scheduler.wave_phase(),
            time_remaining_secs: info.time_remaining_secs,
            wave_time_remaining_ms: session.scheduler.wave_time_remaining_ms.max(0.0),
            grace_remaining_ms: session.scheduler.grace_remaining_ms.max(0.0),
            enemy_count: info.enemy_count,
            is_active: info.is_active,
        },
        currency_drops: build_currency(world, &player.position, session.stats.pickup_range),
        projectiles: build_projectiles(world),
        enemies,
        player,
        inventory: session.inventory.to_vec(),
        shop: session.shop,
        events,
    }
}

fn build_player(world: &World, player: Entity, stats: &Stats, now_ms: f64) -> PlayerView {
    let position = world
        .get::<&Position>(player)
        .map(|pos| *pos)
        .unwrap_or_default();
    let invulnerable = world
        .get::<&Invulnerability>(player)
        .map(|i| now_ms < i.last_hit_ms + i.duration_ms)
        .unwrap_or(false);
    PlayerView {
        position,
        stats: stats.clone(),
        invulnerable,
    }
}

fn build_enemies(world: &World) -> Vec<EnemyView> {
    world
        .query::<(&Enemy, &Position)>()
        .iter()
        .filter(|(_, (enemy, _))| enemy.alive)
        .map(|(_, (enemy, pos))| EnemyView {
            position: *pos,
            current_health: enemy.current_health,
            max_health: enemy.max_health,
        })
        .collect()
}

fn build_projectiles(world: &World) -> Vec<Position> {
    world
        .query::<(&Projectile, &Position)>()
        .iter()
        .filter(|(_, (projectile, _))| projectile.active)
        .map(|(_, (_, pos))| *pos)
        .collect()
}

fn build_currency(world: &World, player_pos: &Position, pickup_range: f64) -> Vec<CurrencyView> {
    world
        .query::<(&CurrencyDrop, &Position)>()
        .iter()
        .filter(|(_, (drop, _))| drop.active)
        .map(|(_, (drop, pos))| CurrencyView {
            position: *pos,
            value: drop.value,
            magnetized: currency::is_magnetized(pos, player_pos, pickup_range),
        })
        .collect()
}
