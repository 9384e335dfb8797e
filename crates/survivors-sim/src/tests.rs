//! Tests for the session engine: round flow, shop economy, crafting and
//! run lifecycle.

use survivors_core::commands::PlayerCommand;
use survivors_core::components::Enemy;
use survivors_core::enums::{GamePhase, Rarity, WavePhase};
use survivors_core::error::GameError;
use survivors_core::events::GameEvent;
use survivors_core::items::Item;
use survivors_core::state::GameStateSnapshot;
use survivors_core::types::{ArenaBounds, Position};

use survivors_items::fusion::{FusionError, FusionService, FusionWorker, ItemDescriptor};
use survivors_items::ItemRegistry;

use crate::engine::{SessionEngine, SimConfig};
use crate::systems::movement;

fn engine() -> SessionEngine {
    SessionEngine::new(SimConfig::default())
}

fn started() -> SessionEngine {
    let mut engine = engine();
    engine.queue_command(PlayerCommand::StartRun);
    engine
}

/// An engine sitting in the shop after round 1, with `currency` to spend.
fn in_shop(currency: u32) -> SessionEngine {
    let mut engine = started();
    let snap = engine.tick(30_000.0);
    assert_eq!(snap.phase, GamePhase::Shop);
    engine.stats_mut().currency = currency;
    engine
}

fn rejected(snap: &GameStateSnapshot) -> Vec<String> {
    snap.events
        .iter()
        .filter_map(|e| match e {
            GameEvent::ActionRejected { reason } => Some(reason.clone()),
            _ => None,
        })
        .collect()
}

struct FailingFusion;

impl FusionService for FailingFusion {
    fn fuse(&self, _first: &Item, _second: &Item) -> Result<ItemDescriptor, FusionError> {
        Err(FusionError::MissingField("rarity"))
    }
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = SessionEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });
    let mut engine_b = SessionEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });
    engine_a.queue_command(PlayerCommand::StartRun);
    engine_b.queue_command(PlayerCommand::StartRun);

    for _ in 0..600 {
        let json_a = serde_json::to_string(&engine_a.tick(1000.0 / 60.0)).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick(1000.0 / 60.0)).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = SessionEngine::new(SimConfig {
        seed: 111,
        ..Default::default()
    });
    let mut engine_b = SessionEngine::new(SimConfig {
        seed: 222,
        ..Default::default()
    });
    engine_a.queue_command(PlayerCommand::StartRun);
    engine_b.queue_command(PlayerCommand::StartRun);

    let mut diverged = false;
    for _ in 0..60 {
        let json_a = serde_json::to_string(&engine_a.tick(100.0)).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick(100.0)).unwrap();
        if json_a != json_b {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "Different seeds should produce divergent output");
}

// ---- Phases ----

#[test]
fn test_idle_until_started() {
    let mut engine = engine();
    let snap = engine.tick(100.0);
    assert_eq!(snap.phase, GamePhase::Idle);
    assert_eq!(snap.time.now_ms, 0.0);
    assert_eq!(snap.round.wave_phase, WavePhase::Idle);
}

#[test]
fn test_start_run_begins_round_one() {
    let mut engine = started();
    let snap = engine.tick(100.0);
    assert_eq!(snap.phase, GamePhase::Active);
    assert_eq!(snap.round.round_number, 1);
    assert_eq!(snap.round.wave_number, 1);
    assert!(snap.round.is_active);
    assert!(snap
        .events
        .contains(&GameEvent::WaveStarted { round: 1, wave: 1 }));
}

#[test]
fn test_pause_freezes_clock() {
    let mut engine = started();
    engine.tick(100.0);
    engine.queue_command(PlayerCommand::Pause);
    let paused = engine.tick(100.0);
    assert_eq!(paused.phase, GamePhase::Paused);
    assert_eq!(paused.time.now_ms, 100.0);
    assert_eq!(engine.tick(5000.0).time.now_ms, 100.0);

    engine.queue_command(PlayerCommand::Resume);
    let resumed = engine.tick(100.0);
    assert_eq!(resumed.phase, GamePhase::Active);
    assert_eq!(resumed.time.now_ms, 200.0);
}

#[test]
fn test_resume_when_not_paused_is_rejected() {
    let mut engine = started();
    engine.queue_command(PlayerCommand::Resume);
    let snap = engine.tick(100.0);
    assert_eq!(snap.phase, GamePhase::Active);
    assert_eq!(rejected(&snap).len(), 1);
}

// ---- Waves ----

#[test]
fn test_round_one_spawns_five_enemies_in_two_seconds() {
    let mut engine = started();
    let mut spawned = 0;
    let mut last = GameStateSnapshot::default();
    for _ in 0..20 {
        last = engine.tick(100.0);
        spawned += last
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemySpawned { .. }))
            .count();
    }
    assert_eq!(last.time.now_ms, 2000.0);
    assert_eq!(spawned, 5);
    assert_eq!(last.round.enemy_count, 5);
    assert_eq!(last.round.wave_phase, WavePhase::WaveTimerRunning);
}

#[test]
fn test_cleared_wave_grace_then_wave_two() {
    let mut engine = started();
    for _ in 0..20 {
        engine.tick(100.0);
    }
    for (_entity, enemy) in engine.world_mut().query_mut::<&mut Enemy>() {
        enemy.alive = false;
    }

    let snap = engine.tick(100.0);
    assert_eq!(snap.round.wave_phase, WavePhase::Grace);
    assert_eq!(snap.round.grace_remaining_ms, 2000.0);

    let mut ticks = 0;
    let wave_two = loop {
        ticks += 1;
        let snap = engine.tick(100.0);
        if snap
            .events
            .contains(&GameEvent::WaveStarted { round: 1, wave: 2 })
        {
            break snap;
        }
        assert!(ticks < 30, "wave 2 never started");
    };
    assert_eq!(ticks, 20);
    assert_eq!(wave_two.round.wave_number, 2);
    assert_eq!(wave_two.round.wave_time_remaining_ms, 10_000.0);
    assert_eq!(wave_two.round.wave_phase, WavePhase::Spawning);
}

#[test]
fn test_round_end_opens_shop() {
    let mut engine = started();
    for _ in 0..50 {
        engine.tick(100.0);
    }
    let snap = engine.tick(30_000.0);
    assert_eq!(snap.phase, GamePhase::Shop);
    assert!(snap.events.contains(&GameEvent::RoundComplete { round: 1 }));
    assert!(!snap.round.is_active);
    assert_eq!(snap.round.time_remaining_secs, 0);
    assert_eq!(snap.round.wave_phase, WavePhase::RoundEnded);
    assert!(snap.enemies.is_empty());
    assert!(snap.projectiles.is_empty());
    assert_eq!(snap.shop.offers.len(), 4);
    // Stripped enemies leave no currency behind.
    assert!(!snap
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::EnemyDied { .. })));
}

#[test]
fn test_start_next_round_heals_and_recenters() {
    let mut engine = in_shop(0);
    engine.stats_mut().current_health = 40.0;
    let player = engine.player();
    if let Ok(mut pos) = engine.world_mut().get::<&mut Position>(player) {
        pos.x = 20.0;
    }

    engine.queue_command(PlayerCommand::StartNextRound);
    let snap = engine.tick(100.0);
    assert_eq!(snap.phase, GamePhase::Active);
    assert_eq!(snap.round.round_number, 2);
    assert_eq!(snap.player.stats.current_health, 100.0);
    assert_eq!(snap.player.position, ArenaBounds::default().center());
    assert!(snap.shop.offers.is_empty());
}

// ---- Shop ----

#[test]
fn test_buy_offer_applies_effects_and_stacks() {
    let mut engine = in_shop(1000);
    let offer = engine.shop().offers()[0].clone();
    engine.queue_command(PlayerCommand::BuyItem {
        item_id: offer.id.clone(),
    });
    engine.queue_command(PlayerCommand::BuyItem {
        item_id: offer.id.clone(),
    });
    let snap = engine.tick(16.0);

    assert!(rejected(&snap).is_empty());
    assert_eq!(snap.player.stats.currency, 1000 - 2 * offer.cost());
    assert_eq!(snap.inventory.len(), 1);
    assert_eq!(snap.inventory[0].count, 2);
    assert_eq!(snap.player.stats.luck, 2.0 * offer.effects.luck);
    assert!(snap.player.stats.current_health <= snap.player.stats.max_health);
}

#[test]
fn test_buy_without_currency_changes_nothing() {
    let mut engine = in_shop(10);
    let before = engine.stats().clone();
    let offer = engine.shop().offers()[0].id.clone();
    engine.queue_command(PlayerCommand::BuyItem { item_id: offer });
    let snap = engine.tick(16.0);

    assert_eq!(rejected(&snap).len(), 1);
    assert_eq!(engine.stats(), &before);
    assert!(engine.inventory().is_empty());
}

#[test]
fn test_buy_unoffered_item_rejected() {
    let mut engine = in_shop(1000);
    let missing = engine
        .registry()
        .pool()
        .iter()
        .find(|item| engine.shop().offer(&item.id).is_err())
        .map(|item| item.id.clone())
        .unwrap();
    assert_eq!(
        engine.buy_item(&missing),
        Err(GameError::ItemNotOffered(missing.clone()))
    );
    assert_eq!(engine.stats().currency, 1000);
}

#[test]
fn test_shop_actions_rejected_during_combat() {
    let mut engine = started();
    engine.tick(100.0);
    assert_eq!(
        engine.reroll_shop(),
        Err(GameError::InvalidPhase(GamePhase::Active))
    );
    assert_eq!(
        engine.equip_item("lucky_clover"),
        Err(GameError::InvalidPhase(GamePhase::Active))
    );
}

#[test]
fn test_reroll_costs_ten() {
    let mut engine = in_shop(15);
    engine.queue_command(PlayerCommand::RerollShop);
    let snap = engine.tick(16.0);
    assert_eq!(snap.player.stats.currency, 5);
    assert!(snap.events.contains(&GameEvent::ShopRerolled { cost: 10 }));
    assert_eq!(snap.shop.offers.len(), 4);

    engine.queue_command(PlayerCommand::RerollShop);
    let snap = engine.tick(16.0);
    assert_eq!(snap.player.stats.currency, 5);
    assert_eq!(rejected(&snap).len(), 1);
}

// ---- Crafting ----

fn equip_pair(engine: &mut SessionEngine) {
    engine.equip_item("lucky_clover").unwrap();
    engine.equip_item("alien_armor").unwrap();
}

#[test]
fn test_craft_completes_and_can_be_equipped() {
    let mut engine = in_shop(1000);
    equip_pair(&mut engine);
    assert_eq!(engine.stats().currency, 900);

    engine.queue_command(PlayerCommand::CraftItems {
        first: "lucky_clover".to_string(),
        second: "alien_armor".to_string(),
    });
    let snap = engine.tick(16.0);
    assert_eq!(snap.player.stats.currency, 850);

    let crafted = snap.shop.last_crafted.clone().unwrap();
    assert_eq!(crafted.id, "generated_lucky_clover_alien_armor_30000");
    assert_eq!(crafted.rarity, Rarity::Uncommon);
    assert!(snap.events.contains(&GameEvent::CraftCompleted {
        item_id: crafted.id.clone(),
        from_cache: false
    }));
    assert!(snap.shop.item_pool.iter().any(|item| item.id == crafted.id));
    assert!(!snap.shop.craft_pending);

    engine.equip_item(&crafted.id).unwrap();
    assert_eq!(engine.stats().currency, 750);
    assert_eq!(engine.stats().luck, 30.0);
    assert_eq!(engine.stats().armor, 10.0);
    assert_eq!(engine.stats().max_health, 120.0);
}

#[test]
fn test_cached_craft_still_costs() {
    let mut engine = in_shop(1000);
    equip_pair(&mut engine);
    engine.craft("lucky_clover", "alien_armor").unwrap();
    engine.tick(16.0);

    engine.queue_command(PlayerCommand::CraftItems {
        first: "alien_armor".to_string(),
        second: "lucky_clover".to_string(),
    });
    let snap = engine.tick(16.0);
    assert_eq!(snap.player.stats.currency, 800);
    assert!(snap.events.iter().any(|e| matches!(
        e,
        GameEvent::CraftCompleted {
            from_cache: true,
            ..
        }
    )));
    assert_eq!(engine.registry().stats().generated_items, 1);
}

#[test]
fn test_failed_craft_refunds() {
    let mut engine = SessionEngine::with_services(
        SimConfig::default(),
        ItemRegistry::in_memory(),
        FusionWorker::inline(Box::new(FailingFusion)),
    );
    engine.queue_command(PlayerCommand::StartRun);
    engine.tick(30_000.0);
    engine.stats_mut().currency = 1000;
    equip_pair(&mut engine);

    engine.queue_command(PlayerCommand::CraftItems {
        first: "lucky_clover".to_string(),
        second: "alien_armor".to_string(),
    });
    let snap = engine.tick(16.0);
    assert_eq!(snap.player.stats.currency, 900);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::CraftFailed { .. })));
    assert_eq!(engine.registry().stats().generated_items, 0);
    assert!(snap.shop.last_crafted.is_none());
}

#[test]
fn test_craft_requires_run_inventory() {
    let mut engine = in_shop(1000);
    assert_eq!(
        engine.craft("lucky_clover", "alien_armor"),
        Err(GameError::NotInInventory("lucky_clover".to_string()))
    );
    assert_eq!(engine.stats().currency, 1000);
}

#[test]
fn test_discard_removes_generated_item_only() {
    let mut engine = in_shop(1000);
    equip_pair(&mut engine);
    engine.craft("lucky_clover", "alien_armor").unwrap();
    let snap = engine.tick(16.0);
    let crafted = snap.shop.last_crafted.unwrap();
    engine.equip_item(&crafted.id).unwrap();
    let luck = engine.stats().luck;

    engine.queue_command(PlayerCommand::DiscardItem {
        item_id: crafted.id.clone(),
    });
    let snap = engine.tick(16.0);
    assert!(snap.events.contains(&GameEvent::ItemDiscarded {
        item_id: crafted.id.clone()
    }));
    assert!(snap.shop.item_pool.iter().all(|item| item.id != crafted.id));
    // Already-applied effects stay.
    assert_eq!(snap.player.stats.luck, luck);

    assert_eq!(
        engine.discard_item("lucky_clover"),
        Err(GameError::UnknownItem("lucky_clover".to_string()))
    );
}

// ---- Game over and restart ----

#[test]
fn test_game_over_freezes_simulation() {
    let mut engine = started();
    engine.tick(100.0);
    engine.stats_mut().current_health = 0.0;

    let snap = engine.tick(100.0);
    assert_eq!(snap.phase, GamePhase::GameOver);
    assert!(snap.events.contains(&GameEvent::GameOver { round: 1 }));

    let frozen = engine.tick(100.0);
    assert_eq!(frozen.time, snap.time);
    assert_eq!(frozen.phase, GamePhase::GameOver);
}

#[test]
fn test_restart_resets_run() {
    let mut engine = in_shop(1000);
    equip_pair(&mut engine);
    engine.queue_command(PlayerCommand::StartNextRound);
    for _ in 0..30 {
        engine.tick(100.0);
    }

    engine.queue_command(PlayerCommand::Restart);
    let snap = engine.tick(16.0);
    assert_eq!(snap.phase, GamePhase::Active);
    assert_eq!(snap.round.round_number, 1);
    assert_eq!(snap.round.wave_number, 1);
    assert!(snap.inventory.is_empty());
    assert_eq!(snap.player.stats.currency, 0);
    assert_eq!(snap.player.stats.current_health, 100.0);
    assert_eq!(snap.player.stats.luck, 0.0);
    assert!(snap.enemies.len() <= 1);
    assert!(snap.currency_drops.is_empty());
    // The registry outlives the run.
    assert_eq!(engine.registry().stats().total_items, 10);
}

// ---- Movement ----

#[test]
fn test_movement_intent_moves_player() {
    let mut engine = started();
    engine.queue_command(PlayerCommand::SetMovement { x: 1.0, y: 0.0 });
    engine.tick(500.0);
    let pos = movement::player_position(engine.world(), engine.player());
    let center = ArenaBounds::default().center();
    assert!((pos.x - (center.x + 100.0)).abs() < 1e-9);
    assert_eq!(pos.y, center.y);
}

#[test]
fn test_idle_player_eventually_dies_then_restarts() {
    let mut engine = started();
    let mut died = false;
    for _ in 0..40_000 {
        let snap = engine.tick(50.0);
        match snap.phase {
            GamePhase::Shop => engine.queue_command(PlayerCommand::StartNextRound),
            GamePhase::GameOver => {
                died = true;
                break;
            }
            _ => {}
        }
        assert!(snap.player.stats.current_health >= 0.0);
    }
    assert!(died, "a player who never moves should be overrun");

    engine.queue_command(PlayerCommand::Restart);
    let snap = engine.tick(50.0);
    assert_eq!(snap.phase, GamePhase::Active);
    assert_eq!(snap.round.round_number, 1);
    assert_eq!(snap.player.stats.current_health, 100.0);
}
