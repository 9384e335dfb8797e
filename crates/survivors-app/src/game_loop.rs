//! Game loop thread: runs the session engine at a fixed rate and publishes
//! snapshots.
//!
//! The engine is created inside the thread, so the item store and fusion
//! worker never cross threads. Commands arrive over an `mpsc` channel and
//! the latest snapshot is kept in shared state for polling.

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use survivors_core::state::GameStateSnapshot;
use survivors_items::fusion::{
    CommandClient, FusionService, FusionWorker, LlmFusion, OfflineFusion,
};
use survivors_items::store::JsonDirStore;
use survivors_items::ItemRegistry;
use survivors_sim::SessionEngine;

use crate::config::{AppConfig, FusionBackend};
use crate::state::{GameLoopCommand, GameLoopHandle, SharedSnapshot};

/// Build the engine described by `config`: JSON-directory registry when a
/// store directory is set, the configured fusion backend on a worker
/// thread.
pub fn build_engine(config: &AppConfig) -> SessionEngine {
    let mut registry = match &config.store_dir {
        Some(dir) => ItemRegistry::load(Box::new(JsonDirStore::new(dir))),
        None => ItemRegistry::in_memory(),
    };
    if config.reset_items {
        registry.clear_generated();
        log::info!("generated items cleared");
    }
    let fusion = FusionWorker::spawn(fusion_service(&config.fusion));
    SessionEngine::with_services(config.sim_config(), registry, fusion)
}

fn fusion_service(backend: &FusionBackend) -> Box<dyn FusionService> {
    match backend {
        FusionBackend::Offline => Box::new(OfflineFusion),
        FusionBackend::Command { program, args } => {
            log::info!("fusing items through {program}");
            Box::new(LlmFusion::new(CommandClient::new(
                program.clone(),
                args.clone(),
            )))
        }
    }
}

/// Spawns the game loop in a new thread.
pub fn spawn_game_loop(config: AppConfig) -> io::Result<GameLoopHandle> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();
    let latest_snapshot: SharedSnapshot = Arc::new(Mutex::new(None));
    let shared = latest_snapshot.clone();

    let thread = std::thread::Builder::new()
        .name("survivors-game-loop".into())
        .spawn(move || {
            run_game_loop(&config, cmd_rx, &shared);
        })?;

    Ok(GameLoopHandle {
        command_tx: cmd_tx,
        latest_snapshot,
        thread: Some(thread),
    })
}

/// The game loop. Runs until Shutdown command or channel disconnect.
fn run_game_loop(
    config: &AppConfig,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
) {
    let mut engine = build_engine(config);
    let tick_ms = config.tick_ms();
    let tick_duration = config.tick_duration();
    let mut next_tick_time = Instant::now();
    log::info!(
        "game loop started: seed {}, {} ticks/s at {}x",
        config.seed,
        config.tick_rate,
        config.speed
    );

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::Player(cmd)) => engine.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    log::info!("game loop stopped at {:.0}ms", engine.time().now_ms);
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        // 2. Advance one tick (the engine handles pause semantics)
        let snapshot = engine.tick(tick_ms);

        // 3. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 4. Sleep until next tick
        next_tick_time += tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > tick_duration * 2 {
            // Too far behind, reset to avoid a catch-up spiral
            next_tick_time = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use survivors_core::commands::PlayerCommand;
    use survivors_core::enums::GamePhase;

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<GameLoopCommand>();

        tx.send(GameLoopCommand::Player(PlayerCommand::StartRun))
            .unwrap();
        tx.send(GameLoopCommand::Player(PlayerCommand::Pause))
            .unwrap();
        tx.send(GameLoopCommand::Shutdown).unwrap();

        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }

        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            GameLoopCommand::Player(PlayerCommand::StartRun)
        ));
        assert!(matches!(
            commands[1],
            GameLoopCommand::Player(PlayerCommand::Pause)
        ));
        assert!(matches!(commands[2], GameLoopCommand::Shutdown));
    }

    #[test]
    fn test_snapshot_serialization_is_fast() {
        let config = AppConfig::default();
        let mut engine = build_engine(&config);
        engine.queue_command(PlayerCommand::StartRun);

        // Run enough ticks to populate entities
        for _ in 0..300 {
            engine.tick(config.tick_ms());
        }

        let snapshot = engine.tick(config.tick_ms());
        let start = Instant::now();
        let json = serde_json::to_string(&snapshot).unwrap();
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_millis(10),
            "Snapshot serialization took {:?}, should be <10ms",
            elapsed
        );
        assert!(!json.is_empty());
    }

    #[test]
    fn test_game_loop_publishes_snapshots() {
        let config = AppConfig {
            speed: 20.0,
            ..Default::default()
        };
        let handle = spawn_game_loop(config).unwrap();
        handle.send(PlayerCommand::StartRun).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut active = false;
        while Instant::now() < deadline {
            if let Some(snap) = handle.latest() {
                if snap.phase == GamePhase::Active && snap.time.now_ms > 0.0 {
                    active = true;
                    break;
                }
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        handle.shutdown();
        assert!(active, "game loop never reported an active run");
    }

    #[test]
    fn test_persistent_registry_is_loaded() {
        let dir = std::env::temp_dir().join(format!("survivors_loop_{}", std::process::id()));
        let config = AppConfig {
            store_dir: Some(dir.clone()),
            ..Default::default()
        };
        let engine = build_engine(&config);
        assert_eq!(engine.registry().stats().total_items, 10);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_reset_items_drops_generated_history() {
        let dir = std::env::temp_dir().join(format!("survivors_reset_{}", std::process::id()));
        {
            let mut registry = ItemRegistry::load(Box::new(JsonDirStore::new(&dir)));
            let clover = registry.require("lucky_clover").unwrap().clone();
            let armor = registry.require("alien_armor").unwrap().clone();
            let fused = OfflineFusion.fuse(&clover, &armor).unwrap().into_item(
                "lucky_clover",
                "alien_armor",
                1,
            );
            registry.store_combination("lucky_clover", "alien_armor", fused, 1);
        }

        let keep = AppConfig {
            store_dir: Some(dir.clone()),
            ..Default::default()
        };
        assert_eq!(build_engine(&keep).registry().stats().generated_items, 1);

        let reset = AppConfig {
            reset_items: true,
            ..keep.clone()
        };
        let engine = build_engine(&reset);
        assert_eq!(engine.registry().stats().generated_items, 0);
        assert!(!engine
            .registry()
            .has_combination("lucky_clover", "alien_armor"));
        // The clear is persisted.
        assert_eq!(build_engine(&keep).registry().stats().generated_items, 0);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
