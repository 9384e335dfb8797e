//! Round and wave scheduling.
//!
//! A round lasts a fixed time and consists of back-to-back waves. Each wave
//! trickles its enemy quota in at an even rate, then runs on a 10 s timer.
//! Clearing every enemy early starts a short grace period before the next
//! wave. When the round timer runs out, surviving enemies are removed
//! without drops and the round is reported complete.
//!
//! [`WaveScheduler`] is the pure state machine; [`run`] applies its
//! decisions to the world.

use hecs::World;
use rand_chacha::ChaCha8Rng;

use survivors_core::components::Enemy;
use survivors_core::constants::*;
use survivors_core::enums::WavePhase;
use survivors_core::events::GameEvent;
use survivors_core::types::ArenaBounds;

use crate::world_setup;

/// Difficulty parameters fixed at the start of a round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundDifficulty {
    pub round_duration_ms: f64,
    pub enemies_per_wave: u32,
    pub wave_timer_ms: f64,
    /// Milliseconds between two spawns of the same wave.
    pub spawn_interval_ms: f64,
}

impl RoundDifficulty {
    pub fn for_round(round: u32) -> Self {
        let duration_secs = ROUND_DURATION_TABLE
            .iter()
            .find(|(max_round, _)| round <= *max_round)
            .map_or(ROUND_DURATION_MAX_SECS, |(_, secs)| *secs);
        let spawn_time_ms = WAVE_SPAWN_TIME_TABLE
            .iter()
            .find(|(max_round, _)| round <= *max_round)
            .map_or(WAVE_SPAWN_TIME_MAX_MS, |(_, ms)| *ms);
        let enemies_per_wave =
            BASE_ENEMIES_PER_WAVE + round.saturating_sub(1) * ENEMIES_PER_WAVE_GROWTH;

        Self {
            round_duration_ms: duration_secs * 1000.0,
            enemies_per_wave,
            wave_timer_ms: WAVE_TIMER_MS,
            spawn_interval_ms: spawn_time_ms / enemies_per_wave as f64,
        }
    }
}

impl Default for RoundDifficulty {
    fn default() -> Self {
        Self::for_round(1)
    }
}

/// Round HUD summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundInfo {
    pub round_number: u32,
    /// Whole seconds left, rounded up, never negative.
    pub time_remaining_secs: u32,
    pub enemy_count: u32,
    pub is_active: bool,
}

/// What one scheduler update asks the world to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStep {
    /// Number of enemies to spawn this tick (0 or 1).
    pub spawns: u32,
    /// Set when a new wave began; carries the wave number.
    pub wave_started: Option<u32>,
    pub grace_started: bool,
    /// Set when the round timer ran out this tick.
    pub round_complete: bool,
}

#[derive(Debug, Clone, Default)]
pub struct WaveScheduler {
    pub current_round: u32,
    pub current_wave: u32,
    pub round_time_remaining_ms: f64,
    pub wave_time_remaining_ms: f64,
    pub grace_remaining_ms: f64,
    pub round_active: bool,
    pub spawning: bool,
    pub enemies_spawned: u32,
    pub enemies_to_spawn: u32,
    pub next_spawn_ms: f64,
    pub difficulty: RoundDifficulty,
}

impl WaveScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin the next round and its first wave. Returns the wave number.
    pub fn start_round(&mut self, now_ms: f64) -> u32 {
        self.current_round += 1;
        self.current_wave = 0;
        self.difficulty = RoundDifficulty::for_round(self.current_round);
        self.round_time_remaining_ms = self.difficulty.round_duration_ms;
        self.round_active = true;
        log::info!(
            "round {} started: {:.0}s, {} enemies per wave, one every {:.0}ms",
            self.current_round,
            self.difficulty.round_duration_ms / 1000.0,
            self.difficulty.enemies_per_wave,
            self.difficulty.spawn_interval_ms
        );
        self.start_next_wave(now_ms)
    }

    /// Begin the next wave of the current round. Returns the wave number.
    pub fn start_next_wave(&mut self, now_ms: f64) -> u32 {
        self.current_wave += 1;
        self.wave_time_remaining_ms = self.difficulty.wave_timer_ms;
        self.spawning = true;
        self.enemies_spawned = 0;
        self.enemies_to_spawn = self.difficulty.enemies_per_wave;
        self.next_spawn_ms = now_ms;
        self.grace_remaining_ms = 0.0;
        log::info!("round {} wave {}", self.current_round, self.current_wave);
        self.current_wave
    }

    fn end_round(&mut self) {
        self.round_active = false;
        self.spawning = false;
        self.grace_remaining_ms = 0.0;
        self.round_time_remaining_ms = self.round_time_remaining_ms.max(0.0);
        log::info!("round {} complete", self.current_round);
    }

    pub fn is_in_grace_period(&self) -> bool {
        self.grace_remaining_ms > 0.0
    }

    /// Advance the schedule by `delta_ms`. `live_enemies` is the number of
    /// enemies alive before this update.
    pub fn update(&mut self, delta_ms: f64, now_ms: f64, live_enemies: u32) -> SchedulerStep {
        let mut step = SchedulerStep::default();
        if !self.round_active {
            return step;
        }

        self.round_time_remaining_ms -= delta_ms;
        if self.round_time_remaining_ms <= 0.0 {
            self.end_round();
            step.round_complete = true;
            return step;
        }

        if self.is_in_grace_period() {
            self.grace_remaining_ms -= delta_ms;
            if self.grace_remaining_ms <= 0.0 {
                step.wave_started = Some(self.start_next_wave(now_ms));
            }
            return step;
        }

        self.wave_time_remaining_ms -= delta_ms;
        if self.wave_time_remaining_ms <= 0.0 {
            step.wave_started = Some(self.start_next_wave(now_ms));
            return step;
        }

        if self.spawning && now_ms >= self.next_spawn_ms {
            step.spawns = 1;
            self.enemies_spawned += 1;
            self.next_spawn_ms = now_ms + self.difficulty.spawn_interval_ms;
            if self.enemies_spawned >= self.enemies_to_spawn {
                self.spawning = false;
            }
        }

        if !self.spawning && live_enemies + step.spawns == 0 {
            self.grace_remaining_ms = GRACE_PERIOD_MS;
            step.grace_started = true;
            log::debug!("wave {} cleared, grace period", self.current_wave);
        }

        step
    }

    pub fn wave_phase(&self) -> WavePhase {
        if !self.round_active {
            if self.current_round == 0 {
                WavePhase::Idle
            } else {
                WavePhase::RoundEnded
            }
        } else if self.is_in_grace_period() {
            WavePhase::Grace
        } else if self.spawning {
            WavePhase::Spawning
        } else {
            WavePhase::WaveTimerRunning
        }
    }

    pub fn round_info(&self, enemy_count: u32) -> RoundInfo {
        RoundInfo {
            round_number: self.current_round,
            time_remaining_secs: (self.round_time_remaining_ms.max(0.0) / 1000.0).ceil() as u32,
            enemy_count,
            is_active: self.round_active,
        }
    }
}

pub fn live_enemy_count(world: &World) -> u32 {
    world
        .query::<&Enemy>()
        .iter()
        .filter(|(_, enemy)| enemy.alive)
        .count() as u32
}

/// Advance the scheduler and apply the result to the world: spawn enemies,
/// and on round end strip the survivors without drops.
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    scheduler: &mut WaveScheduler,
    arena: &ArenaBounds,
    delta_ms: f64,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) -> SchedulerStep {
    let live = live_enemy_count(world);
    let step = scheduler.update(delta_ms, now_ms, live);

    for _ in 0..step.spawns {
        let position = world_setup::spawn_enemy(world, rng, arena);
        log::debug!("enemy spawned at ({:.0}, {:.0})", position.x, position.y);
        events.push(GameEvent::EnemySpawned { position });
    }

    if let Some(wave) = step.wave_started {
        events.push(GameEvent::WaveStarted {
            round: scheduler.current_round,
            wave,
        });
    }

    if step.round_complete {
        for (_entity, enemy) in world.query_mut::<&mut Enemy>() {
            enemy.alive = false;
        }
        events.push(GameEvent::RoundComplete {
            round: scheduler.current_round,
        });
    }

    step
}
