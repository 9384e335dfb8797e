//! Session engine: the core of the game.
//!
//! `SessionEngine` owns the hecs ECS world and every piece of session
//! state (player stats, wave scheduler, item registry, shop, run inventory
//! and crafting). It processes player commands, runs all systems and
//! produces `GameStateSnapshot`s. Completely headless, enabling
//! deterministic testing.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use survivors_core::commands::PlayerCommand;
use survivors_core::components::{Invulnerability, MovementIntent, RegenTimer, Weapon};
use survivors_core::constants::{CRAFT_COST, SHOP_REROLL_COST};
use survivors_core::enums::GamePhase;
use survivors_core::error::{GameError, GameResult};
use survivors_core::events::GameEvent;
use survivors_core::items::Item;
use survivors_core::state::{GameStateSnapshot, ShopView};
use survivors_core::stats::Stats;
use survivors_core::types::{ArenaBounds, Position, SimTime, Velocity};

use survivors_items::crafting::{CraftSettlement, CraftStart};
use survivors_items::fusion::FusionWorker;
use survivors_items::inventory::RunInventory;
use survivors_items::shop::Shop;
use survivors_items::{Crafter, ItemRegistry};

use crate::systems;
use crate::systems::snapshot::SessionView;
use crate::systems::wave_scheduler::{RoundInfo, WaveScheduler};
use crate::world_setup;

/// Configuration for starting a new session.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same session.
    pub seed: u64,
    pub arena: ArenaBounds,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            arena: ArenaBounds::default(),
        }
    }
}

/// The session engine. Owns the ECS world and all session state.
pub struct SessionEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    arena: ArenaBounds,
    rng: ChaCha8Rng,
    player: Entity,
    stats: Stats,
    scheduler: WaveScheduler,
    registry: ItemRegistry,
    shop: Shop,
    inventory: RunInventory,
    crafter: Crafter,
    last_craft_stamp: u64,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<GameEvent>,
}

impl SessionEngine {
    /// Session with an in-memory item registry and offline fusion.
    pub fn new(config: SimConfig) -> Self {
        Self::with_services(config, ItemRegistry::in_memory(), FusionWorker::default())
    }

    /// Session with an explicit item registry and fusion worker.
    pub fn with_services(config: SimConfig, registry: ItemRegistry, fusion: FusionWorker) -> Self {
        let mut world = World::new();
        let player = world_setup::spawn_player(&mut world, &config.arena);
        Self {
            world,
            time: SimTime::default(),
            phase: GamePhase::default(),
            arena: config.arena,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            player,
            stats: Stats::default(),
            scheduler: WaveScheduler::new(),
            registry,
            shop: Shop::new(),
            inventory: RunInventory::new(),
            crafter: Crafter::new(fusion),
            last_craft_stamp: 0,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the session by `delta_ms` and return the resulting snapshot.
    ///
    /// Commands are drained first. The clock only runs while the phase is
    /// `Active`; crafting results are collected in every phase.
    pub fn tick(&mut self, delta_ms: f64) -> GameStateSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.time.advance(delta_ms);
            self.run_systems(delta_ms);
        }

        self.poll_crafting();
        self.build_snapshot()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    pub fn shop(&self) -> &Shop {
        &self.shop
    }

    pub fn inventory(&self) -> &RunInventory {
        &self.inventory
    }

    pub fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    pub fn round_info(&self) -> RoundInfo {
        self.scheduler
            .round_info(systems::wave_scheduler::live_enemy_count(&self.world))
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    /// Mutable access for tests that need to stage a situation.
    #[cfg(test)]
    pub(crate) fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    // ---- Run lifecycle ----

    /// Start the first round of a fresh run.
    pub fn start_run(&mut self) -> GameResult<()> {
        if self.phase != GamePhase::Idle {
            return Err(GameError::InvalidPhase(self.phase));
        }
        log::info!("run started");
        self.phase = GamePhase::Active;
        self.start_round();
        Ok(())
    }

    /// Reset the player, arena and run inventory, then start again from
    /// round 1. Allowed in any phase.
    pub fn restart(&mut self) {
        world_setup::clear_arena(&mut self.world, &mut self.despawn_buffer);
        self.stats = Stats::default();
        self.reset_player(true);
        self.inventory.clear();
        self.shop.clear();
        self.crafter.reset();
        self.scheduler = WaveScheduler::new();
        self.phase = GamePhase::Active;
        log::info!("run restarted");
        self.start_round();
    }

    /// Leave the shop: recenter and heal the player, then start the next
    /// round.
    pub fn start_next_round(&mut self) -> GameResult<()> {
        self.require_phase(GamePhase::Shop)?;
        self.stats.heal_to_full();
        self.reset_player(false);
        self.shop.clear();
        self.phase = GamePhase::Active;
        self.start_round();
        Ok(())
    }

    pub fn pause(&mut self) -> GameResult<()> {
        self.require_phase(GamePhase::Active)?;
        self.phase = GamePhase::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> GameResult<()> {
        self.require_phase(GamePhase::Paused)?;
        self.phase = GamePhase::Active;
        Ok(())
    }

    pub fn set_movement(&mut self, x: f64, y: f64) {
        if let Ok(mut intent) = self.world.get::<&mut MovementIntent>(self.player) {
            intent.x = x;
            intent.y = y;
        }
    }

    // ---- Shop ----

    /// Buy one of the current shop offers at its rarity cost.
    pub fn buy_item(&mut self, item_id: &str) -> GameResult<()> {
        self.require_phase(GamePhase::Shop)?;
        let item = self.shop.offer(item_id)?.clone();
        self.purchase(item)
    }

    /// Buy and equip any pool item at its rarity cost.
    pub fn equip_item(&mut self, item_id: &str) -> GameResult<()> {
        self.require_phase(GamePhase::Shop)?;
        let item = self.registry.require(item_id)?.clone();
        self.purchase(item)
    }

    pub fn reroll_shop(&mut self) -> GameResult<()> {
        self.require_phase(GamePhase::Shop)?;
        self.stats.spend(SHOP_REROLL_COST)?;
        self.shop.roll_offers(self.registry.pool(), &mut self.rng);
        log::info!("shop rerolled for {SHOP_REROLL_COST}");
        self.events.push(GameEvent::ShopRerolled {
            cost: SHOP_REROLL_COST,
        });
        Ok(())
    }

    /// Pay for a fusion of two run-inventory items. A cached pair completes
    /// at once; otherwise the result arrives on a later tick.
    pub fn craft(&mut self, first: &str, second: &str) -> GameResult<()> {
        self.require_phase(GamePhase::Shop)?;
        let start = self.crafter.begin(
            &self.registry,
            &self.inventory,
            &mut self.stats,
            first,
            second,
        )?;
        match start {
            CraftStart::Cached(item) => self.events.push(GameEvent::CraftCompleted {
                item_id: item.id,
                from_cache: true,
            }),
            CraftStart::Submitted => self.events.push(GameEvent::CraftStarted {
                first: first.to_string(),
                second: second.to_string(),
            }),
        }
        Ok(())
    }

    /// Remove a generated item from the pool. Items already applied this
    /// run keep their effects.
    pub fn discard_item(&mut self, item_id: &str) -> GameResult<()> {
        self.require_phase(GamePhase::Shop)?;
        let removed = self.registry.discard(item_id)?;
        self.shop.withdraw(&removed.id);
        log::info!("discarded {}", removed.id);
        self.events.push(GameEvent::ItemDiscarded {
            item_id: removed.id,
        });
        Ok(())
    }

    fn purchase(&mut self, item: Item) -> GameResult<()> {
        let cost = item.cost();
        self.stats.spend(cost)?;
        self.stats.apply_effects(&item.effects);
        self.inventory.add(&item);
        log::info!("bought {} for {cost}", item.id);
        self.events.push(GameEvent::ItemPurchased {
            item_id: item.id,
            cost,
        });
        Ok(())
    }

    fn require_phase(&self, phase: GamePhase) -> GameResult<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::InvalidPhase(self.phase))
        }
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(e) = self.handle_command(command) {
                log::warn!("rejected: {e}");
                self.events.push(GameEvent::ActionRejected {
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) -> GameResult<()> {
        match command {
            PlayerCommand::StartRun => self.start_run(),
            PlayerCommand::Restart => {
                self.restart();
                Ok(())
            }
            PlayerCommand::StartNextRound => self.start_next_round(),
            PlayerCommand::Pause => self.pause(),
            PlayerCommand::Resume => self.resume(),
            PlayerCommand::SetMovement { x, y } => {
                self.set_movement(x, y);
                Ok(())
            }
            PlayerCommand::BuyItem { item_id } => self.buy_item(&item_id),
            PlayerCommand::EquipItem { item_id } => self.equip_item(&item_id),
            PlayerCommand::RerollShop => self.reroll_shop(),
            PlayerCommand::CraftItems { first, second } => self.craft(&first, &second),
            PlayerCommand::DiscardItem { item_id } => self.discard_item(&item_id),
        }
    }

    fn start_round(&mut self) {
        let wave = self.scheduler.start_round(self.time.now_ms);
        self.events.push(GameEvent::WaveStarted {
            round: self.scheduler.current_round,
            wave,
        });
    }

    /// Put the player back at the center, at rest and ready to fire. A full
    /// reset also clears the hit and regen timers.
    fn reset_player(&mut self, full: bool) {
        let center = self.arena.center();
        let now = self.time.now_ms;
        if let Ok((pos, vel, weapon, iframes, regen)) = self.world.query_one_mut::<(
            &mut Position,
            &mut Velocity,
            &mut Weapon,
            &mut Invulnerability,
            &mut RegenTimer,
        )>(self.player)
        {
            *pos = center;
            *vel = Velocity::ZERO;
            weapon.cooldown_ms = 0.0;
            if full {
                *iframes = Invulnerability::default();
                regen.last_regen_ms = now;
            }
        }
    }

    fn on_round_complete(&mut self) {
        systems::cleanup::clear_projectiles(&mut self.world, &mut self.despawn_buffer);
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
        self.shop.roll_offers(self.registry.pool(), &mut self.rng);
        self.phase = GamePhase::Shop;
    }

    /// Run all systems in order.
    fn run_systems(&mut self, delta_ms: f64) {
        let now = self.time.now_ms;

        // 1. Health regeneration
        systems::regen::run(
            &mut self.world,
            self.player,
            &mut self.stats,
            now,
            &mut self.events,
        );

        // 2. Game over check
        if self.stats.is_dead() {
            self.phase = GamePhase::GameOver;
            log::info!("game over in round {}", self.scheduler.current_round);
            self.events.push(GameEvent::GameOver {
                round: self.scheduler.current_round,
            });
            return;
        }

        // 3. Round and wave scheduling
        let step = systems::wave_scheduler::run(
            &mut self.world,
            &mut self.rng,
            &mut self.scheduler,
            &self.arena,
            delta_ms,
            now,
            &mut self.events,
        );
        if step.round_complete {
            self.on_round_complete();
            return;
        }

        // 4. Player steering
        systems::movement::steer_player(&mut self.world, self.player, self.stats.speed);
        // 5. Auto-fire
        systems::weapon::run(&mut self.world, self.player, &self.stats, delta_ms);
        // 6. Projectile range
        systems::projectile::run(&mut self.world);
        // 7. Enemy pursuit
        let player_pos = systems::movement::player_position(&self.world, self.player);
        systems::enemy::run(&mut self.world, &player_pos);
        // 8. Currency magnet
        systems::currency::run(&mut self.world, &player_pos, self.stats.pickup_range, now);
        // 9. Integration
        systems::movement::run(&mut self.world, delta_ms / 1000.0, &self.arena);
        // 10. Collision resolution
        systems::collision::run(
            &mut self.world,
            self.player,
            &mut self.stats,
            &mut self.rng,
            now,
            &mut self.events,
        );
        // 11. Physical separation
        systems::separation::run(&mut self.world, self.player);
        // 12. Cleanup
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
    }

    fn poll_crafting(&mut self) {
        let stamp = (self.time.now_ms as u64).max(self.last_craft_stamp + 1);
        let Some(settlement) = self.crafter.poll(&mut self.registry, &mut self.stats, stamp)
        else {
            return;
        };
        match settlement {
            CraftSettlement::Completed(item) => {
                self.last_craft_stamp = stamp;
                self.events.push(GameEvent::CraftCompleted {
                    item_id: item.id,
                    from_cache: false,
                });
            }
            CraftSettlement::Refunded { reason, .. } => {
                self.events.push(GameEvent::CraftFailed { reason });
            }
        }
    }

    fn build_snapshot(&mut self) -> GameStateSnapshot {
        let shop = ShopView {
            offers: if self.phase == GamePhase::Shop {
                self.shop.view(self.stats.currency)
            } else {
                Vec::new()
            },
            item_pool: self.registry.pool().to_vec(),
            reroll_cost: SHOP_REROLL_COST,
            craft_cost: CRAFT_COST,
            craft_pending: self.crafter.is_pending(),
            last_crafted: self.crafter.last_crafted().cloned(),
        };
        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.world,
            SessionView {
                time: self.time,
                phase: self.phase,
                player: self.player,
                stats: &self.stats,
                scheduler: &self.scheduler,
                inventory: self.inventory.stacks(),
                shop,
            },
            events,
        )
    }
}
