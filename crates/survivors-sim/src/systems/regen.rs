//! Health regeneration: one point per interval while below max health.

use hecs::{Entity, World};

use survivors_core::components::RegenTimer;
use survivors_core::events::GameEvent;
use survivors_core::stats::Stats;
use survivors_core::types::Position;

/// Heal one point if the regen interval has elapsed. The interval is
/// recomputed from the current stats every tick. A dead player stays dead.
pub fn run(
    world: &mut World,
    player: Entity,
    stats: &mut Stats,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    if stats.health_regen <= 0.0 || stats.is_dead() || stats.current_health >= stats.max_health {
        return;
    }
    let Ok((timer, pos)) = world.query_one_mut::<(&mut RegenTimer, &Position)>(player) else {
        return;
    };
    if now_ms >= timer.last_regen_ms + stats.regen_interval_ms() {
        stats.heal(1.0);
        timer.last_regen_ms = now_ms;
        events.push(GameEvent::Healed { position: *pos });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world_setup;
    use survivors_core::types::ArenaBounds;

    fn setup(health_regen: f64, current_health: f64) -> (World, Entity, Stats) {
        let mut world = World::new();
        let player = world_setup::spawn_player(&mut world, &ArenaBounds::default());
        let stats = Stats {
            health_regen,
            current_health,
            ..Stats::default()
        };
        (world, player, stats)
    }

    #[test]
    fn heals_one_point_per_interval() {
        let (mut world, player, mut stats) = setup(1.0, 50.0);
        let mut events = Vec::new();

        run(&mut world, player, &mut stats, 4999.0, &mut events);
        assert_eq!(stats.current_health, 50.0);
        run(&mut world, player, &mut stats, 5000.0, &mut events);
        assert_eq!(stats.current_health, 51.0);
        assert_eq!(events.len(), 1);
        run(&mut world, player, &mut stats, 9999.0, &mut events);
        assert_eq!(stats.current_health, 51.0);
        run(&mut world, player, &mut stats, 10_000.0, &mut events);
        assert_eq!(stats.current_health, 52.0);
    }

    #[test]
    fn no_regen_without_stat_or_at_full_health() {
        let (mut world, player, mut stats) = setup(0.0, 50.0);
        let mut events = Vec::new();
        run(&mut world, player, &mut stats, 60_000.0, &mut events);
        assert_eq!(stats.current_health, 50.0);

        let (mut world, player, mut stats) = setup(5.0, 100.0);
        run(&mut world, player, &mut stats, 60_000.0, &mut events);
        assert_eq!(stats.current_health, 100.0);
        assert!(events.is_empty());
    }

    #[test]
    fn dead_player_does_not_regenerate() {
        let (mut world, player, mut stats) = setup(10.0, 0.0);
        let mut events = Vec::new();
        run(&mut world, player, &mut stats, 60_000.0, &mut events);
        assert!(stats.is_dead());
    }

    #[test]
    fn higher_regen_heals_faster() {
        let (mut world, player, mut stats) = setup(3.25, 50.0);
        let mut events = Vec::new();
        run(&mut world, player, &mut stats, 2500.0, &mut events);
        assert_eq!(stats.current_health, 51.0);
    }
}
