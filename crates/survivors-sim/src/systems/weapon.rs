//! Auto-fire: the player's weapon shoots at the nearest living enemy
//! whenever its cooldown has run out.

use hecs::{Entity, World};

use survivors_core::components::Weapon;
use survivors_core::stats::Stats;
use survivors_core::types::Position;

use crate::targeting;
use crate::world_setup;

/// Tick the weapon carried by `owner`. Returns whether a projectile was
/// fired.
pub fn run(world: &mut World, owner: Entity, stats: &Stats, delta_ms: f64) -> bool {
    let (origin, base_damage) = {
        let Ok((weapon, pos)) = world.query_one_mut::<(&mut Weapon, &Position)>(owner) else {
            return false;
        };
        if weapon.cooldown_ms > 0.0 {
            weapon.cooldown_ms -= delta_ms;
            return false;
        }
        (*pos, weapon.base_damage)
    };

    // No target: stay ready and retry next tick.
    let Some((_target, target_pos)) = targeting::nearest_enemy(world, &origin) else {
        return false;
    };

    world_setup::spawn_projectile(world, origin, &target_pos, base_damage + stats.damage_bonus);
    if let Ok(mut weapon) = world.get::<&mut Weapon>(owner) {
        weapon.cooldown_ms = stats.attack_cooldown_ms();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use survivors_core::components::Projectile;
    use survivors_core::types::ArenaBounds;

    fn projectiles(world: &World) -> Vec<Projectile> {
        world
            .query::<&Projectile>()
            .iter()
            .map(|(_, p)| p.clone())
            .collect()
    }

    #[test]
    fn no_target_keeps_weapon_ready() {
        let mut world = World::new();
        let player = world_setup::spawn_player(&mut world, &ArenaBounds::default());
        assert!(!run(&mut world, player, &Stats::default(), 16.0));
        assert_eq!(world.get::<&Weapon>(player).unwrap().cooldown_ms, 0.0);
    }

    #[test]
    fn fires_with_bonus_damage_then_cools_down() {
        let mut world = World::new();
        let player = world_setup::spawn_player(&mut world, &ArenaBounds::default());
        world_setup::spawn_enemy_at(&mut world, Position::new(100.0, 100.0));
        let stats = Stats {
            damage_bonus: 5.0,
            attack_speed: 2.0,
            ..Stats::default()
        };

        assert!(run(&mut world, player, &stats, 16.0));
        assert_eq!(projectiles(&world)[0].damage, 15.0);
        assert_eq!(world.get::<&Weapon>(player).unwrap().cooldown_ms, 500.0);

        // Cooling down: the tick only decrements.
        assert!(!run(&mut world, player, &stats, 300.0));
        assert_eq!(world.get::<&Weapon>(player).unwrap().cooldown_ms, 200.0);
        assert!(!run(&mut world, player, &stats, 200.0));
        assert!(run(&mut world, player, &stats, 16.0));
        assert_eq!(projectiles(&world).len(), 2);
    }

    #[test]
    fn zero_attack_speed_fires_once_per_second() {
        let mut world = World::new();
        let player = world_setup::spawn_player(&mut world, &ArenaBounds::default());
        world_setup::spawn_enemy_at(&mut world, Position::new(100.0, 100.0));
        let stats = Stats {
            attack_speed: 0.0,
            ..Stats::default()
        };
        assert!(run(&mut world, player, &stats, 16.0));
        assert_eq!(world.get::<&Weapon>(player).unwrap().cooldown_ms, 1000.0);
    }
}
