//! Entity spawn factories.
//!
//! Creates the player, enemies, projectiles and currency drops with their
//! component bundles.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use survivors_core::components::*;
use survivors_core::constants::*;
use survivors_core::types::{ArenaBounds, Position, Velocity};

/// Spawn the player at the arena center with an idle weapon.
pub fn spawn_player(world: &mut World, arena: &ArenaBounds) -> Entity {
    world.spawn((
        Player,
        arena.center(),
        Velocity::ZERO,
        Collider {
            radius: PLAYER_RADIUS,
        },
        Weapon {
            base_damage: WEAPON_BASE_DAMAGE,
            cooldown_ms: 0.0,
        },
        Invulnerability::default(),
        RegenTimer::default(),
        MovementIntent::default(),
    ))
}

/// Uniform random point at least [`SPAWN_MARGIN`] from every edge.
pub fn random_arena_position(rng: &mut ChaCha8Rng, arena: &ArenaBounds) -> Position {
    let max_x = (arena.width - SPAWN_MARGIN).max(SPAWN_MARGIN);
    let max_y = (arena.height - SPAWN_MARGIN).max(SPAWN_MARGIN);
    Position::new(
        rng.gen_range(SPAWN_MARGIN..=max_x),
        rng.gen_range(SPAWN_MARGIN..=max_y),
    )
}

/// Spawn a fresh enemy at a random arena position.
pub fn spawn_enemy(world: &mut World, rng: &mut ChaCha8Rng, arena: &ArenaBounds) -> Position {
    let position = random_arena_position(rng, arena);
    spawn_enemy_at(world, position);
    position
}

pub fn spawn_enemy_at(world: &mut World, position: Position) -> Entity {
    world.spawn((
        Enemy {
            max_health: ENEMY_MAX_HEALTH,
            current_health: ENEMY_MAX_HEALTH,
            speed: ENEMY_SPEED,
            contact_damage: ENEMY_CONTACT_DAMAGE,
            alive: true,
        },
        position,
        Velocity::ZERO,
        Collider {
            radius: ENEMY_RADIUS,
        },
    ))
}

/// Spawn a projectile at `origin` flying toward `target`. The heading is
/// fixed at creation.
pub fn spawn_projectile(
    world: &mut World,
    origin: Position,
    target: &Position,
    damage: f64,
) -> Entity {
    world.spawn((
        Projectile {
            damage,
            origin,
            max_range: PROJECTILE_MAX_RANGE,
            active: true,
        },
        origin,
        Velocity::toward(&origin, target, PROJECTILE_SPEED),
        Collider {
            radius: PROJECTILE_RADIUS,
        },
    ))
}

/// Spawn a currency drop with a random bob phase.
pub fn spawn_currency(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    position: Position,
    value: u32,
) -> Entity {
    world.spawn((
        CurrencyDrop {
            value,
            active: true,
            bob_phase: rng.gen_range(0.0..std::f64::consts::TAU),
            rest_y: position.y,
        },
        position,
        Velocity::ZERO,
        Collider {
            radius: CURRENCY_RADIUS,
        },
    ))
}

/// Despawn every enemy, projectile and currency drop.
pub fn clear_arena(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();
    despawn_buffer.extend(world.query_mut::<&Enemy>().into_iter().map(|(e, _)| e));
    despawn_buffer.extend(world.query_mut::<&Projectile>().into_iter().map(|(e, _)| e));
    despawn_buffer.extend(world.query_mut::<&CurrencyDrop>().into_iter().map(|(e, _)| e));
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
