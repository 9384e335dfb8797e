//! Movement: player steering from input, and position integration.

use hecs::{Entity, World};

use survivors_core::components::{Collider, Enemy, MovementIntent, Player};
use survivors_core::types::{ArenaBounds, Position, Velocity};

/// Set the player's velocity from its movement intent. Diagonal input is
/// normalized so every direction moves at `speed`.
pub fn steer_player(world: &mut World, player: Entity, speed: f64) {
    if let Ok((intent, vel)) = world.query_one_mut::<(&MovementIntent, &mut Velocity)>(player) {
        let direction = glam::DVec2::new(intent.x, intent.y).normalize_or_zero();
        *vel = Velocity::from(direction * speed);
    }
}

/// Integrate every moving entity by `dt_secs`, then keep the player and
/// enemies inside the arena.
pub fn run(world: &mut World, dt_secs: f64, arena: &ArenaBounds) {
    for (_entity, (pos, vel)) in world.query_mut::<(&mut Position, &Velocity)>() {
        *pos = pos.advanced(vel, dt_secs);
    }

    for (_entity, (pos, collider, _player)) in
        world.query_mut::<(&mut Position, &Collider, &Player)>()
    {
        *pos = arena.clamp(*pos, collider.radius);
    }
    for (_entity, (pos, collider, _enemy)) in
        world.query_mut::<(&mut Position, &Collider, &Enemy)>()
    {
        *pos = arena.clamp(*pos, collider.radius);
    }
}

/// Current player position, or the origin if the player is missing.
pub fn player_position(world: &World, player: Entity) -> Position {
    world
        .get::<&Position>(player)
        .map(|pos| *pos)
        .unwrap_or_default()
}
