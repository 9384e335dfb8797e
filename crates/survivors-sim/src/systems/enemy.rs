//! Enemy pursuit: every living enemy heads straight for the player.

use hecs::World;

use survivors_core::components::Enemy;
use survivors_core::types::{Position, Velocity};

pub fn run(world: &mut World, player_pos: &Position) {
    for (_entity, (enemy, pos, vel)) in
        world.query_mut::<(&Enemy, &Position, &mut Velocity)>()
    {
        *vel = if enemy.alive {
            Velocity::toward(pos, player_pos, enemy.speed)
        } else {
            Velocity::ZERO
        };
    }
}
