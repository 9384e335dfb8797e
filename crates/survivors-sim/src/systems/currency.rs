//! Currency drops: magnet pull inside pickup range, idle bob outside it.

use hecs::World;

use survivors_core::components::CurrencyDrop;
use survivors_core::constants::{CURRENCY_BOB_AMOUNT, CURRENCY_BOB_SPEED, CURRENCY_MAGNET_SPEED};
use survivors_core::types::{Position, Velocity};

pub fn run(world: &mut World, player_pos: &Position, pickup_range: f64, now_ms: f64) {
    for (_entity, (drop, pos, vel)) in
        world.query_mut::<(&CurrencyDrop, &mut Position, &mut Velocity)>()
    {
        if !drop.active {
            continue;
        }
        if is_magnetized(pos, player_pos, pickup_range) {
            *vel = Velocity::toward(pos, player_pos, CURRENCY_MAGNET_SPEED);
        } else {
            *vel = Velocity::ZERO;
            pos.y = drop.rest_y
                + (now_ms / 1000.0 * CURRENCY_BOB_SPEED + drop.bob_phase).sin()
                    * CURRENCY_BOB_AMOUNT;
        }
    }
}

/// Whether a drop at `pos` is being pulled toward the player.
pub fn is_magnetized(pos: &Position, player_pos: &Position, pickup_range: f64) -> bool {
    pos.distance_to(player_pos) <= pickup_range
}
