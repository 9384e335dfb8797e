//! Physical separation of overlapping bodies.
//!
//! Enemies push each other apart evenly; an enemy overlapping the player is
//! pushed out entirely, so the player is never shoved. No damage here.

use glam::DVec2;
use hecs::{Entity, World};

use survivors_core::components::{Collider, Enemy};
use survivors_core::types::Position;

/// Unit vector from `b` toward `a`, or +x when the centers coincide.
fn push_direction(a: DVec2, b: DVec2) -> DVec2 {
    let delta = a - b;
    if delta.length_squared() > 0.0 {
        delta.normalize()
    } else {
        DVec2::X
    }
}

pub fn run(world: &mut World, player: Entity) {
    let mut bodies: Vec<(Entity, DVec2, f64)> = world
        .query::<(&Enemy, &Position, &Collider)>()
        .iter()
        .filter(|(_, (enemy, _, _))| enemy.alive)
        .map(|(e, (_, pos, col))| (e, pos.as_dvec2(), col.radius))
        .collect();

    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let (_, a, ra) = bodies[i];
            let (_, b, rb) = bodies[j];
            let overlap = ra + rb - a.distance(b);
            if overlap > 0.0 {
                let push = push_direction(a, b) * (overlap / 2.0);
                bodies[i].1 += push;
                bodies[j].1 -= push;
            }
        }
    }

    let player_body = world
        .get::<&Position>(player)
        .map(|pos| pos.as_dvec2())
        .ok()
        .zip(world.get::<&Collider>(player).map(|col| col.radius).ok());
    if let Some((player_pos, player_radius)) = player_body {
        for body in &mut bodies {
            let overlap = player_radius + body.2 - body.1.distance(player_pos);
            if overlap > 0.0 {
                body.1 += push_direction(body.1, player_pos) * overlap;
            }
        }
    }

    for (entity, pos, _) in bodies {
        if let Ok(mut current) = world.get::<&mut Position>(entity) {
            *current = Position::from(pos);
        }
    }
}
