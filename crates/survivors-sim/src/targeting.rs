//! Nearest-target queries.

use hecs::{Entity, World};

use survivors_core::components::Enemy;
use survivors_core::types::Position;

/// Nearest candidate to `origin` by Euclidean distance. Ties keep the
/// earlier candidate.
pub fn find_nearest<T>(
    origin: &Position,
    candidates: impl IntoIterator<Item = (T, Position)>,
) -> Option<(T, Position)> {
    let mut nearest: Option<(T, Position, f64)> = None;
    for (id, pos) in candidates {
        let distance = origin.distance_to(&pos);
        let closer = match &nearest {
            Some((_, _, best)) => distance < *best,
            None => true,
        };
        if closer {
            nearest = Some((id, pos, distance));
        }
    }
    nearest.map(|(id, pos, _)| (id, pos))
}

/// The nearest living enemy to `origin`.
pub fn nearest_enemy(world: &World, origin: &Position) -> Option<(Entity, Position)> {
    let mut query = world.query::<(&Enemy, &Position)>();
    let living = query
        .iter()
        .filter(|(_, (enemy, _))| enemy.alive)
        .map(|(entity, (_, pos))| (entity, *pos));
    find_nearest(origin, living)
}
