//! Projectile lifetime: deactivate projectiles that flew past their range.

use hecs::World;

use survivors_core::components::Projectile;
use survivors_core::types::Position;

pub fn run(world: &mut World) {
    for (_entity, (projectile, pos)) in world.query_mut::<(&mut Projectile, &Position)>() {
        if projectile.active && projectile.origin.distance_to(pos) > projectile.max_range {
            projectile.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world_setup;

    #[test]
    fn out_of_range_projectile_deactivates() {
        let mut world = World::new();
        let near = world_setup::spawn_projectile(
            &mut world,
            Position::new(0.0, 0.0),
            &Position::new(1.0, 0.0),
            10.0,
        );
        let far = world_setup::spawn_projectile(
            &mut world,
            Position::new(0.0, 0.0),
            &Position::new(1.0, 0.0),
            10.0,
        );
        if let Ok(mut pos) = world.get::<&mut Position>(far) {
            pos.x = 801.0;
        }
        if let Ok(mut pos) = world.get::<&mut Position>(near) {
            pos.x = 800.0;
        }

        run(&mut world);
        assert!(world.get::<&Projectile>(near).unwrap().active);
        assert!(!world.get::<&Projectile>(far).unwrap().active);
    }
}
