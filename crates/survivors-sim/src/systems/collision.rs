//! Collision detection and combat resolution.
//!
//! [`detect`] is the broad phase: it returns every overlapping pair of
//! interest for this tick, using circle colliders. [`resolve`] applies the
//! consequences pair by pair, re-checking that both sides are still active
//! so a pair touched by an earlier resolution is a no-op.

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use survivors_core::components::*;
use survivors_core::constants::{DODGE_IFRAME_MS, ENEMY_CURRENCY_DROP};
use survivors_core::events::GameEvent;
use survivors_core::stats::Stats;
use survivors_core::types::Position;

use crate::combat;
use crate::world_setup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    ProjectileEnemy { projectile: Entity, enemy: Entity },
    PlayerEnemy { enemy: Entity },
    PlayerCurrency { drop: Entity },
}

fn overlaps(a: &Position, ra: f64, b: &Position, rb: f64) -> bool {
    a.distance_to(b) < ra + rb
}

/// Broad phase. Pairs are ordered projectile hits first, then enemy
/// contacts, then pickups.
pub fn detect(world: &World, player: Entity) -> Vec<Contact> {
    let mut contacts = Vec::new();

    let enemies: Vec<(Entity, Position, f64)> = world
        .query::<(&Enemy, &Position, &Collider)>()
        .iter()
        .filter(|(_, (enemy, _, _))| enemy.alive)
        .map(|(e, (_, pos, col))| (e, *pos, col.radius))
        .collect();

    for (projectile, (p, pos, col)) in world
        .query::<(&Projectile, &Position, &Collider)>()
        .iter()
    {
        if !p.active {
            continue;
        }
        for &(enemy, enemy_pos, enemy_radius) in &enemies {
            if overlaps(pos, col.radius, &enemy_pos, enemy_radius) {
                contacts.push(Contact::ProjectileEnemy { projectile, enemy });
            }
        }
    }

    let Ok(player_pos) = world.get::<&Position>(player).map(|pos| *pos) else {
        return contacts;
    };
    let player_radius = world
        .get::<&Collider>(player)
        .map_or(0.0, |col| col.radius);

    for &(enemy, enemy_pos, enemy_radius) in &enemies {
        if overlaps(&player_pos, player_radius, &enemy_pos, enemy_radius) {
            contacts.push(Contact::PlayerEnemy { enemy });
        }
    }

    for (drop, (d, pos, col)) in world
        .query::<(&CurrencyDrop, &Position, &Collider)>()
        .iter()
    {
        if d.active && overlaps(&player_pos, player_radius, pos, col.radius) {
            contacts.push(Contact::PlayerCurrency { drop });
        }
    }

    contacts
}

/// Apply each contact. Kills spawn their currency drop after all pairs are
/// resolved.
pub fn resolve(
    world: &mut World,
    contacts: &[Contact],
    player: Entity,
    stats: &mut Stats,
    rng: &mut ChaCha8Rng,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    let mut kills: Vec<Position> = Vec::new();

    for contact in contacts {
        match *contact {
            Contact::ProjectileEnemy { projectile, enemy } => {
                if let Some(death) =
                    projectile_hits_enemy(world, projectile, enemy, stats, rng, events)
                {
                    kills.push(death);
                }
            }
            Contact::PlayerEnemy { enemy } => {
                enemy_touches_player(world, player, enemy, stats, rng, now_ms, events);
            }
            Contact::PlayerCurrency { drop } => {
                player_collects(world, drop, stats, events);
            }
        }
    }

    for position in kills {
        world_setup::spawn_currency(world, rng, position, ENEMY_CURRENCY_DROP);
    }
}

pub fn run(
    world: &mut World,
    player: Entity,
    stats: &mut Stats,
    rng: &mut ChaCha8Rng,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    let contacts = detect(world, player);
    resolve(world, &contacts, player, stats, rng, now_ms, events);
}

/// Returns the death position if the hit killed the enemy.
fn projectile_hits_enemy(
    world: &mut World,
    projectile: Entity,
    enemy: Entity,
    stats: &Stats,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GameEvent>,
) -> Option<Position> {
    let mut shot = world.get::<&mut Projectile>(projectile).ok()?;
    let mut target = world.get::<&mut Enemy>(enemy).ok()?;
    if !shot.active || !target.alive {
        return None;
    }
    let position = world.get::<&Position>(enemy).map(|p| *p).ok()?;

    let is_crit = combat::roll_crit(rng, stats.crit_chance);
    let damage = if is_crit {
        combat::crit_damage(shot.damage)
    } else {
        shot.damage
    };

    shot.active = false;
    target.current_health -= damage;
    events.push(GameEvent::DamageDealt {
        position,
        value: damage,
        is_crit,
    });

    if target.current_health <= 0.0 {
        target.current_health = 0.0;
        target.alive = false;
        events.push(GameEvent::EnemyDied { position });
        return Some(position);
    }
    None
}

fn enemy_touches_player(
    world: &mut World,
    player: Entity,
    enemy: Entity,
    stats: &mut Stats,
    rng: &mut ChaCha8Rng,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    let contact_damage = match world.get::<&Enemy>(enemy) {
        Ok(e) if e.alive => e.contact_damage,
        _ => return,
    };
    let Ok((iframes, pos)) = world.query_one_mut::<(&mut Invulnerability, &Position)>(player)
    else {
        return;
    };
    if now_ms < iframes.last_hit_ms + iframes.duration_ms {
        return;
    }
    let position = *pos;

    if combat::roll_dodge(rng, stats.dodge) {
        iframes.last_hit_ms = now_ms;
        iframes.duration_ms = DODGE_IFRAME_MS;
        events.push(GameEvent::Dodged { position });
        return;
    }

    let actual = stats.take_damage(contact_damage);
    iframes.last_hit_ms = now_ms;
    iframes.duration_ms = combat::iframe_duration_ms(actual, stats.max_health);
    log::debug!(
        "player hit for {actual}, invulnerable for {}ms",
        iframes.duration_ms
    );
    events.push(GameEvent::PlayerDamaged {
        position,
        value: actual,
    });
}

fn player_collects(
    world: &mut World,
    drop: Entity,
    stats: &mut Stats,
    events: &mut Vec<GameEvent>,
) {
    let Ok(mut currency) = world.get::<&mut CurrencyDrop>(drop) else {
        return;
    };
    if !currency.active {
        return;
    }
    currency.active = false;
    stats.earn(currency.value);
    events.push(GameEvent::CurrencyPickedUp {
        value: currency.value,
        total: stats.currency,
    });
}
