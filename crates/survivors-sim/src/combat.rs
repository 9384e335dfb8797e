//! Combat rolls and formulas. Pure functions; randomness is injected.

use rand::Rng;

use survivors_core::constants::*;

/// True with `chance` percent probability. Zero never succeeds, 100 or
/// more always does.
pub fn roll_percent<R: Rng>(rng: &mut R, chance: f64) -> bool {
    rng.gen::<f64>() * 100.0 < chance
}

pub fn roll_crit<R: Rng>(rng: &mut R, crit_chance: f64) -> bool {
    roll_percent(rng, crit_chance)
}

/// Dodge roll against the capped dodge chance.
pub fn roll_dodge<R: Rng>(rng: &mut R, dodge: f64) -> bool {
    roll_percent(rng, dodge.min(DODGE_CAP))
}

pub fn crit_damage(damage: f64) -> f64 {
    (damage * CRIT_MULTIPLIER).round()
}

/// Invulnerability window after taking `actual_damage`, in milliseconds.
///
/// Scales with the share of max health lost: a hit of 15% or more earns the
/// full 0.4 s, small hits the 0.2 s floor. The result is rounded to the
/// millisecond.
pub fn iframe_duration_ms(actual_damage: f64, max_health: f64) -> f64 {
    let damage_percent = if max_health > 0.0 {
        actual_damage / max_health * 100.0
    } else {
        IFRAME_FULL_DAMAGE_PERCENT
    };
    let secs = (IFRAME_MAX_SECS * damage_percent / IFRAME_FULL_DAMAGE_PERCENT)
        .clamp(IFRAME_MIN_SECS, IFRAME_MAX_SECS);
    (secs * 1000.0).round()
}
