//! Player stat record and the item-effect application rules.

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::*;
use crate::error::{GameError, GameResult};

/// Player stats. Mutated only through the methods below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub max_health: f64,
    pub current_health: f64,
    pub speed: f64,
    pub damage_bonus: f64,
    pub armor: f64,
    /// Percent chance for a projectile hit to crit.
    pub crit_chance: f64,
    /// Shots per second multiplier.
    pub attack_speed: f64,
    pub health_regen: f64,
    /// Percent chance to dodge contact damage.
    pub dodge: f64,
    pub luck: f64,
    pub pickup_range: f64,
    pub xp_gain: f64,
    pub currency: u32,
}

/// Additive stat deltas carried by an item.
///
/// Field names on the wire match the item catalogue format. Absent, null or
/// non-numeric fields read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatEffects {
    #[serde(rename = "maxHealth", deserialize_with = "lenient_number")]
    pub max_health: f64,
    #[serde(rename = "healthRegen", deserialize_with = "lenient_number")]
    pub health_regen: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub armor: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub speed: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub dodge: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub luck: f64,
    #[serde(rename = "damageBonus", deserialize_with = "lenient_number")]
    pub damage_bonus: f64,
    #[serde(rename = "critChance", deserialize_with = "lenient_number")]
    pub crit_chance: f64,
    #[serde(rename = "attackSpeed", deserialize_with = "lenient_number")]
    pub attack_speed: f64,
    #[serde(alias = "pickupRange", deserialize_with = "lenient_number")]
    pub pickup_range: f64,
    #[serde(alias = "xpGain", deserialize_with = "lenient_number")]
    pub xp_gain: f64,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            max_health: PLAYER_BASE_MAX_HEALTH,
            current_health: PLAYER_BASE_MAX_HEALTH,
            speed: PLAYER_BASE_SPEED,
            damage_bonus: 0.0,
            armor: 0.0,
            crit_chance: 0.0,
            attack_speed: PLAYER_BASE_ATTACK_SPEED,
            health_regen: 0.0,
            dodge: 0.0,
            luck: 0.0,
            pickup_range: PLAYER_BASE_PICKUP_RANGE,
            xp_gain: PLAYER_BASE_XP_GAIN,
            currency: 0,
        }
    }
}

impl Stats {
    /// Add every effect onto the matching stat.
    ///
    /// A max-health grant also heals by the same amount, capped at the new
    /// maximum.
    pub fn apply_effects(&mut self, effects: &StatEffects) {
        self.max_health += effects.max_health;
        self.health_regen += effects.health_regen;
        self.armor += effects.armor;
        self.speed += effects.speed;
        self.dodge += effects.dodge;
        self.luck += effects.luck;
        self.damage_bonus += effects.damage_bonus;
        self.crit_chance += effects.crit_chance;
        self.attack_speed += effects.attack_speed;
        self.pickup_range += effects.pickup_range;
        self.xp_gain += effects.xp_gain;

        if effects.max_health != 0.0 {
            self.current_health =
                (self.current_health + effects.max_health).clamp(0.0, self.max_health.max(0.0));
        }
    }

    /// Apply armor-mitigated damage. Returns the damage actually taken.
    pub fn take_damage(&mut self, raw_amount: f64) -> f64 {
        let reduction = self.armor.min(ARMOR_CAP) / 100.0;
        let actual = (raw_amount * (1.0 - reduction)).round();
        self.current_health = (self.current_health - actual).max(0.0);
        actual
    }

    /// Heal up to `amount`, never past max health. Returns the amount healed.
    pub fn heal(&mut self, amount: f64) -> f64 {
        let before = self.current_health;
        self.current_health = (self.current_health + amount).min(self.max_health);
        self.current_health - before
    }

    pub fn heal_to_full(&mut self) {
        self.current_health = self.max_health;
    }

    pub fn is_dead(&self) -> bool {
        self.current_health <= 0.0
    }

    /// Deduct `cost` currency, or fail without mutating.
    pub fn spend(&mut self, cost: u32) -> GameResult<()> {
        if self.currency < cost {
            return Err(GameError::InsufficientCurrency {
                needed: cost,
                available: self.currency,
            });
        }
        self.currency -= cost;
        Ok(())
    }

    pub fn earn(&mut self, amount: u32) {
        self.currency = self.currency.saturating_add(amount);
    }

    /// Dodge chance after the cap.
    pub fn effective_dodge(&self) -> f64 {
        self.dodge.min(DODGE_CAP)
    }

    /// Milliseconds between shots. Non-positive attack speed counts as 1.
    pub fn attack_cooldown_ms(&self) -> f64 {
        let attack_speed = if self.attack_speed.is_finite() && self.attack_speed > 0.0 {
            self.attack_speed
        } else {
            1.0
        };
        1000.0 / attack_speed
    }

    /// Milliseconds needed to regenerate one point of health.
    pub fn regen_interval_ms(&self) -> f64 {
        REGEN_BASE_INTERVAL_MS / (1.0 + (self.health_regen - 1.0) / REGEN_SCALING)
    }
}

impl StatEffects {
    /// Field-wise sum of two effect records.
    pub fn combined(&self, other: &StatEffects) -> StatEffects {
        StatEffects {
            max_health: self.max_health + other.max_health,
            health_regen: self.health_regen + other.health_regen,
            armor: self.armor + other.armor,
            speed: self.speed + other.speed,
            dodge: self.dodge + other.dodge,
            luck: self.luck + other.luck,
            damage_bonus: self.damage_bonus + other.damage_bonus,
            crit_chance: self.crit_chance + other.crit_chance,
            attack_speed: self.attack_speed + other.attack_speed,
            pickup_range: self.pickup_range + other.pickup_range,
            xp_gain: self.xp_gain + other.xp_gain,
        }
    }

    /// Named, non-zero effects in catalogue order.
    pub fn non_zero(&self) -> Vec<(&'static str, f64)> {
        [
            ("maxHealth", self.max_health),
            ("healthRegen", self.health_regen),
            ("armor", self.armor),
            ("speed", self.speed),
            ("dodge", self.dodge),
            ("luck", self.luck),
            ("damageBonus", self.damage_bonus),
            ("critChance", self.crit_chance),
            ("attackSpeed", self.attack_speed),
            ("pickup_range", self.pickup_range),
            ("xp_gain", self.xp_gain),
        ]
        .into_iter()
        .filter(|(_, value)| *value != 0.0)
        .collect()
    }

    /// Sum of all deltas, used as a rough power budget.
    pub fn total(&self) -> f64 {
        self.non_zero().iter().map(|(_, value)| value).sum()
    }
}
