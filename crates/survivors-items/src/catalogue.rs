//! Starting items: the seed catalogue every run's shop draws from.

use survivors_core::enums::Rarity;
use survivors_core::items::Item;
use survivors_core::stats::StatEffects;

fn starting_item(
    id: &str,
    name: &str,
    description: &str,
    rarity: Rarity,
    effects: StatEffects,
) -> Item {
    Item {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        rarity,
        effects,
        is_starting_item: true,
        parents: None,
    }
}

/// The built-in items, in catalogue order.
pub fn starting_items() -> Vec<Item> {
    vec![
        starting_item(
            "lucky_clover",
            "Lucky Clover",
            "A four-leaf clover that brings good fortune",
            Rarity::Common,
            StatEffects {
                luck: 15.0,
                ..Default::default()
            },
        ),
        starting_item(
            "alien_armor",
            "Alien Armor",
            "Sturdy plating from a crashed alien ship",
            Rarity::Common,
            StatEffects {
                max_health: 10.0,
                armor: 5.0,
                ..Default::default()
            },
        ),
        starting_item(
            "energy_drink",
            "Energy Drink",
            "Caffeinated beverage that boosts physical performance",
            Rarity::Common,
            StatEffects {
                speed: 8.0,
                attack_speed: 5.0,
                ..Default::default()
            },
        ),
        starting_item(
            "regeneration_serum",
            "Regeneration Serum",
            "Medical compound that accelerates healing",
            Rarity::Uncommon,
            StatEffects {
                health_regen: 3.0,
                ..Default::default()
            },
        ),
        starting_item(
            "tactical_vest",
            "Tactical Vest",
            "Military-grade protective equipment",
            Rarity::Uncommon,
            StatEffects {
                armor: 8.0,
                dodge: 3.0,
                ..Default::default()
            },
        ),
        starting_item(
            "training_manual",
            "Training Manual",
            "A guide to improving combat effectiveness",
            Rarity::Common,
            StatEffects {
                damage_bonus: 10.0,
                xp_gain: 10.0,
                ..Default::default()
            },
        ),
        starting_item(
            "rabbits_foot",
            "Rabbit's Foot",
            "A charm said to improve reflexes",
            Rarity::Uncommon,
            StatEffects {
                dodge: 8.0,
                crit_chance: 5.0,
                ..Default::default()
            },
        ),
        starting_item(
            "power_gauntlet",
            "Power Gauntlet",
            "Mechanical gloves that enhance striking power",
            Rarity::Rare,
            StatEffects {
                damage_bonus: 15.0,
                attack_speed: -5.0,
                ..Default::default()
            },
        ),
        starting_item(
            "magnetic_field_generator",
            "Magnetic Field Generator",
            "Device that pulls items toward the user",
            Rarity::Uncommon,
            StatEffects {
                luck: 5.0,
                pickup_range: 50.0,
                ..Default::default()
            },
        ),
        starting_item(
            "hearty_meal",
            "Hearty Meal",
            "A nutritious feast that fortifies the body",
            Rarity::Common,
            StatEffects {
                max_health: 25.0,
                health_regen: 1.0,
                ..Default::default()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalogue_ids_are_unique() {
        let items = starting_items();
        let ids: HashSet<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), items.len());
        assert_eq!(items.len(), 10);
    }

    #[test]
    fn catalogue_items_are_starting_items_with_effects() {
        for item in starting_items() {
            assert!(item.is_starting_item, "{} should be a starting item", item.id);
            assert!(item.parents.is_none());
            assert!(!item.effects.non_zero().is_empty(), "{} has no effects", item.id);
        }
    }

    #[test]
    fn power_gauntlet_trades_attack_speed_for_damage() {
        let gauntlet = starting_items()
            .into_iter()
            .find(|i| i.id == "power_gauntlet")
            .unwrap();
        assert_eq!(gauntlet.rarity, Rarity::Rare);
        assert_eq!(gauntlet.effects.damage_bonus, 15.0);
        assert_eq!(gauntlet.effects.attack_speed, -5.0);
    }
}
