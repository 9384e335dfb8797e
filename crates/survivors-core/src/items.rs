//! Item records. Items are immutable once created.

use serde::{Deserialize, Serialize};

use crate::enums::Rarity;
use crate::stats::StatEffects;

pub type ItemId = String;

/// A passive item that modifies player stats when applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub effects: StatEffects,
    #[serde(default)]
    pub is_starting_item: bool,
    /// The two items this one was fused from, if generated.
    #[serde(default)]
    pub parents: Option<(ItemId, ItemId)>,
}

/// A stack of identical items in the per-run inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: Item,
    pub count: u32,
}

impl Item {
    /// Shop price of this item.
    pub fn cost(&self) -> u32 {
        self.rarity.cost()
    }

    pub fn is_generated(&self) -> bool {
        !self.is_starting_item
    }
}
