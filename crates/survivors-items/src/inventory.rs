//! Per-run inventory: the items applied during the current run, stacked.

use survivors_core::items::{Item, ItemStack};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunInventory {
    stacks: Vec<ItemStack>,
}

impl RunInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one copy of `item`, stacking onto an existing entry with the
    /// same id.
    pub fn add(&mut self, item: &Item) {
        match self.stacks.iter_mut().find(|s| s.item.id == item.id) {
            Some(stack) => stack.count += 1,
            None => self.stacks.push(ItemStack {
                item: item.clone(),
                count: 1,
            }),
        }
    }

    pub fn stacks(&self) -> &[ItemStack] {
        &self.stacks
    }

    pub fn count_of(&self, id: &str) -> u32 {
        self.stacks
            .iter()
            .find(|s| s.item.id == id)
            .map_or(0, |s| s.count)
    }

    /// Total number of items, counting every copy.
    pub fn len(&self) -> u32 {
        self.stacks.iter().map(|s| s.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn clear(&mut self) {
        self.stacks.clear();
    }
}
