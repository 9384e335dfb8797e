//! Persistent item pool and fusion cache.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use survivors_core::error::{GameError, GameResult};
use survivors_core::items::{Item, ItemId};

use crate::catalogue::starting_items;
use crate::store::{KeyValueStore, MemoryStore, StoreError};

/// A cached fusion result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationRecord {
    pub item: Item,
    pub timestamp: u64,
    pub parents: (ItemId, ItemId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_items: usize,
    pub starting_items: usize,
    pub generated_items: usize,
    pub cached_combinations: usize,
}

/// On-disk layout. Starting items are never persisted; they are rebuilt
/// from the catalogue on every load.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedRegistry {
    #[serde(default)]
    generated_items: Vec<Item>,
    #[serde(default)]
    combinations: Vec<CombinationRecord>,
}

/// The item pool (starting items followed by generated items) and the
/// order-independent fusion cache.
pub struct ItemRegistry {
    items: Vec<Item>,
    combinations: HashMap<String, CombinationRecord>,
    store: Box<dyn KeyValueStore>,
}

impl ItemRegistry {
    pub const STORAGE_KEY: &'static str = "itemFusionData";

    /// Registry backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStore::new()))
    }

    /// Build the pool from the catalogue, then merge whatever the store
    /// holds. An unreadable store is logged and treated as empty.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let mut registry = Self {
            items: starting_items(),
            combinations: HashMap::new(),
            store,
        };

        let persisted = match registry.read_persisted() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("item store unreadable, starting from catalogue: {e}");
                PersistedRegistry::default()
            }
        };

        for item in persisted.generated_items {
            if registry.get(&item.id).is_none() {
                registry.items.push(item);
            }
        }
        for record in persisted.combinations {
            let key = Self::cache_key(&record.parents.0, &record.parents.1);
            registry.combinations.insert(key, record);
        }

        log::info!(
            "item registry loaded: {} items, {} cached combinations",
            registry.items.len(),
            registry.combinations.len()
        );
        registry
    }

    fn read_persisted(&self) -> Result<PersistedRegistry, StoreError> {
        match self.store.get(Self::STORAGE_KEY)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(PersistedRegistry::default()),
        }
    }

    /// Cache key for a pair of parents, independent of argument order.
    pub fn cache_key(a: &str, b: &str) -> String {
        if a <= b {
            format!("{a}+{b}")
        } else {
            format!("{b}+{a}")
        }
    }

    pub fn pool(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn require(&self, id: &str) -> GameResult<&Item> {
        self.get(id)
            .ok_or_else(|| GameError::UnknownItem(id.to_string()))
    }

    pub fn generated_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.is_generated())
    }

    pub fn has_combination(&self, a: &str, b: &str) -> bool {
        self.combinations.contains_key(&Self::cache_key(a, b))
    }

    pub fn cached_combination(&self, a: &str, b: &str) -> Option<&Item> {
        self.combinations
            .get(&Self::cache_key(a, b))
            .map(|record| &record.item)
    }

    /// Record a fusion result: cache it under the parents' key, add it to
    /// the pool and persist.
    pub fn store_combination(&mut self, a: &str, b: &str, item: Item, timestamp: u64) {
        let key = Self::cache_key(a, b);
        if self.get(&item.id).is_none() {
            self.items.push(item.clone());
        }
        self.combinations.insert(
            key,
            CombinationRecord {
                item,
                timestamp,
                parents: (a.to_string(), b.to_string()),
            },
        );
        self.persist();
    }

    /// Remove a generated item from the pool. Cached combinations that
    /// produced it are dropped so the pair can be fused again. Starting
    /// items cannot be discarded.
    pub fn discard(&mut self, id: &str) -> GameResult<Item> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id && item.is_generated())
            .ok_or_else(|| GameError::UnknownItem(id.to_string()))?;
        let removed = self.items.remove(index);
        self.combinations.retain(|_, record| record.item.id != id);
        self.persist();
        Ok(removed)
    }

    /// Forget every generated item and cached combination.
    pub fn clear_generated(&mut self) {
        self.items.retain(|item| item.is_starting_item);
        self.combinations.clear();
        if let Err(e) = self.store.remove(Self::STORAGE_KEY) {
            log::warn!("failed to clear item store: {e}");
        }
    }

    pub fn stats(&self) -> RegistryStats {
        let starting = self.items.iter().filter(|i| i.is_starting_item).count();
        RegistryStats {
            total_items: self.items.len(),
            starting_items: starting,
            generated_items: self.items.len() - starting,
            cached_combinations: self.combinations.len(),
        }
    }

    fn persist(&mut self) {
        let data = PersistedRegistry {
            generated_items: self.generated_items().cloned().collect(),
            combinations: self.combinations.values().cloned().collect(),
        };
        let result = serde_json::to_value(&data)
            .map_err(StoreError::from)
            .and_then(|value| self.store.put(Self::STORAGE_KEY, &value));
        if let Err(e) = result {
            log::warn!("failed to persist item registry: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use survivors_core::enums::Rarity;
    use survivors_core::stats::StatEffects;

    /// Memory store whose contents outlive the registry that owns it.
    #[derive(Clone, Default)]
    struct SharedStore(Arc<Mutex<MemoryStore>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
            self.0.lock().unwrap().get(key)
        }
        fn put(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
            self.0.lock().unwrap().put(key, value)
        }
        fn has(&self, key: &str) -> bool {
            self.0.lock().unwrap().has(key)
        }
        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.0.lock().unwrap().remove(key)
        }
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }
        fn put(&mut self, _key: &str, _value: &Value) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }
        fn has(&self, _key: &str) -> bool {
            false
        }
        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn generated(id: &str, a: &str, b: &str) -> Item {
        Item {
            id: id.to_string(),
            name: "Fused".to_string(),
            description: "Two things at once".to_string(),
            rarity: Rarity::Uncommon,
            effects: StatEffects {
                luck: 20.0,
                ..Default::default()
            },
            is_starting_item: false,
            parents: Some((a.to_string(), b.to_string())),
        }
    }

    #[test]
    fn cache_key_is_order_independent() {
        assert_eq!(
            ItemRegistry::cache_key("lucky_clover", "alien_armor"),
            "alien_armor+lucky_clover"
        );
        assert_eq!(
            ItemRegistry::cache_key("alien_armor", "lucky_clover"),
            "alien_armor+lucky_clover"
        );
    }

    #[test]
    fn fresh_registry_holds_the_catalogue() {
        let registry = ItemRegistry::in_memory();
        let stats = registry.stats();
        assert_eq!(stats.total_items, 10);
        assert_eq!(stats.starting_items, 10);
        assert_eq!(stats.generated_items, 0);
        assert!(registry.require("hearty_meal").is_ok());
        assert_eq!(
            registry.require("nope"),
            Err(GameError::UnknownItem("nope".to_string()))
        );
    }

    #[test]
    fn stored_combination_is_found_in_either_order() {
        let mut registry = ItemRegistry::in_memory();
        let item = generated("generated_a_b_1", "lucky_clover", "alien_armor");
        registry.store_combination("lucky_clover", "alien_armor", item.clone(), 1);

        assert!(registry.has_combination("alien_armor", "lucky_clover"));
        assert_eq!(
            registry.cached_combination("alien_armor", "lucky_clover"),
            Some(&item)
        );
        assert_eq!(registry.pool().last(), Some(&item));
    }

    #[test]
    fn generated_items_survive_reload() {
        let store = SharedStore::default();
        let mut registry = ItemRegistry::load(Box::new(store.clone()));
        registry.store_combination(
            "energy_drink",
            "tactical_vest",
            generated("generated_x", "energy_drink", "tactical_vest"),
            42,
        );
        drop(registry);

        let reloaded = ItemRegistry::load(Box::new(store));
        assert_eq!(reloaded.stats().generated_items, 1);
        assert_eq!(reloaded.pool()[10].id, "generated_x");
        assert!(reloaded.has_combination("tactical_vest", "energy_drink"));
    }

    #[test]
    fn corrupt_store_falls_back_to_catalogue() {
        let store = SharedStore::default();
        store
            .0
            .lock()
            .unwrap()
            .put(ItemRegistry::STORAGE_KEY, &json!({"generatedItems": 7}))
            .unwrap();
        let registry = ItemRegistry::load(Box::new(store));
        assert_eq!(registry.stats().total_items, 10);
    }

    #[test]
    fn failing_store_does_not_corrupt_memory_state() {
        let mut registry = ItemRegistry::load(Box::new(FailingStore));
        registry.store_combination(
            "lucky_clover",
            "hearty_meal",
            generated("generated_y", "lucky_clover", "hearty_meal"),
            7,
        );
        assert!(registry.get("generated_y").is_some());
        assert!(registry.has_combination("hearty_meal", "lucky_clover"));
    }

    #[test]
    fn discard_drops_item_and_its_cache_entry() {
        let mut registry = ItemRegistry::in_memory();
        registry.store_combination(
            "lucky_clover",
            "rabbits_foot",
            generated("generated_z", "lucky_clover", "rabbits_foot"),
            3,
        );
        let removed = registry.discard("generated_z").unwrap();
        assert_eq!(removed.id, "generated_z");
        assert!(registry.get("generated_z").is_none());
        assert!(!registry.has_combination("lucky_clover", "rabbits_foot"));
        assert!(registry.discard("generated_z").is_err());
        assert_eq!(
            registry.discard("lucky_clover"),
            Err(GameError::UnknownItem("lucky_clover".to_string()))
        );
        assert!(registry.get("lucky_clover").is_some());
    }

    #[test]
    fn clear_generated_keeps_starting_items() {
        let mut registry = ItemRegistry::in_memory();
        registry.store_combination(
            "lucky_clover",
            "rabbits_foot",
            generated("generated_z", "lucky_clover", "rabbits_foot"),
            3,
        );
        registry.clear_generated();
        assert_eq!(registry.stats(), RegistryStats {
            total_items: 10,
            starting_items: 10,
            generated_items: 0,
            cached_combinations: 0,
        });
    }
}
