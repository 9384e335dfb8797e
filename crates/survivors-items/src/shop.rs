//! Between-round shop: a handful of random offers drawn from the item pool.
//!
//! Offers stay on the shelf after a purchase, so the same item can be bought
//! more than once per visit. Currency checks live with the caller, which
//! owns the player's stats.

use rand::seq::SliceRandom;
use rand::Rng;

use survivors_core::constants::SHOP_OFFER_COUNT;
use survivors_core::error::{GameError, GameResult};
use survivors_core::items::Item;
use survivors_core::state::ShopOffer;

#[derive(Debug, Clone, Default)]
pub struct Shop {
    offers: Vec<Item>,
}

impl Shop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the shelf with up to [`SHOP_OFFER_COUNT`] distinct items
    /// from `pool`.
    pub fn roll_offers<R: Rng>(&mut self, pool: &[Item], rng: &mut R) {
        self.offers = pool
            .choose_multiple(rng, SHOP_OFFER_COUNT)
            .cloned()
            .collect();
        log::debug!(
            "shop offers: {:?}",
            self.offers.iter().map(|i| i.id.as_str()).collect::<Vec<_>>()
        );
    }

    pub fn offers(&self) -> &[Item] {
        &self.offers
    }

    /// The offered item with this id.
    pub fn offer(&self, id: &str) -> GameResult<&Item> {
        self.offers
            .iter()
            .find(|item| item.id == id)
            .ok_or_else(|| GameError::ItemNotOffered(id.to_string()))
    }

    /// Drop an offer whose item no longer exists in the pool.
    pub fn withdraw(&mut self, id: &str) {
        self.offers.retain(|item| item.id != id);
    }

    pub fn clear(&mut self) {
        self.offers.clear();
    }

    /// Offers priced against the given wallet.
    pub fn view(&self, currency: u32) -> Vec<ShopOffer> {
        self.offers
            .iter()
            .map(|item| ShopOffer {
                item: item.clone(),
                cost: item.cost(),
                affordable: item.cost() <= currency,
            })
            .collect()
    }
}
