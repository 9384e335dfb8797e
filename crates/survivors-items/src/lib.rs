//! Item catalogue, registry, shop economy and the fusion service boundary.
//!
//! The registry is the persistent item pool (starting items plus every
//! generated item) together with the fusion cache. Persistence goes through
//! the [`store::KeyValueStore`] trait; item generation goes through the
//! [`fusion::FusionService`] trait.

pub mod catalogue;
pub mod crafting;
pub mod fusion;
pub mod inventory;
pub mod registry;
pub mod shop;
pub mod store;

pub use crafting::Crafter;
pub use registry::ItemRegistry;
