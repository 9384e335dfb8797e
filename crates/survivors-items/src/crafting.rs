//! Crafting: paying for a fusion, waiting on the worker, and settling the
//! result against the registry.

use survivors_core::constants::CRAFT_COST;
use survivors_core::error::{GameError, GameResult};
use survivors_core::items::{Item, ItemId};
use survivors_core::stats::Stats;

use crate::fusion::{FusionJob, FusionWorker};
use crate::inventory::RunInventory;
use crate::registry::ItemRegistry;

#[derive(Debug, Clone, PartialEq)]
pub enum CraftStart {
    /// The pair was fused before; the cached item is returned at once.
    Cached(Item),
    /// A new fusion request is in flight.
    Submitted,
}

/// How a finished craft settled.
#[derive(Debug, Clone, PartialEq)]
pub enum CraftSettlement {
    Completed(Item),
    /// The fusion failed and the craft cost was returned.
    Refunded { reason: String, refund: u32 },
}

#[derive(Debug, Clone)]
struct PendingCraft {
    ticket: u64,
    first: ItemId,
    second: ItemId,
    paid: u32,
}

pub struct Crafter {
    worker: FusionWorker,
    pending: Option<PendingCraft>,
    last_crafted: Option<Item>,
    next_ticket: u64,
}

impl Crafter {
    pub fn new(worker: FusionWorker) -> Self {
        Self {
            worker,
            pending: None,
            last_crafted: None,
            next_ticket: 0,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_crafted(&self) -> Option<&Item> {
        self.last_crafted.as_ref()
    }

    /// Charge [`CRAFT_COST`] and start fusing `first` with `second`.
    ///
    /// Both parents must be in the run inventory. Nothing is mutated when
    /// the request is rejected.
    pub fn begin(
        &mut self,
        registry: &ItemRegistry,
        inventory: &RunInventory,
        stats: &mut Stats,
        first: &str,
        second: &str,
    ) -> GameResult<CraftStart> {
        if self.pending.is_some() {
            return Err(GameError::CraftInProgress);
        }
        for id in [first, second] {
            if inventory.count_of(id) == 0 {
                return Err(GameError::NotInInventory(id.to_string()));
            }
        }
        let first_item = registry.require(first)?.clone();
        let second_item = registry.require(second)?.clone();

        stats.spend(CRAFT_COST)?;
        self.last_crafted = None;

        if let Some(cached) = registry.cached_combination(first, second) {
            log::debug!("fusion cache hit for {first} + {second}");
            self.last_crafted = Some(cached.clone());
            return Ok(CraftStart::Cached(cached.clone()));
        }

        log::info!("crafting {first} + {second}");
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending = Some(PendingCraft {
            ticket,
            first: first.to_string(),
            second: second.to_string(),
            paid: CRAFT_COST,
        });
        self.worker.submit(FusionJob {
            ticket,
            first: first_item,
            second: second_item,
        });
        Ok(CraftStart::Submitted)
    }

    /// Settle a finished fusion, if one arrived. `stamp` disambiguates the
    /// generated item id.
    ///
    /// Results of abandoned crafts are dropped; only the outcome carrying
    /// the pending craft's ticket settles it.
    pub fn poll(
        &mut self,
        registry: &mut ItemRegistry,
        stats: &mut Stats,
        stamp: u64,
    ) -> Option<CraftSettlement> {
        let (pending, outcome) = loop {
            let outcome = self.worker.try_recv()?;
            match self.pending.take() {
                Some(pending) if pending.ticket == outcome.ticket => break (pending, outcome),
                still_waiting => {
                    log::warn!(
                        "dropping stale fusion result for {} + {}",
                        outcome.first_id,
                        outcome.second_id
                    );
                    self.pending = still_waiting;
                }
            }
        };

        match outcome.result {
            Ok(descriptor) => {
                let item = descriptor.into_item(&pending.first, &pending.second, stamp);
                registry.store_combination(&pending.first, &pending.second, item.clone(), stamp);
                log::info!("crafted {} ({})", item.name, item.id);
                self.last_crafted = Some(item.clone());
                Some(CraftSettlement::Completed(item))
            }
            Err(e) => {
                stats.earn(pending.paid);
                log::warn!("craft of {} + {} failed: {e}", pending.first, pending.second);
                Some(CraftSettlement::Refunded {
                    reason: GameError::GenerationFailed(e.to_string()).to_string(),
                    refund: pending.paid,
                })
            }
        }
    }

    /// Forget the in-flight craft and the last result. Its result is
    /// discarded if it still arrives.
    pub fn reset(&mut self) {
        self.pending = None;
        self.last_crafted = None;
    }
}

impl Default for Crafter {
    fn default() -> Self {
        Self::new(FusionWorker::default())
    }
}
