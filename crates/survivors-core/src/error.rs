//! Error types surfaced by session intents.

use thiserror::Error;

use crate::enums::GamePhase;

/// Why a player intent was rejected. Rejections never mutate state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("not enough currency: need {needed}, have {available}")]
    InsufficientCurrency { needed: u32, available: u32 },

    #[error("unknown item: {0}")]
    UnknownItem(String),

    #[error("item is not in the run inventory: {0}")]
    NotInInventory(String),

    #[error("item is not offered in the shop: {0}")]
    ItemNotOffered(String),

    #[error("action not allowed during {0:?}")]
    InvalidPhase(GamePhase),

    #[error("a craft is already in progress")]
    CraftInProgress,

    #[error("item generation failed: {0}")]
    GenerationFailed(String),
}

pub type GameResult<T> = Result<T, GameError>;
