use thiserror::Error;

use crate::{
    game::{GameError, GameId},
    store::StoreError,
};

/// Errors surfaced by game sessions
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("game {0} not found")]
    GameNotFound(GameId),

    #[error("game session is closed")]
    Closed,

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type SessionResult<T> = Result<T, SessionError>;
