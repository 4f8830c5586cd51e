//! Precondition failures detected before an event is constructed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{GameStatus, PlayerId};

/// Errors a caller can hit when asking for a new event.
///
/// The reducer and replay functions never return these. They assume the
/// event they are handed already passed the checks in
/// [`commands`](super::commands).
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("ball {0} is not on the rack (valid numbers are 0-15)")]
    InvalidBall(u8),
    #[error("ball {0} has already been potted")]
    BallAlreadyPotted(u8),
    #[error("ball {0} is listed more than once")]
    DuplicateBall(u8),
    #[error("player {0} is not in this game")]
    UnknownPlayer(PlayerId),
    #[error("player {0} has dropped out")]
    InactivePlayer(PlayerId),
    #[error("game is not active (status: {status})")]
    GameNotActive { status: GameStatus },
    #[error("game already started")]
    GameAlreadyStarted,
    #[error("no events to undo")]
    NothingToUndo,
    #[error("score effect must be +1 or -1, got {0}")]
    InvalidScoreEffect(i8),
    #[error("need at least {min} players, got {got}")]
    NotEnoughPlayers { min: usize, got: usize },
    #[error("at most {max} players allowed, got {got}")]
    TooManyPlayers { max: usize, got: usize },
    #[error("player {0} is listed more than once")]
    DuplicatePlayer(PlayerId),
}

/// Result type for command validation
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GameError::InvalidBall(16).to_string(),
            "ball 16 is not on the rack (valid numbers are 0-15)"
        );
        assert_eq!(
            GameError::GameNotActive {
                status: GameStatus::Ended
            }
            .to_string(),
            "game is not active (status: ended)"
        );
        assert_eq!(
            GameError::UnknownPlayer(PlayerId::new("zed")).to_string(),
            "player zed is not in this game"
        );
    }

    #[test]
    fn test_error_serde_round_trip() {
        let err = GameError::NotEnoughPlayers { min: 3, got: 2 };
        let json = serde_json::to_string(&err).unwrap();
        let back: GameError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
