//! Game actor message types.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::errors::SessionResult;
use crate::{
    game::{Ball, GameEvent, GameId, GameState, PlayerId, Roster, ScoreEffect},
    store::EventRecord,
};

/// Result of a command sent to a game actor
pub type CommandResult = SessionResult<GameSnapshot>;

/// Messages that can be sent to a GameActor
#[derive(Debug)]
pub enum GameMessage {
    /// Move the game from lobby to active
    Start {
        response: oneshot::Sender<CommandResult>,
    },

    /// Ball `ball` went down for `player_id`; 0 is the white
    Pot {
        player_id: PlayerId,
        ball: u8,
        effect: ScoreEffect,
        response: oneshot::Sender<CommandResult>,
    },

    /// Foul charged against `player_id` on ball `ball`
    Foul {
        player_id: PlayerId,
        ball: u8,
        response: oneshot::Sender<CommandResult>,
    },

    /// Scorekeeper ends the game
    End {
        response: oneshot::Sender<CommandResult>,
    },

    /// Drop the newest event and rebuild
    Undo {
        response: oneshot::Sender<CommandResult>,
    },

    /// Take a player out of the rotation
    DropOut {
        player_id: PlayerId,
        response: oneshot::Sender<CommandResult>,
    },

    /// Get current game state
    GetSnapshot {
        response: oneshot::Sender<GameSnapshot>,
    },

    /// Get the persisted event log
    GetEvents {
        response: oneshot::Sender<SessionResult<Vec<EventRecord>>>,
    },

    /// Subscribe to game updates
    Subscribe {
        subscriber_id: Uuid,
        sender: mpsc::Sender<GameUpdate>,
    },

    /// Unsubscribe from game updates
    Unsubscribe { subscriber_id: Uuid },

    /// Stop the actor
    Close { response: oneshot::Sender<()> },
}

/// Point-in-time view of a game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub state: GameState,
    pub active_ball: Option<Ball>,
    pub roster: Roster,
}

/// What changed in a [`GameUpdate`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateKind {
    /// An event was appended and folded into the state.
    Applied(GameEvent),
    /// The newest event was removed.
    Undone(GameEvent),
    PlayerDroppedOut(PlayerId),
}

/// Sent to subscribers after every state transition.
#[derive(Debug, Clone, PartialEq)]
pub struct GameUpdate {
    pub game_id: GameId,
    pub kind: UpdateKind,
    pub snapshot: GameSnapshot,
}
