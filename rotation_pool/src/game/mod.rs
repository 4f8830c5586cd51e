//! Rotation scoring core.
//!
//! This module holds everything needed to score a game from its event log:
//! - Ball model and rack ([`entities`], [`functional`])
//! - Event types ([`events`])
//! - Pure reducer and end-of-game evaluation ([`state_machine`], [`standings`])
//! - Replay and undo ([`replay`])
//! - Request validation that produces events ([`commands`])

pub mod commands;
pub mod constants;
pub mod entities;
pub mod errors;
pub mod events;
pub mod functional;
pub mod replay;
pub mod standings;
pub mod state_machine;

pub use commands::{commit_foul, end_game, pot_ball, start_game, terminal_event};
pub use entities::{
    Ball, GameId, GameState, GameStatus, PlayerId, PlayerScore, PlayerStatus, Rack, Roster,
    RosterEntry, Score,
};
pub use errors::{GameError, GameResult};
pub use events::{EndReason, GameEvent, ScoreEffect};
pub use replay::{initial_state, rebuild, undo};
pub use state_machine::reduce;
