//! # Rotation Pool
//!
//! Event-sourced scoring for rotation pool played by three or more people.
//!
//! Every scoring action is an immutable [`GameEvent`]. The current
//! [`GameState`] of a game is always the left fold of its events through a
//! pure reducer, which makes undo and replay exact: undo removes the newest
//! event and replays the rest.
//!
//! ## Scoring
//!
//! Balls 1..=15 are on the table and are played from 3 up to 15, then 1 and
//! 2. Balls 3 to 6 are worth 6 each, 7 to 15 their face value, ball 1 is
//! worth 16 and ball 2 is worth 17. The full rack totals 156 points. Fouls cost
//! the value of the fouled ball; potting the white costs the value of the
//! active ball once play has begun.
//!
//! A player whose best possible finish is below the top score is eliminated.
//! The game ends when nobody still playing can catch the leader (a clinch),
//! when the last ball is potted, or when the scorekeeper ends it.
//!
//! ## Core Modules
//!
//! - [`game`]: Ball model, events, reducer, end-of-game evaluation, replay
//! - [`store`]: Append-only event log and state cache
//! - [`session`]: One async actor per game serializing its mutations
//! - [`export`]: JSON and CSV renderings
//! - [`stats`]: Per-player and overall statistics
//!
//! ## Example
//!
//! ```
//! use rotation_pool::{GameEvent, GameStatus, Roster, ScoreEffect, game};
//!
//! let roster = Roster::from_ids(["ann", "bob", "cy"]);
//! let mut events = vec![GameEvent::GameStarted];
//!
//! let state = game::rebuild(&roster, &events, GameStatus::Lobby);
//! events.push(game::pot_ball(&state, &roster, &"ann".into(), 3, ScoreEffect::Add).unwrap());
//!
//! let state = game::rebuild(&roster, &events, GameStatus::Lobby);
//! assert_eq!(state.top_score, 6);
//! ```

/// Core scoring logic, entities, and reducer.
pub mod game;
pub use game::{
    Ball, EndReason, GameError, GameEvent, GameId, GameResult, GameState, GameStatus, PlayerId,
    PlayerScore, PlayerStatus, Rack, Roster, RosterEntry, Score, ScoreEffect,
    constants::{self, MAX_TOTAL_SCORE, MIN_PLAYERS},
};

/// Event log persistence.
pub mod store;
pub use store::{EventRecord, EventStore, InMemoryEventStore, StoreError, StoreResult};

/// Per-game actors and their manager.
pub mod session;

pub mod export;
pub mod stats;
