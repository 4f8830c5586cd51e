//! Rebuilding state from an event log.
//!
//! Undo never inverts a reduction. It drops the newest event and replays
//! everything before it, so the result is always a state some valid prefix
//! of the log produces.

use super::{
    entities::{GameState, GameStatus, Roster},
    errors::{GameError, GameResult},
    events::GameEvent,
    state_machine::reduce,
};

/// State of a game before any event: every player on zero, full rack.
#[must_use]
pub fn initial_state(roster: &Roster, initial_status: GameStatus) -> GameState {
    GameState::new(roster, initial_status)
}

/// Folds `events` in order over the initial state for `roster`.
///
/// Equivalent to calling [`reduce`] once per event starting from
/// [`initial_state`].
pub fn rebuild<'a, I>(roster: &Roster, events: I, initial_status: GameStatus) -> GameState
where
    I: IntoIterator<Item = &'a GameEvent>,
{
    let state = events
        .into_iter()
        .fold(initial_state(roster, initial_status), |state, event| {
            reduce(&state, event, roster)
        });
    log::debug!(
        "rebuilt state at version {} ({}, top score {})",
        state.version,
        state.status,
        state.top_score
    );
    state
}

/// Replays every event except the last one. Returns the rebuilt state and
/// the event that was dropped.
pub fn undo<'a>(
    roster: &Roster,
    events: &'a [GameEvent],
    initial_status: GameStatus,
) -> GameResult<(GameState, &'a GameEvent)> {
    let (last, rest) = events.split_last().ok_or(GameError::NothingToUndo)?;
    Ok((rebuild(roster, rest, initial_status), last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        constants::MAX_TOTAL_SCORE,
        entities::{Ball, PlayerId},
        events::ScoreEffect,
    };

    fn pot(player: &str, n: u8) -> GameEvent {
        GameEvent::ball_potted(
            Ball::new(n).unwrap(),
            PlayerId::new(player),
            ScoreEffect::Add,
            false,
        )
    }

    #[test]
    fn test_rebuild_empty_log() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let state = rebuild(&roster, &[], GameStatus::Lobby);
        assert_eq!(state, initial_state(&roster, GameStatus::Lobby));
        assert_eq!(state.remaining_total, MAX_TOTAL_SCORE);
    }

    #[test]
    fn test_rebuild_matches_incremental_fold() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let events = vec![
            GameEvent::GameStarted,
            pot("a", 3),
            pot("b", 4),
            GameEvent::WhiteBallPotted {
                player_id: PlayerId::new("c"),
                penalty: 6,
            },
            pot("c", 12),
        ];

        let mut incremental = initial_state(&roster, GameStatus::Lobby);
        for event in &events {
            incremental = reduce(&incremental, event, &roster);
        }

        assert_eq!(rebuild(&roster, &events, GameStatus::Lobby), incremental);
        assert_eq!(incremental.version, 5);
    }

    #[test]
    fn test_undo_drops_last_event() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let events = vec![GameEvent::GameStarted, pot("a", 3), pot("b", 4)];
        let (state, dropped) = undo(&roster, &events, GameStatus::Lobby).unwrap();

        assert_eq!(dropped, &events[2]);
        assert_eq!(state, rebuild(&roster, &events[..2], GameStatus::Lobby));
        assert!(state.remaining_balls.contains(Ball::new(4).unwrap()));
    }

    #[test]
    fn test_undo_start_returns_to_lobby() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let events = vec![GameEvent::GameStarted];
        let (state, _) = undo(&roster, &events, GameStatus::Lobby).unwrap();
        assert_eq!(state.status, GameStatus::Lobby);
    }

    #[test]
    fn test_undo_empty_log() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        assert_eq!(
            undo(&roster, &[], GameStatus::Lobby),
            Err(GameError::NothingToUndo)
        );
    }
}
