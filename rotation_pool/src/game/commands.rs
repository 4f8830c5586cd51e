//! Request validation and event construction.
//!
//! Every check in the error taxonomy runs here, before an event is written
//! to the log. Functions take the current state and roster by reference and
//! hand back the event to append.

use super::{
    entities::{Ball, GameState, GameStatus, PlayerId, Roster},
    errors::{GameError, GameResult},
    events::{EndReason, GameEvent, ScoreEffect},
    functional::{foul_penalty, white_ball_penalty},
    standings,
};

pub fn start_game(state: &GameState) -> GameResult<GameEvent> {
    if state.status != GameStatus::Lobby {
        return Err(GameError::GameAlreadyStarted);
    }
    Ok(GameEvent::GameStarted)
}

/// Builds the event for a pot of ball `number` by `player_id`.
///
/// Ball 0 becomes a `WhiteBallPotted` carrying the current white-ball
/// penalty; `effect` is ignored for it. Any other ball must still be on the
/// table and is flagged out of order when it is not the active ball.
pub fn pot_ball(
    state: &GameState,
    roster: &Roster,
    player_id: &PlayerId,
    number: u8,
    effect: ScoreEffect,
) -> GameResult<GameEvent> {
    let ball = Ball::new(number)?;
    ensure_active(state)?;
    ensure_player(state, roster, player_id)?;

    if ball.is_white() {
        return Ok(GameEvent::WhiteBallPotted {
            player_id: player_id.clone(),
            penalty: white_ball_penalty(state),
        });
    }

    if !state.remaining_balls.contains(ball) {
        return Err(GameError::BallAlreadyPotted(number));
    }

    let out_of_order = state.active_ball() != Some(ball);
    Ok(GameEvent::ball_potted(
        ball,
        player_id.clone(),
        effect,
        out_of_order,
    ))
}

/// Builds a foul on ball `number`. The ball does not need to be on the
/// table; the penalty is its value either way.
pub fn commit_foul(
    state: &GameState,
    roster: &Roster,
    player_id: &PlayerId,
    number: u8,
) -> GameResult<GameEvent> {
    let ball = Ball::new(number)?;
    ensure_active(state)?;
    ensure_player(state, roster, player_id)?;

    Ok(GameEvent::FoulCommitted {
        player_id: player_id.clone(),
        ball,
        penalty: foul_penalty(ball),
    })
}

/// Scorekeeper ends the game by hand. Everyone on the top score wins.
pub fn end_game(state: &GameState) -> GameResult<GameEvent> {
    ensure_active(state)?;
    Ok(GameEvent::GameEnded {
        reason: EndReason::Manual,
        top_score: state.top_score,
        winners: state.leaders(),
    })
}

/// Marker to append after `event` took `before` to `after`, when that
/// reduction ended the game on its own.
///
/// Returns `None` unless `before` was still running, `after` has ended, and
/// `event` is not itself an end-of-game event.
#[must_use]
pub fn terminal_event(
    before: &GameState,
    event: &GameEvent,
    after: &GameState,
    roster: &Roster,
) -> Option<GameEvent> {
    if event.is_terminal() || before.is_ended() || !after.is_ended() {
        return None;
    }

    if after.remaining_balls.is_empty() {
        return Some(GameEvent::GameEnded {
            reason: EndReason::RackCleared,
            top_score: after.top_score,
            winners: after.winners.clone(),
        });
    }

    Some(GameEvent::GameClinched {
        top_score: after.top_score,
        best_challenger_max: standings::best_challenger_max(after, roster),
        remaining_balls: after.remaining_balls,
        winners: after.winners.clone(),
    })
}

fn ensure_active(state: &GameState) -> GameResult<()> {
    if !state.is_active() {
        return Err(GameError::GameNotActive {
            status: state.status,
        });
    }
    Ok(())
}

fn ensure_player(state: &GameState, roster: &Roster, player_id: &PlayerId) -> GameResult<()> {
    if state.score_of(player_id).is_none() {
        return Err(GameError::UnknownPlayer(player_id.clone()));
    }
    if roster.is_dropped_out(player_id) {
        return Err(GameError::InactivePlayer(player_id.clone()));
    }
    Ok(())
}
