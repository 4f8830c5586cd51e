//! Elimination and end-of-game evaluation.
//!
//! Runs after every reduction that changes a score. Two end conditions are
//! checked independently on each pass:
//!
//! - **Clinch**: among players still on the roster, nobody trailing the top
//!   score can reach it even by potting every ball left.
//! - **Rack cleared**: no numbered balls remain. Winners are taken from every
//!   scored player, dropped out or not.
//!
//! When both fire on the same pass the rack-cleared winners are kept.

use super::entities::{GameState, GameStatus, PlayerId, PlayerStatus, Roster, Score};

/// Outcome of a successful clinch check.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Clinch {
    pub top_score: Score,
    pub best_challenger_max: Score,
    /// Roster players (not dropped out) sitting on the top score.
    pub winners: Vec<PlayerId>,
}

/// Refreshes every derived field: remaining total, top score, each
/// player's `max_possible`, and elimination status.
#[must_use]
pub fn recompute(mut state: GameState) -> GameState {
    let remaining_total = state.remaining_balls.total();
    let top_score = state.scores.iter().map(|s| s.score).max().unwrap_or(0);

    for player in &mut state.scores {
        player.max_possible = player.score + remaining_total;
        player.status = if player.max_possible < top_score {
            PlayerStatus::Eliminated
        } else {
            PlayerStatus::Active
        };
    }

    state.remaining_total = remaining_total;
    state.top_score = top_score;
    state
}

/// Best `max_possible` among roster players who trail the top score, or
/// `None` if nobody on the roster trails.
#[must_use]
pub fn best_challenger_max(state: &GameState, roster: &Roster) -> Option<Score> {
    state
        .scores
        .iter()
        .filter(|s| !roster.is_dropped_out(&s.player_id))
        .filter(|s| s.score < state.top_score)
        .map(|s| s.max_possible)
        .max()
}

#[must_use]
pub fn clinch(state: &GameState, roster: &Roster) -> Option<Clinch> {
    let best_challenger_max = best_challenger_max(state, roster)?;
    if best_challenger_max >= state.top_score {
        return None;
    }

    let winners = state
        .scores
        .iter()
        .filter(|s| !roster.is_dropped_out(&s.player_id))
        .filter(|s| s.score == state.top_score)
        .map(|s| s.player_id.clone())
        .collect();

    Some(Clinch {
        top_score: state.top_score,
        best_challenger_max,
        winners,
    })
}

/// Applies both end conditions to an already recomputed state.
#[must_use]
pub fn evaluate_end(mut state: GameState, roster: &Roster) -> GameState {
    if let Some(clinch) = clinch(&state, roster) {
        log::debug!(
            "clinched at {} (best challenger {})",
            clinch.top_score,
            clinch.best_challenger_max
        );
        state.status = state.status.advance(GameStatus::Ended);
        state.winners = clinch.winners;
    }

    if state.remaining_balls.is_empty() {
        log::debug!("rack cleared at top score {}", state.top_score);
        state.status = state.status.advance(GameStatus::Ended);
        state.winners = state.leaders();
    }

    state
}

/// [`recompute`] followed by [`evaluate_end`].
#[must_use]
pub fn settle(state: GameState, roster: &Roster) -> GameState {
    evaluate_end(recompute(state), roster)
}
