//! The state reducer: `(state, event, roster) -> state'`.
//!
//! Reduction is pure. It never touches its input, never fails, and builds
//! each successor from the parts of the previous state it keeps. Validation
//! happens before an event exists (see [`commands`](super::commands)); a
//! malformed event is applied as written rather than corrected here.

use super::{
    entities::{GameState, GameStatus, PlayerId, PlayerScore, Rack, Roster, Score},
    events::GameEvent,
    constants::MAX_TOTAL_SCORE,
    standings,
};

/// Folds one event into `state`.
///
/// `roster` is only consulted for drop-out status during the clinch check.
#[must_use]
pub fn reduce(state: &GameState, event: &GameEvent, roster: &Roster) -> GameState {
    let version = state.version + 1;

    match event {
        GameEvent::GameStarted => GameState {
            status: state.status.advance(GameStatus::Active),
            version,
            ..state.clone()
        },

        GameEvent::BallPotted {
            ball,
            player_id,
            score_delta,
            ..
        } => {
            // The ball leaves the table whatever the sign of the delta.
            let scores = adjust_score(&state.scores, player_id, *score_delta);
            let next = successor(
                state,
                scores,
                state.remaining_balls.without(*ball),
                true,
                version,
            );
            standings::settle(next, roster)
        }

        GameEvent::WhiteBallPotted { player_id, penalty } => {
            if *penalty > 0 {
                let scores = adjust_score(&state.scores, player_id, -penalty);
                let next = successor(state, scores, state.remaining_balls, true, version);
                standings::settle(next, roster)
            } else {
                GameState {
                    is_first_ball_potted: true,
                    version,
                    ..state.clone()
                }
            }
        }

        GameEvent::FoulCommitted {
            player_id, penalty, ..
        } => {
            // The fouled ball stays on the table.
            let scores = adjust_score(&state.scores, player_id, -penalty);
            let next = successor(
                state,
                scores,
                state.remaining_balls,
                state.is_first_ball_potted,
                version,
            );
            standings::settle(next, roster)
        }

        GameEvent::GameEnded { winners, .. } | GameEvent::GameClinched { winners, .. } => {
            GameState {
                status: state.status.advance(GameStatus::Ended),
                winners: winners.clone(),
                version,
                ..state.clone()
            }
        }
    }
}

/// Scores with `delta` applied to `player_id`. Other players are carried
/// over untouched.
fn adjust_score(scores: &[PlayerScore], player_id: &PlayerId, delta: Score) -> Vec<PlayerScore> {
    scores
        .iter()
        .map(|s| {
            if &s.player_id == player_id {
                let score = s.score + delta;
                PlayerScore {
                    score,
                    hit_max: s.hit_max || score >= MAX_TOTAL_SCORE,
                    ..s.clone()
                }
            } else {
                s.clone()
            }
        })
        .collect()
}

/// Next state before derived fields are refreshed by [`standings::settle`].
fn successor(
    state: &GameState,
    scores: Vec<PlayerScore>,
    remaining_balls: Rack,
    is_first_ball_potted: bool,
    version: u64,
) -> GameState {
    GameState {
        scores,
        remaining_balls,
        remaining_total: remaining_balls.total(),
        top_score: state.top_score,
        winners: state.winners.clone(),
        status: state.status,
        is_first_ball_potted,
        version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        entities::{Ball, PlayerStatus},
        events::{EndReason, ScoreEffect},
    };

    fn ball(n: u8) -> Ball {
        Ball::new(n).unwrap()
    }

    fn pid(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    fn started(roster: &Roster) -> GameState {
        reduce(
            &GameState::new(roster, GameStatus::Lobby),
            &GameEvent::GameStarted,
            roster,
        )
    }

    fn with_scores(roster: &Roster, scores: &[Score], rack: &[u8]) -> GameState {
        let mut state = started(roster);
        for (player, score) in state.scores.iter_mut().zip(scores) {
            player.score = *score;
        }
        state.remaining_balls = Rack::try_from(rack.to_vec()).unwrap();
        state.is_first_ball_potted = true;
        standings::recompute(state)
    }

    fn pot(player: &str, n: u8) -> GameEvent {
        GameEvent::ball_potted(ball(n), pid(player), ScoreEffect::Add, false)
    }

    #[test]
    fn test_game_started_activates() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let state = started(&roster);
        assert_eq!(state.status, GameStatus::Active);
        assert_eq!(state.version, 1);
        assert_eq!(state.remaining_total, MAX_TOTAL_SCORE);
    }

    #[test]
    fn test_ball_potted_scores_and_removes_ball() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let state = reduce(&started(&roster), &pot("a", 3), &roster);

        assert!(state.is_first_ball_potted);
        assert_eq!(state.score_of(&pid("a")).unwrap().score, 6);
        assert!(!state.remaining_balls.contains(ball(3)));
        assert_eq!(state.remaining_total, MAX_TOTAL_SCORE - 6);
        assert_eq!(state.top_score, 6);
        assert!(
            state
                .scores
                .iter()
                .all(|s| s.max_possible == s.score + state.remaining_total)
        );
        assert_eq!(state.active_ball(), Some(ball(4)));
    }

    #[test]
    fn test_negative_pot_still_removes_ball() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let event = GameEvent::ball_potted(ball(9), pid("b"), ScoreEffect::Subtract, true);
        let state = reduce(&started(&roster), &event, &roster);
        assert_eq!(state.score_of(&pid("b")).unwrap().score, -9);
        assert!(!state.remaining_balls.contains(ball(9)));
        assert_eq!(state.top_score, 0);
    }

    #[test]
    fn test_out_of_order_flag_does_not_change_scoring() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let base = started(&roster);
        let in_order = GameEvent::ball_potted(ball(11), pid("a"), ScoreEffect::Add, false);
        let out_of_order = GameEvent::ball_potted(ball(11), pid("a"), ScoreEffect::Add, true);
        assert_eq!(
            reduce(&base, &in_order, &roster),
            reduce(&base, &out_of_order, &roster)
        );
    }

    #[test]
    fn test_reduce_leaves_input_untouched() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let base = started(&roster);
        let snapshot = base.clone();
        let _ = reduce(&base, &pot("a", 3), &roster);
        assert_eq!(base, snapshot);
    }

    #[test]
    fn test_white_ball_without_penalty() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let base = started(&roster);
        let state = reduce(
            &base,
            &GameEvent::WhiteBallPotted {
                player_id: pid("a"),
                penalty: 0,
            },
            &roster,
        );
        assert!(state.is_first_ball_potted);
        assert_eq!(state.scores, base.scores);
        assert_eq!(state.remaining_balls, base.remaining_balls);
    }

    #[test]
    fn test_white_ball_penalty_applied() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let state = reduce(&started(&roster), &pot("a", 3), &roster);
        let state = reduce(
            &state,
            &GameEvent::WhiteBallPotted {
                player_id: pid("b"),
                penalty: 6,
            },
            &roster,
        );
        assert_eq!(state.score_of(&pid("b")).unwrap().score, -6);
        assert_eq!(state.remaining_balls.len(), 14);
        assert!(!state.remaining_balls.contains(Ball::WHITE));
    }

    #[test]
    fn test_foul_keeps_ball_on_table() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let state = with_scores(&roster, &[20, 0, 0], &[7, 8, 9, 1, 2]);
        let state = reduce(
            &state,
            &GameEvent::FoulCommitted {
                player_id: pid("a"),
                ball: ball(7),
                penalty: 7,
            },
            &roster,
        );
        assert_eq!(state.score_of(&pid("a")).unwrap().score, 13);
        assert!(state.remaining_balls.contains(ball(7)));
        assert_eq!(state.active_ball(), Some(ball(7)));
    }

    #[test]
    fn test_pot_triggers_clinch() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let state = with_scores(&roster, &[25, 10, 5], &[12, 15]);
        assert_eq!(state.status, GameStatus::Active);

        let state = reduce(&state, &pot("a", 15), &roster);
        assert_eq!(state.top_score, 40);
        assert_eq!(state.remaining_total, 12);
        assert_eq!(state.status, GameStatus::Ended);
        assert_eq!(state.winners, vec![pid("a")]);
        assert_eq!(state.scores[1].status, PlayerStatus::Eliminated);
    }

    #[test]
    fn test_last_ball_ends_game() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let state = with_scores(&roster, &[30, 28, 20], &[2]);
        let state = reduce(&state, &pot("b", 2), &roster);
        assert!(state.remaining_balls.is_empty());
        assert_eq!(state.remaining_total, 0);
        assert_eq!(state.status, GameStatus::Ended);
        assert_eq!(state.winners, vec![pid("b")]);
    }

    #[test]
    fn test_foul_can_trigger_clinch() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        // b can reach exactly 40 until the foul.
        let state = with_scores(&roster, &[40, 28, 5], &[12]);
        assert_eq!(state.status, GameStatus::Active);
        let state = reduce(
            &state,
            &GameEvent::FoulCommitted {
                player_id: pid("b"),
                ball: ball(12),
                penalty: 12,
            },
            &roster,
        );
        assert_eq!(state.status, GameStatus::Ended);
        assert_eq!(state.winners, vec![pid("a")]);
    }

    #[test]
    fn test_hit_max_is_informational() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let state = with_scores(&roster, &[150, -20, -30], &[8, 1, 2]);
        let state = reduce(&state, &pot("a", 8), &roster);
        let a = state.score_of(&pid("a")).unwrap();
        assert_eq!(a.score, 158);
        assert!(a.hit_max);
    }

    #[test]
    fn test_end_events_carry_winners() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let state = with_scores(&roster, &[10, 10, 4], &[9, 1, 2]);
        let state = reduce(
            &state,
            &GameEvent::GameEnded {
                reason: EndReason::Manual,
                top_score: 10,
                winners: vec![pid("a"), pid("b")],
            },
            &roster,
        );
        assert_eq!(state.status, GameStatus::Ended);
        assert_eq!(state.winners, vec![pid("a"), pid("b")]);
        assert_eq!(state.remaining_balls.len(), 3);
    }

    #[test]
    fn test_game_started_never_reopens_ended_game() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let mut state = started(&roster);
        state.status = GameStatus::Ended;
        let state = reduce(&state, &GameEvent::GameStarted, &roster);
        assert_eq!(state.status, GameStatus::Ended);
    }

    #[test]
    fn test_already_potted_ball_is_not_corrected() {
        let roster = Roster::from_ids(["a", "b", "c"]);
        let state = reduce(&started(&roster), &pot("a", 3), &roster);
        // Precondition violated on purpose: ball 3 is already gone.
        let state = reduce(&state, &pot("b", 3), &roster);
        assert_eq!(state.score_of(&pid("b")).unwrap().score, 6);
        assert_eq!(state.remaining_total, MAX_TOTAL_SCORE - 6);
    }
}
