//! Pure helpers over the rack: valuation, the active ball, and penalties.

use super::entities::{Ball, GameState, Rack, Score};

/// First ball in pot order that is still on the table, or `None` once the
/// rack is cleared.
#[must_use]
pub fn active_ball(rack: Rack) -> Option<Ball> {
    rack.iter().next()
}

#[must_use]
pub fn remaining_total(rack: Rack) -> Score {
    rack.iter().map(Ball::value).sum()
}

/// Penalty for potting the white ball in `state`.
///
/// Nothing is owed before the first pot of the game; after that the cost is
/// the value of the current active ball, or zero if the table is clear.
#[must_use]
pub fn white_ball_penalty(state: &GameState) -> Score {
    if !state.is_first_ball_potted {
        return 0;
    }
    active_ball(state.remaining_balls).map_or(0, Ball::value)
}

/// Penalty for a foul on `ball`, whether or not it is still on the table.
#[must_use]
pub const fn foul_penalty(ball: Ball) -> Score {
    ball.value()
}
