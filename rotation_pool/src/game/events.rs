//! Immutable scoring events. A game's state is the fold of its events.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    entities::{Ball, PlayerId, Rack, Score},
    errors::GameError,
};

/// Whether a pot adds its value to the player or takes it away.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum ScoreEffect {
    Add,
    Subtract,
}

impl ScoreEffect {
    #[must_use]
    pub const fn sign(self) -> Score {
        match self {
            ScoreEffect::Add => 1,
            ScoreEffect::Subtract => -1,
        }
    }
}

impl TryFrom<i8> for ScoreEffect {
    type Error = GameError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ScoreEffect::Add),
            -1 => Ok(ScoreEffect::Subtract),
            other => Err(GameError::InvalidScoreEffect(other)),
        }
    }
}

impl From<ScoreEffect> for i8 {
    fn from(effect: ScoreEffect) -> Self {
        match effect {
            ScoreEffect::Add => 1,
            ScoreEffect::Subtract => -1,
        }
    }
}

/// Why a `GameEnded` event was written.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The scorekeeper closed the game by hand.
    Manual,
    /// The last numbered ball left the table.
    RackCleared,
}

/// Events that make up a game's history
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GameStarted,
    BallPotted {
        ball: Ball,
        ball_value: Score,
        player_id: PlayerId,
        score_effect: ScoreEffect,
        /// `ball_value * score_effect`
        score_delta: Score,
        /// The ball was not the active ball when potted. Audit only.
        out_of_order: bool,
    },
    WhiteBallPotted {
        player_id: PlayerId,
        penalty: Score,
    },
    FoulCommitted {
        player_id: PlayerId,
        ball: Ball,
        penalty: Score,
    },
    GameEnded {
        reason: EndReason,
        top_score: Score,
        winners: Vec<PlayerId>,
    },
    GameClinched {
        top_score: Score,
        /// Best `maxPossible` among trailing players, if there were any.
        best_challenger_max: Option<Score>,
        remaining_balls: Rack,
        winners: Vec<PlayerId>,
    },
}

impl GameEvent {
    #[must_use]
    pub fn ball_potted(
        ball: Ball,
        player_id: PlayerId,
        score_effect: ScoreEffect,
        out_of_order: bool,
    ) -> Self {
        let ball_value = ball.value();
        GameEvent::BallPotted {
            ball,
            ball_value,
            player_id,
            score_effect,
            score_delta: ball_value * score_effect.sign(),
            out_of_order,
        }
    }

    /// Player the event is charged to, if any.
    #[must_use]
    pub fn player_id(&self) -> Option<&PlayerId> {
        match self {
            GameEvent::BallPotted { player_id, .. }
            | GameEvent::WhiteBallPotted { player_id, .. }
            | GameEvent::FoulCommitted { player_id, .. } => Some(player_id),
            GameEvent::GameStarted
            | GameEvent::GameEnded { .. }
            | GameEvent::GameClinched { .. } => None,
        }
    }

    /// Pots and fouls; the events only accepted while a game is active.
    #[must_use]
    pub fn is_scoring(&self) -> bool {
        self.player_id().is_some()
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameEvent::GameEnded { .. } | GameEvent::GameClinched { .. }
        )
    }

    /// Stable name of the variant, matching its serialized tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            GameEvent::GameStarted => "game_started",
            GameEvent::BallPotted { .. } => "ball_potted",
            GameEvent::WhiteBallPotted { .. } => "white_ball_potted",
            GameEvent::FoulCommitted { .. } => "foul_committed",
            GameEvent::GameEnded { .. } => "game_ended",
            GameEvent::GameClinched { .. } => "game_clinched",
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            GameEvent::GameStarted => "game started".to_string(),
            GameEvent::BallPotted {
                ball,
                player_id,
                score_delta,
                out_of_order,
                ..
            } => {
                let order = if *out_of_order { " out of order" } else { "" };
                format!("{player_id} potted {ball}{order} ({score_delta:+})")
            }
            GameEvent::WhiteBallPotted { player_id, penalty } => {
                format!("{player_id} potted the white (-{penalty})")
            }
            GameEvent::FoulCommitted {
                player_id,
                ball,
                penalty,
            } => format!("{player_id} fouled on {ball} (-{penalty})"),
            GameEvent::GameEnded {
                reason, top_score, ..
            } => match reason {
                EndReason::Manual => format!("game ended by scorekeeper at {top_score}"),
                EndReason::RackCleared => format!("rack cleared, top score {top_score}"),
            },
            GameEvent::GameClinched {
                top_score,
                remaining_balls,
                ..
            } => format!(
                "game clinched at {top_score} with {} balls left",
                remaining_balls.len()
            ),
        };
        write!(f, "{repr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ball_potted_computes_delta() {
        let event = GameEvent::ball_potted(
            Ball::new(2).unwrap(),
            PlayerId::new("ann"),
            ScoreEffect::Subtract,
            true,
        );
        match event {
            GameEvent::BallPotted {
                ball_value,
                score_delta,
                ..
            } => {
                assert_eq!(ball_value, 17);
                assert_eq!(score_delta, -17);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_score_effect_parsing() {
        assert_eq!(ScoreEffect::try_from(1i8), Ok(ScoreEffect::Add));
        assert_eq!(ScoreEffect::try_from(-1i8), Ok(ScoreEffect::Subtract));
        assert_eq!(
            ScoreEffect::try_from(0i8),
            Err(GameError::InvalidScoreEffect(0))
        );
    }

    #[test]
    fn test_event_json_shape() {
        let event = GameEvent::ball_potted(
            Ball::new(9).unwrap(),
            PlayerId::new("bob"),
            ScoreEffect::Add,
            false,
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ball_potted");
        assert_eq!(json["ball"], 9);
        assert_eq!(json["score_effect"], 1);
        assert_eq!(json["score_delta"], 9);

        let started = serde_json::to_value(GameEvent::GameStarted).unwrap();
        assert_eq!(started["type"], "game_started");
    }

    #[test]
    fn test_event_rejects_bad_ball() {
        let json = r#"{"type":"foul_committed","player_id":"a","ball":22,"penalty":3}"#;
        assert!(serde_json::from_str::<GameEvent>(json).is_err());
    }

    #[test]
    fn test_kind_matches_tag() {
        let event = GameEvent::WhiteBallPotted {
            player_id: PlayerId::new("a"),
            penalty: 6,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
        assert!(event.is_scoring());
        assert!(!event.is_terminal());
    }

    #[test]
    fn test_display() {
        let event = GameEvent::FoulCommitted {
            player_id: PlayerId::new("cy"),
            ball: Ball::new(7).unwrap(),
            penalty: 7,
        };
        assert_eq!(event.to_string(), "cy fouled on #7 (-7)");
    }
}
