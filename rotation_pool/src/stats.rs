//! Aggregates over finished games.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::game::{GameState, GameStatus, PlayerId, Score};

/// Short description of a single game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub status: GameStatus,
    pub version: u64,
    pub top_score: Score,
    pub leaders: Vec<PlayerId>,
    pub winners: Vec<PlayerId>,
    pub balls_left: usize,
    pub remaining_total: Score,
}

impl GameSummary {
    #[must_use]
    pub fn from_state(state: &GameState) -> Self {
        Self {
            status: state.status,
            version: state.version,
            top_score: state.top_score,
            leaders: state.leaders(),
            winners: state.winners.clone(),
            balls_left: state.remaining_balls.len(),
            remaining_total: state.remaining_total,
        }
    }
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |ids: &[PlayerId]| {
            ids.iter()
                .map(PlayerId::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "{} after {} events, top score {}, {} balls left ({} points)",
            self.status, self.version, self.top_score, self.balls_left, self.remaining_total
        )?;
        if self.winners.is_empty() {
            write!(f, ", leading: {}", names(&self.leaders))
        } else {
            write!(f, ", winners: {}", names(&self.winners))
        }
    }
}

/// Career numbers for one player. Only ended games count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStatistics {
    pub player_id: PlayerId,
    pub games_played: usize,
    pub wins: usize,
    /// Percentage, rounded to two decimals.
    pub win_rate: f64,
    /// Rounded to two decimals.
    pub average_score: f64,
    pub best_score: Score,
    pub worst_score: Score,
    pub total_points: Score,
}

impl PlayerStatistics {
    #[must_use]
    pub fn compute<'a, I>(player_id: &PlayerId, games: I) -> Self
    where
        I: IntoIterator<Item = &'a GameState>,
    {
        let scores: Vec<(Score, bool)> = games
            .into_iter()
            .filter(|g| g.is_ended())
            .filter_map(|g| {
                g.score_of(player_id)
                    .map(|s| (s.score, g.winners.contains(player_id)))
            })
            .collect();

        let games_played = scores.len();
        let wins = scores.iter().filter(|(_, won)| *won).count();
        let total_points: Score = scores.iter().map(|(score, _)| score).sum();

        let (win_rate, average_score) = if games_played == 0 {
            (0.0, 0.0)
        } else {
            let n = games_played as f64;
            (
                round2(wins as f64 / n * 100.0),
                round2(f64::from(total_points) / n),
            )
        };

        Self {
            player_id: player_id.clone(),
            games_played,
            wins,
            win_rate,
            average_score,
            best_score: scores.iter().map(|(s, _)| *s).max().unwrap_or(0),
            worst_score: scores.iter().map(|(s, _)| *s).min().unwrap_or(0),
            total_points,
        }
    }
}

/// Counts across every known game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverallStatistics {
    /// Ended games
    pub total_games: usize,
    pub active_games: usize,
    pub lobby_games: usize,
    /// Distinct players across all games
    pub total_players: usize,
}

impl OverallStatistics {
    #[must_use]
    pub fn compute<'a, I>(games: I) -> Self
    where
        I: IntoIterator<Item = &'a GameState>,
    {
        let mut stats = Self {
            total_games: 0,
            active_games: 0,
            lobby_games: 0,
            total_players: 0,
        };
        let mut players = HashSet::new();

        for game in games {
            match game.status {
                GameStatus::Lobby => stats.lobby_games += 1,
                GameStatus::Active => stats.active_games += 1,
                GameStatus::Ended => stats.total_games += 1,
            }
            players.extend(game.scores.iter().map(|s| &s.player_id));
        }

        stats.total_players = players.len();
        stats
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
