//! JSON and CSV renderings of a game. Read-only; no scoring happens here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

use crate::{
    game::{GameEvent, GameId, GameState, GameStatus, PlayerId, PlayerStatus, Roster, Score},
    store::EventRecord,
};

const CSV_HEADER: &str = "Player ID,Player Name,Score,Status,Max Possible";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedPlayer {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedGame {
    pub id: GameId,
    pub status: GameStatus,
    pub players: Vec<ExportedPlayer>,
    pub winners: Vec<ExportedPlayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalScore {
    pub player_id: PlayerId,
    pub player_name: String,
    pub score: Score,
    pub status: PlayerStatus,
    pub max_possible: Score,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedEvent {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub event: GameEvent,
}

/// Everything known about a game, ready to serialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameExport {
    pub game: ExportedGame,
    pub final_scores: Vec<FinalScore>,
    pub events: Vec<ExportedEvent>,
}

impl GameExport {
    #[must_use]
    pub fn build(
        game_id: GameId,
        roster: &Roster,
        state: &GameState,
        records: &[EventRecord],
    ) -> Self {
        let player = |id: &PlayerId| ExportedPlayer {
            id: id.clone(),
            name: display_name(roster, id),
        };

        Self {
            game: ExportedGame {
                id: game_id,
                status: state.status,
                players: roster.iter().map(|e| player(&e.player_id)).collect(),
                winners: state.winners.iter().map(player).collect(),
            },
            final_scores: final_scores(roster, state),
            events: records
                .iter()
                .map(|r| ExportedEvent {
                    sequence: r.sequence,
                    timestamp: r.created_at,
                    event: r.event.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One row per scored player, in roster order.
#[must_use]
pub fn final_scores(roster: &Roster, state: &GameState) -> Vec<FinalScore> {
    state
        .scores
        .iter()
        .map(|s| FinalScore {
            player_id: s.player_id.clone(),
            player_name: display_name(roster, &s.player_id),
            score: s.score,
            status: s.status,
            max_possible: s.max_possible,
        })
        .collect()
}

/// Score table as CSV. Names are always quoted.
#[must_use]
pub fn to_csv(roster: &Roster, state: &GameState) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for row in final_scores(roster, state) {
        // Writing into a String cannot fail.
        let _ = writeln!(
            csv,
            "{},{},{},{},{}",
            row.player_id,
            quote(&row.player_name),
            row.score,
            row.status,
            row.max_possible
        );
    }
    csv
}

#[must_use]
pub fn csv_file_name(game_id: GameId) -> String {
    format!("game-{game_id}.csv")
}

fn display_name(roster: &Roster, player_id: &PlayerId) -> String {
    roster
        .get(player_id)
        .map_or_else(|| player_id.to_string(), |e| e.name.clone())
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
