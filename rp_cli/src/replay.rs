//! Loading an event log and rendering the rebuilt game.

use chrono::Utc;
use serde::Deserialize;

use rotation_pool::{
    EventRecord, GameError, GameEvent, GameId, GameState, GameStatus, PlayerId, Roster,
    export::{self, GameExport},
    game,
    stats::GameSummary,
};

use crate::config::{OutputFormat, ReplayConfig};

/// Accepted input shapes: stored records (as written by an event store) or
/// bare events.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LogFile {
    Records(Vec<EventRecord>),
    Events(Vec<GameEvent>),
}

/// A rebuilt game ready to render
#[derive(Debug)]
pub struct Replay {
    pub game_id: GameId,
    pub roster: Roster,
    pub records: Vec<EventRecord>,
    pub state: GameState,
    pub undone: Vec<GameEvent>,
}

impl Replay {
    /// Parse `json`, drop `config.undo` trailing events, and rebuild.
    pub fn from_json(json: &str, config: &ReplayConfig) -> anyhow::Result<Self> {
        let roster = build_roster(config)?;

        let mut records = match serde_json::from_str::<LogFile>(json)? {
            LogFile::Records(records) => records,
            LogFile::Events(events) => events
                .into_iter()
                .enumerate()
                .map(|(idx, event)| EventRecord {
                    game_id: config.game_id,
                    sequence: idx as u64 + 1,
                    created_at: Utc::now(),
                    created_by: config.game.created_by.clone(),
                    event,
                })
                .collect(),
        };

        let mut undone = Vec::with_capacity(config.undo);
        for _ in 0..config.undo {
            let record = records.pop().ok_or(GameError::NothingToUndo)?;
            log::info!("Undid #{} {}", record.sequence, record.event);
            undone.push(record.event);
        }

        let state = game::rebuild(
            &roster,
            records.iter().map(|r| &r.event),
            GameStatus::Lobby,
        );

        Ok(Self {
            game_id: config.game_id,
            roster,
            records,
            state,
            undone,
        })
    }

    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        Ok(match format {
            OutputFormat::Json => {
                GameExport::build(self.game_id, &self.roster, &self.state, &self.records)
                    .to_json()?
            }
            OutputFormat::Csv => export::to_csv(&self.roster, &self.state),
            OutputFormat::Summary => self.summary_text(),
        })
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary::from_state(&self.state)
    }

    fn summary_text(&self) -> String {
        let mut lines = vec![format!("Game {}: {}", self.game_id, self.summary())];
        if let Some(ball) = self.state.active_ball() {
            lines.push(format!("Active ball: {ball}"));
        }
        for row in export::final_scores(&self.roster, &self.state) {
            let dropped = if self.roster.is_dropped_out(&row.player_id) {
                " (dropped out)"
            } else {
                ""
            };
            lines.push(format!(
                "  {:<16} {:>5}  max {:>4}  {}{}",
                row.player_name, row.score, row.max_possible, row.status, dropped
            ));
        }
        lines.join("\n") + "\n"
    }
}

/// Roster from `--players` with `--dropped` marked, checked against the
/// configured limits.
pub fn build_roster(config: &ReplayConfig) -> Result<Roster, GameError> {
    let mut roster = Roster::from_ids(&config.players);
    roster.validate(config.game.min_players, config.game.max_players)?;
    for id in &config.dropped {
        roster.mark_dropped_out(&PlayerId::new(id))?;
    }
    Ok(roster)
}
