//! Structured logging configuration.
//!
//! Log records from the `rotation_pool` library go through the `log` facade
//! and are picked up by the tracing subscriber installed here.

use rotation_pool::{GameId, GameStatus, stats::GameSummary};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr
///
/// Levels are configurable via the RUST_LOG env var and default to `info`.
/// Output goes to stderr so rendered games on stdout stay clean.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Log the outcome of a replay with structured fields
pub fn log_replay_summary(game_id: GameId, events: usize, undone: usize, summary: &GameSummary) {
    tracing::info!(
        game_id = %game_id,
        events = events,
        undone = undone,
        status = %summary.status,
        top_score = summary.top_score,
        balls_left = summary.balls_left,
        "Replay complete"
    );

    if undone > 0 && summary.status == GameStatus::Lobby {
        tracing::warn!(game_id = %game_id, "Undo reached the start of the game");
    }
}
