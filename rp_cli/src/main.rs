//! Replay tool for rotation pool event logs.
//!
//! Rebuilds a game from its event log, optionally undoing trailing events,
//! and prints it as JSON, CSV, or a text summary.

mod config;
mod logging;
mod replay;

use anyhow::{Context, Error};
use log::info;
use pico_args::Arguments;

use config::ReplayConfig;
use replay::Replay;

const HELP: &str = "\
Rebuild a rotation pool game from its event log

USAGE:
  rp_cli --events FILE --players IDS [OPTIONS]

OPTIONS:
  --events     FILE        JSON event log (records or bare events)  [default: env RP_EVENTS_FILE]
  --players    IDS         Comma-separated player ids in turn order
  --dropped    IDS         Comma-separated ids of players who dropped out
  --undo       N           Undo the last N events before rendering  [default: 0]
  --format     FORMAT      json, csv or summary  [default: env RP_OUTPUT_FORMAT or summary]
  --game-id    UUID        Game id used for exports  [default: random]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  RUST_LOG                 Log filter (e.g., debug, rotation_pool=debug)
  RP_MIN_PLAYERS           Smallest allowed roster  [default: 3]
  RP_MAX_PLAYERS           Largest allowed roster  [default: 12]
  RP_CREATED_BY            Author recorded on bare events  [default: scorekeeper]
";

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let config = ReplayConfig::from_args(&mut pargs)?;
    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {:?}", remaining);
    }

    logging::init();
    info!(
        "Replaying {} for {} players",
        config.events.display(),
        config.players.len()
    );

    let json = std::fs::read_to_string(&config.events)
        .with_context(|| format!("Failed to read {}", config.events.display()))?;
    let replay = Replay::from_json(&json, &config)?;

    logging::log_replay_summary(
        replay.game_id,
        replay.records.len(),
        replay.undone.len(),
        &replay.summary(),
    );

    print!("{}", replay.render(config.format)?);
    Ok(())
}
