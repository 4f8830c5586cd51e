//! Replay tool configuration.
//!
//! Consolidates command-line flags and environment variable reads into one
//! validated configuration.

use std::{fmt, path::PathBuf, str::FromStr};

use pico_args::Arguments;
use rotation_pool::session::GameConfig;
use uuid::Uuid;

/// How the rebuilt game is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Summary,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "summary" => Ok(OutputFormat::Summary),
            other => Err(ConfigError::Invalid {
                var: "--format".to_string(),
                reason: format!("Unknown format '{other}' (expected json, csv or summary)"),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Summary => write!(f, "summary"),
        }
    }
}

/// Complete replay configuration
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// JSON file holding the event log
    pub events: PathBuf,
    /// Player ids in turn order
    pub players: Vec<String>,
    /// Players who have dropped out
    pub dropped: Vec<String>,
    /// Trailing events to undo before rendering
    pub undo: usize,
    pub format: OutputFormat,
    pub game_id: Uuid,
    /// Roster limits and `created_by`
    pub game: GameConfig,
}

impl ReplayConfig {
    /// Load configuration from command-line arguments, falling back to
    /// environment variables
    ///
    /// # Errors
    ///
    /// Returns error if required values are missing or invalid
    pub fn from_args(pargs: &mut Arguments) -> Result<Self, ConfigError> {
        let events = opt_value::<String>(pargs, "--events")?
            .or_else(|| std::env::var("RP_EVENTS_FILE").ok())
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "--events".to_string(),
                hint: "Pass a JSON event log or set RP_EVENTS_FILE".to_string(),
            })?;

        let players = opt_value::<String>(pargs, "--players")?
            .map(|s| split_list(&s))
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "--players".to_string(),
                hint: "Comma-separated player ids in turn order, e.g. ann,bob,cy".to_string(),
            })?;

        let dropped = opt_value::<String>(pargs, "--dropped")?
            .map(|s| split_list(&s))
            .unwrap_or_default();

        let undo = opt_value(pargs, "--undo")?.unwrap_or(0);

        let format = match opt_value::<String>(pargs, "--format")?
            .or_else(|| std::env::var("RP_OUTPUT_FORMAT").ok())
        {
            Some(s) => s.parse()?,
            None => OutputFormat::Summary,
        };

        let game_id = opt_value(pargs, "--game-id")?.unwrap_or_else(Uuid::new_v4);

        let config = Self {
            events,
            players,
            dropped,
            undo,
            format,
            game_id,
            game: GameConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate().map_err(|reason| ConfigError::Invalid {
            var: "RP_*".to_string(),
            reason,
        })?;

        if let Some(unknown) = self.dropped.iter().find(|d| !self.players.contains(d)) {
            return Err(ConfigError::Invalid {
                var: "--dropped".to_string(),
                reason: format!("'{unknown}' is not in --players"),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required argument: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn opt_value<T>(pargs: &mut Arguments, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    pargs
        .opt_value_from_str(key)
        .map_err(|e| ConfigError::Invalid {
            var: key.to_string(),
            reason: e.to_string(),
        })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
