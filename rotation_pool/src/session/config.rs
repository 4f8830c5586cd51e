//! Game session configuration.

use serde::{Deserialize, Serialize};
use std::env;

use crate::game::constants::{DEFAULT_MAX_PLAYERS, MIN_PLAYERS};

/// Settings shared by every game a [`GameManager`](super::GameManager) runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Smallest roster a game may start with (default: 3)
    pub min_players: usize,

    /// Largest roster a game may start with (default: 12)
    pub max_players: usize,

    /// Capacity of each game actor's message inbox
    pub inbox_capacity: usize,

    /// Capacity of each subscriber's update channel
    pub subscriber_capacity: usize,

    /// Recorded as `created_by` on every event the session writes
    pub created_by: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: MIN_PLAYERS,
            max_players: DEFAULT_MAX_PLAYERS,
            inbox_capacity: 100,
            subscriber_capacity: 32,
            created_by: "scorekeeper".to_string(),
        }
    }
}

impl GameConfig {
    /// Build from `RP_*` environment variables. Missing or unparsable
    /// values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_players: env_or("RP_MIN_PLAYERS", defaults.min_players),
            max_players: env_or("RP_MAX_PLAYERS", defaults.max_players),
            inbox_capacity: env_or("RP_INBOX_CAPACITY", defaults.inbox_capacity),
            subscriber_capacity: env_or("RP_SUBSCRIBER_CAPACITY", defaults.subscriber_capacity),
            created_by: env::var("RP_CREATED_BY")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.created_by),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_players < MIN_PLAYERS {
            return Err(format!("Min players must be at least {MIN_PLAYERS}"));
        }

        if self.max_players < self.min_players {
            return Err("Max players must not be less than min players".to_string());
        }

        if self.inbox_capacity == 0 {
            return Err("Inbox capacity must be greater than zero".to_string());
        }

        if self.subscriber_capacity == 0 {
            return Err("Subscriber capacity must be greater than zero".to_string());
        }

        if self.created_by.trim().is_empty() {
            return Err("Created-by must not be empty".to_string());
        }

        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {key}={raw:?}");
            default
        }),
        Err(_) => default,
    }
}
