//! Event log persistence.
//!
//! The log is the source of truth for a game. Records are append-only with a
//! gap-free, 1-based sequence per game; undo is the single exception and
//! removes the newest record. The stored `GameState` is a cache that can
//! always be rebuilt from the log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::game::{GameEvent, GameId, GameState};

/// Event log errors
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum StoreError {
    #[error("event store unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One persisted event with its log metadata.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventRecord {
    pub game_id: GameId,
    /// 1-based position in the game's log.
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub event: GameEvent,
}

/// Storage for game event logs and their cached states.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append `event` to the end of the game's log and return the stored record.
    async fn append(
        &self,
        game_id: GameId,
        event: GameEvent,
        created_by: &str,
    ) -> StoreResult<EventRecord>;

    /// All records for a game, ordered by sequence. Unknown games have an
    /// empty log.
    async fn events(&self, game_id: GameId) -> StoreResult<Vec<EventRecord>>;

    /// Remove and return the newest record, if any.
    async fn remove_last(&self, game_id: GameId) -> StoreResult<Option<EventRecord>>;

    /// Overwrite the cached state for a game.
    async fn save_state(&self, game_id: GameId, state: &GameState) -> StoreResult<()>;

    async fn load_state(&self, game_id: GameId) -> StoreResult<Option<GameState>>;
}

/// Process-local store. States are kept serialized so a cache entry goes
/// through the same encoding a real backing table would.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    logs: RwLock<HashMap<GameId, Vec<EventRecord>>>,
    states: RwLock<HashMap<GameId, serde_json::Value>>,
    unavailable: AtomicBool,
}

impl InMemoryEventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`StoreError::Unavailable`] until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of games with at least one record.
    pub async fn game_count(&self) -> usize {
        self.logs
            .read()
            .await
            .values()
            .filter(|log| !log.is_empty())
            .count()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        game_id: GameId,
        event: GameEvent,
        created_by: &str,
    ) -> StoreResult<EventRecord> {
        self.check_available()?;
        let mut logs = self.logs.write().await;
        let log = logs.entry(game_id).or_default();
        let record = EventRecord {
            game_id,
            sequence: log.len() as u64 + 1,
            created_at: Utc::now(),
            created_by: created_by.to_string(),
            event,
        };
        log.push(record.clone());
        Ok(record)
    }

    async fn events(&self, game_id: GameId) -> StoreResult<Vec<EventRecord>> {
        self.check_available()?;
        Ok(self
            .logs
            .read()
            .await
            .get(&game_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_last(&self, game_id: GameId) -> StoreResult<Option<EventRecord>> {
        self.check_available()?;
        Ok(self
            .logs
            .write()
            .await
            .get_mut(&game_id)
            .and_then(Vec::pop))
    }

    async fn save_state(&self, game_id: GameId, state: &GameState) -> StoreResult<()> {
        self.check_available()?;
        let value = serde_json::to_value(state)?;
        self.states.write().await.insert(game_id, value);
        Ok(())
    }

    async fn load_state(&self, game_id: GameId) -> StoreResult<Option<GameState>> {
        self.check_available()?;
        let states = self.states.read().await;
        match states.get(&game_id) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }
}
