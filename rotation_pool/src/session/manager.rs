//! Game manager for spawning and tracking game actors.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    actor::{GameActor, GameHandle},
    config::GameConfig,
    errors::{SessionError, SessionResult},
};
use crate::{
    game::{GameId, Roster},
    store::EventStore,
};

/// Owns the handles of every running game
pub struct GameManager {
    config: GameConfig,

    store: Arc<dyn EventStore>,

    /// Running game handles
    games: Arc<RwLock<HashMap<GameId, GameHandle>>>,
}

impl GameManager {
    /// Fails with [`SessionError::Config`] if `config` does not validate.
    pub fn new(config: GameConfig, store: Arc<dyn EventStore>) -> SessionResult<Self> {
        config.validate().map_err(SessionError::Config)?;
        Ok(Self {
            config,
            store,
            games: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Validate `roster` and spawn a new game in the lobby.
    pub async fn create_game(&self, roster: Roster) -> SessionResult<GameHandle> {
        roster.validate(self.config.min_players, self.config.max_players)?;

        let game_id = Uuid::new_v4();
        let (actor, handle) =
            GameActor::new(game_id, roster, self.config.clone(), self.store.clone());
        self.spawn(actor, handle.clone()).await;

        log::info!("Created game {}", game_id);
        Ok(handle)
    }

    /// Respawn a game from its stored log. `roster` must be the roster the
    /// log was written against.
    pub async fn restore_game(&self, game_id: GameId, roster: Roster) -> SessionResult<GameHandle> {
        if let Some(handle) = self.get_game(game_id).await {
            return Ok(handle);
        }

        roster.validate(self.config.min_players, self.config.max_players)?;
        if self.store.events(game_id).await?.is_empty() {
            return Err(SessionError::GameNotFound(game_id));
        }

        let (actor, handle) =
            GameActor::restore(game_id, roster, self.config.clone(), self.store.clone()).await?;
        self.spawn(actor, handle.clone()).await;

        log::info!("Restored game {}", game_id);
        Ok(handle)
    }

    pub async fn get_game(&self, game_id: GameId) -> Option<GameHandle> {
        let games = self.games.read().await;
        games
            .get(&game_id)
            .filter(|handle| !handle.is_closed())
            .cloned()
    }

    /// Stop a game's actor. Its log stays in the store.
    pub async fn close_game(&self, game_id: GameId) -> SessionResult<()> {
        let handle = self
            .games
            .write()
            .await
            .remove(&game_id)
            .ok_or(SessionError::GameNotFound(game_id))?;

        // An actor that already stopped has nothing left to close.
        match handle.close().await {
            Ok(()) | Err(SessionError::Closed) => {}
            Err(e) => return Err(e),
        }

        log::info!("Closed game {}", game_id);
        Ok(())
    }

    pub async fn active_game_count(&self) -> usize {
        let games = self.games.read().await;
        games.values().filter(|handle| !handle.is_closed()).count()
    }

    async fn spawn(&self, actor: GameActor, handle: GameHandle) {
        let mut games = self.games.write().await;
        games.insert(handle.game_id(), handle);
        drop(games);

        tokio::spawn(async move {
            actor.run().await;
        });
    }
}
