//! Game actor implementation with async message handling.
//!
//! One actor owns one game. Messages are processed one at a time, so every
//! mutation of a game's log and state is serialized without locks.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::{
    config::GameConfig,
    errors::{SessionError, SessionResult},
    messages::{CommandResult, GameMessage, GameSnapshot, GameUpdate, UpdateKind},
};
use crate::{
    game::{
        GameError, GameEvent, GameId, GameState, GameStatus, PlayerId, Roster, ScoreEffect,
        commands, rebuild, reduce,
    },
    store::{EventRecord, EventStore},
};

/// Game actor handle for sending messages
#[derive(Clone)]
pub struct GameHandle {
    sender: mpsc::Sender<GameMessage>,
    game_id: GameId,
    subscriber_capacity: usize,
}

impl GameHandle {
    fn new(sender: mpsc::Sender<GameMessage>, game_id: GameId, subscriber_capacity: usize) -> Self {
        Self {
            sender,
            game_id,
            subscriber_capacity,
        }
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Whether the actor behind this handle has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the game
    pub async fn send(&self, message: GameMessage) -> SessionResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::Closed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> GameMessage,
    ) -> SessionResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn start(&self) -> CommandResult {
        self.request(|response| GameMessage::Start { response })
            .await?
    }

    pub async fn pot_ball(
        &self,
        player_id: impl Into<PlayerId>,
        ball: u8,
        effect: ScoreEffect,
    ) -> CommandResult {
        let player_id = player_id.into();
        self.request(|response| GameMessage::Pot {
            player_id,
            ball,
            effect,
            response,
        })
        .await?
    }

    pub async fn commit_foul(&self, player_id: impl Into<PlayerId>, ball: u8) -> CommandResult {
        let player_id = player_id.into();
        self.request(|response| GameMessage::Foul {
            player_id,
            ball,
            response,
        })
        .await?
    }

    pub async fn end_game(&self) -> CommandResult {
        self.request(|response| GameMessage::End { response })
            .await?
    }

    pub async fn undo(&self) -> CommandResult {
        self.request(|response| GameMessage::Undo { response })
            .await?
    }

    pub async fn drop_out(&self, player_id: impl Into<PlayerId>) -> CommandResult {
        let player_id = player_id.into();
        self.request(|response| GameMessage::DropOut {
            player_id,
            response,
        })
        .await?
    }

    pub async fn snapshot(&self) -> SessionResult<GameSnapshot> {
        self.request(|response| GameMessage::GetSnapshot { response })
            .await
    }

    pub async fn events(&self) -> SessionResult<Vec<EventRecord>> {
        self.request(|response| GameMessage::GetEvents { response })
            .await?
    }

    /// Register for updates. Returns the subscriber id to pass to
    /// [`unsubscribe`](Self::unsubscribe) and the receiving end.
    pub async fn subscribe(&self) -> SessionResult<(Uuid, mpsc::Receiver<GameUpdate>)> {
        let subscriber_id = Uuid::new_v4();
        let (sender, receiver) = mpsc::channel(self.subscriber_capacity);
        self.send(GameMessage::Subscribe {
            subscriber_id,
            sender,
        })
        .await?;
        Ok((subscriber_id, receiver))
    }

    pub async fn unsubscribe(&self, subscriber_id: Uuid) -> SessionResult<()> {
        self.send(GameMessage::Unsubscribe { subscriber_id }).await
    }

    pub async fn close(&self) -> SessionResult<()> {
        self.request(|response| GameMessage::Close { response })
            .await
    }
}

/// Actor owning a single game
pub struct GameActor {
    id: GameId,

    config: GameConfig,

    roster: Roster,

    /// Cached fold of the event log
    state: GameState,

    inbox: mpsc::Receiver<GameMessage>,

    store: Arc<dyn EventStore>,

    subscribers: HashMap<Uuid, mpsc::Sender<GameUpdate>>,

    is_closed: bool,
}

impl GameActor {
    /// Create an actor for a game with an empty log.
    pub fn new(
        id: GameId,
        roster: Roster,
        config: GameConfig,
        store: Arc<dyn EventStore>,
    ) -> (Self, GameHandle) {
        let state = GameState::new(&roster, GameStatus::Lobby);
        Self::with_state(id, roster, state, config, store)
    }

    /// Create an actor for a game whose log already exists, rebuilding its
    /// state from the stored events. A missing or stale state cache is
    /// rewritten.
    pub async fn restore(
        id: GameId,
        roster: Roster,
        config: GameConfig,
        store: Arc<dyn EventStore>,
    ) -> SessionResult<(Self, GameHandle)> {
        let records = store.events(id).await?;
        let state = rebuild(
            &roster,
            records.iter().map(|r| &r.event),
            GameStatus::Lobby,
        );

        if store.load_state(id).await?.as_ref() != Some(&state) {
            log::info!("Game {}: state cache stale, rewriting", id);
            store.save_state(id, &state).await?;
        }

        Ok(Self::with_state(id, roster, state, config, store))
    }

    fn with_state(
        id: GameId,
        roster: Roster,
        state: GameState,
        config: GameConfig,
        store: Arc<dyn EventStore>,
    ) -> (Self, GameHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity);
        let handle = GameHandle::new(sender, id, config.subscriber_capacity);

        let actor = Self {
            id,
            config,
            roster,
            state,
            inbox,
            store,
            subscribers: HashMap::new(),
            is_closed: false,
        };

        (actor, handle)
    }

    /// Run the game actor event loop
    pub async fn run(mut self) {
        log::info!(
            "Game {} starting with {} players",
            self.id,
            self.roster.len()
        );

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message).await;
            if self.is_closed {
                break;
            }
        }

        log::info!("Game {} closed at version {}", self.id, self.state.version);
    }

    async fn handle_message(&mut self, message: GameMessage) {
        match message {
            GameMessage::Start { response } => {
                let result = match commands::start_game(&self.state) {
                    Ok(event) => self.apply(event).await,
                    Err(e) => Err(e.into()),
                };
                let _ = response.send(result);
            }

            GameMessage::Pot {
                player_id,
                ball,
                effect,
                response,
            } => {
                let result =
                    match commands::pot_ball(&self.state, &self.roster, &player_id, ball, effect) {
                        Ok(event) => self.apply(event).await,
                        Err(e) => Err(e.into()),
                    };
                let _ = response.send(result);
            }

            GameMessage::Foul {
                player_id,
                ball,
                response,
            } => {
                let result = match commands::commit_foul(&self.state, &self.roster, &player_id, ball)
                {
                    Ok(event) => self.apply(event).await,
                    Err(e) => Err(e.into()),
                };
                let _ = response.send(result);
            }

            GameMessage::End { response } => {
                let result = match commands::end_game(&self.state) {
                    Ok(event) => self.apply(event).await,
                    Err(e) => Err(e.into()),
                };
                let _ = response.send(result);
            }

            GameMessage::Undo { response } => {
                let result = self.handle_undo().await;
                let _ = response.send(result);
            }

            GameMessage::DropOut {
                player_id,
                response,
            } => {
                let result = self.handle_drop_out(player_id).await;
                let _ = response.send(result);
            }

            GameMessage::GetSnapshot { response } => {
                let _ = response.send(self.snapshot());
            }

            GameMessage::GetEvents { response } => {
                let result = self.store.events(self.id).await.map_err(SessionError::from);
                let _ = response.send(result);
            }

            GameMessage::Subscribe {
                subscriber_id,
                sender,
            } => {
                self.subscribers.insert(subscriber_id, sender);
                log::debug!(
                    "Subscriber {} subscribed to game {} updates",
                    subscriber_id,
                    self.id
                );
            }

            GameMessage::Unsubscribe { subscriber_id } => {
                self.subscribers.remove(&subscriber_id);
                log::debug!(
                    "Subscriber {} unsubscribed from game {} updates",
                    subscriber_id,
                    self.id
                );
            }

            GameMessage::Close { response } => {
                self.is_closed = true;
                self.subscribers.clear();
                let _ = response.send(());
            }
        }
    }

    /// Append `event`, fold it in, and append the terminal marker if the
    /// reduction ended the game.
    ///
    /// Once `event` is in the log the command has succeeded.
    async fn apply(&mut self, event: GameEvent) -> CommandResult {
        self.commit(event.clone()).await?;

        let before = &self.state;
        let after = reduce(before, &event, &self.roster);
        let marker = commands::terminal_event(before, &event, &after, &self.roster);
        self.state = after;
        self.notify_state_change(UpdateKind::Applied(event));

        if let Some(marker) = marker {
            self.append_marker(marker).await;
        }

        self.save_state().await;
        Ok(self.snapshot())
    }

    /// The game already ends on replay without its marker, so a failed
    /// append only costs the marker record.
    async fn append_marker(&mut self, marker: GameEvent) {
        log::info!("Game {}: {}", self.id, marker);
        match self.commit(marker.clone()).await {
            Ok(_) => {
                self.state = reduce(&self.state, &marker, &self.roster);
                self.notify_state_change(UpdateKind::Applied(marker));
            }
            Err(e) => {
                log::warn!(
                    "Game {}: failed to append {}: {}",
                    self.id,
                    marker.kind(),
                    e
                );
            }
        }
    }

    async fn commit(&self, event: GameEvent) -> SessionResult<EventRecord> {
        let record = self
            .store
            .append(self.id, event, &self.config.created_by)
            .await?;
        log::debug!(
            "Game {}: #{} {}",
            self.id,
            record.sequence,
            record.event.kind()
        );
        Ok(record)
    }

    async fn handle_undo(&mut self) -> CommandResult {
        // Read before removing: nothing else writes this game's log, so the
        // remaining records are everything but the last one.
        let mut records = self.store.events(self.id).await?;
        if records.is_empty() {
            return Err(GameError::NothingToUndo.into());
        }
        let removed = self
            .store
            .remove_last(self.id)
            .await?
            .ok_or(GameError::NothingToUndo)?;
        records.pop();

        self.state = rebuild(
            &self.roster,
            records.iter().map(|r| &r.event),
            GameStatus::Lobby,
        );
        log::debug!(
            "Game {}: undid #{} {}",
            self.id,
            removed.sequence,
            removed.event.kind()
        );

        self.save_state().await;
        self.notify_state_change(UpdateKind::Undone(removed.event));
        Ok(self.snapshot())
    }

    /// Mark a player as dropped out and refold the log under the new
    /// roster, so the live state matches what undo and restore rebuild. If
    /// that ends the game, the terminal marker is appended.
    async fn handle_drop_out(&mut self, player_id: PlayerId) -> CommandResult {
        let mut roster = self.roster.clone();
        if !roster.mark_dropped_out(&player_id)? {
            return Ok(self.snapshot());
        }
        let records = self.store.events(self.id).await?;

        self.roster = roster;
        log::info!("Game {}: {} dropped out", self.id, player_id);

        let after = rebuild(
            &self.roster,
            records.iter().map(|r| &r.event),
            GameStatus::Lobby,
        );
        let before = std::mem::replace(&mut self.state, after);
        self.notify_state_change(UpdateKind::PlayerDroppedOut(player_id));

        let marker = records.last().and_then(|last| {
            commands::terminal_event(&before, &last.event, &self.state, &self.roster)
        });
        if let Some(marker) = marker {
            self.append_marker(marker).await;
        }

        if self.state != before {
            self.save_state().await;
        }
        Ok(self.snapshot())
    }

    /// The cache is rebuildable from the log, so a failed write is logged
    /// rather than failing the command.
    async fn save_state(&self) {
        if let Err(e) = self.store.save_state(self.id, &self.state).await {
            log::warn!("Game {}: failed to cache state: {}", self.id, e);
        }
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            game_id: self.id,
            state: self.state.clone(),
            active_ball: self.state.active_ball(),
            roster: self.roster.clone(),
        }
    }

    /// Broadcast an update to all subscribers
    fn notify_state_change(&mut self, kind: UpdateKind) {
        if self.subscribers.is_empty() {
            return;
        }

        let update = GameUpdate {
            game_id: self.id,
            kind,
            snapshot: self.snapshot(),
        };

        self.subscribers
            .retain(|subscriber_id, sender| match sender.try_send(update.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Subscriber {} channel full, dropping update",
                        subscriber_id
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", subscriber_id);
                    false
                }
            });
    }
}
