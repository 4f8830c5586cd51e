//! Game sessions built on an async actor model.
//!
//! Each game runs in its own Tokio task with an mpsc inbox, so commands for
//! one game are applied strictly one after another while separate games run
//! concurrently. The [`GameManager`] spawns actors, restores them from the
//! event store, and tracks their handles.
//!
//! ## Example
//!
//! ```no_run
//! use rotation_pool::game::{Roster, ScoreEffect};
//! use rotation_pool::session::{GameConfig, GameManager};
//! use rotation_pool::store::InMemoryEventStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryEventStore::new());
//!     let manager = GameManager::new(GameConfig::default(), store)?;
//!
//!     let game = manager.create_game(Roster::from_ids(["ann", "bob", "cy"])).await?;
//!     game.start().await?;
//!     game.pot_ball("ann", 3, ScoreEffect::Add).await?;
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod config;
pub mod errors;
pub mod manager;
pub mod messages;

pub use actor::{GameActor, GameHandle};
pub use config::GameConfig;
pub use errors::{SessionError, SessionResult};
pub use manager::GameManager;
pub use messages::{CommandResult, GameMessage, GameSnapshot, GameUpdate, UpdateKind};
