/// Integration tests for game sessions
///
/// These tests run games through the manager and actor handles against the
/// in-memory event store, covering the incremental path, undo, restore from
/// the log, and update broadcasts.
use std::sync::Arc;

use rotation_pool::{
    EndReason, EventStore, GameError, GameEvent, GameStatus, InMemoryEventStore, PlayerId,
    Roster, ScoreEffect,
    export::{self, GameExport},
    session::{GameConfig, GameManager, SessionError, UpdateKind},
};

fn roster() -> Roster {
    Roster::from_ids(["ann", "bob", "cy"])
}

fn setup() -> (GameManager, Arc<InMemoryEventStore>) {
    let store = Arc::new(InMemoryEventStore::new());
    let manager = GameManager::new(GameConfig::default(), store.clone()).unwrap();
    (manager, store)
}

#[tokio::test]
async fn test_full_game_to_rack_clear() {
    let (manager, store) = setup();
    let game = manager.create_game(roster()).await.unwrap();
    game.start().await.unwrap();

    // Three-way rotation keeps everyone within reach until the last ball.
    let players = ["ann", "bob", "cy"];
    let order = [3u8, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 1];
    for (idx, ball) in order.iter().enumerate() {
        let effect = if *ball >= 12 || *ball == 1 {
            ScoreEffect::Subtract
        } else {
            ScoreEffect::Add
        };
        let snapshot = game
            .pot_ball(players[idx % 3], *ball, effect)
            .await
            .unwrap();
        assert_eq!(snapshot.state.status, GameStatus::Active);
    }

    let last = game.pot_ball("cy", 2, ScoreEffect::Add).await.unwrap();
    assert_eq!(last.state.status, GameStatus::Ended);
    assert_eq!(last.state.winners, vec![PlayerId::new("cy")]);
    assert_eq!(last.active_ball, None);

    let records = store.events(game.game_id()).await.unwrap();
    assert_eq!(records.len(), 1 + order.len() + 1 + 1);
    assert!(matches!(
        records.last().map(|r| &r.event),
        Some(GameEvent::GameEnded {
            reason: EndReason::RackCleared,
            ..
        })
    ));
    assert!(
        records
            .iter()
            .enumerate()
            .all(|(idx, r)| r.sequence == idx as u64 + 1)
    );
}

#[tokio::test]
async fn test_undo_after_clinch_needs_two_steps() {
    let (manager, _) = setup();
    let game = manager.create_game(roster()).await.unwrap();
    game.start().await.unwrap();

    for ball in [15u8, 14, 13, 12, 11, 10, 9] {
        let snapshot = game.pot_ball("ann", ball, ScoreEffect::Add).await.unwrap();
        if snapshot.state.is_ended() {
            break;
        }
    }
    let ended = game.snapshot().await.unwrap();
    assert_eq!(ended.state.status, GameStatus::Ended);

    // The clinch marker goes first; the game stays over until the pot that
    // caused it is undone as well.
    let after_marker = game.undo().await.unwrap();
    assert_eq!(after_marker.state.status, GameStatus::Ended);
    assert_eq!(after_marker.state.version, ended.state.version - 1);

    let reopened = game.undo().await.unwrap();
    assert_eq!(reopened.state.status, GameStatus::Active);
    assert!(reopened.state.winners.is_empty());
    game.pot_ball("bob", 3, ScoreEffect::Add).await.unwrap();
}

#[tokio::test]
async fn test_restore_rebuilds_stale_cache() {
    let (manager, store) = setup();
    let game = manager.create_game(roster()).await.unwrap();
    let game_id = game.game_id();
    game.start().await.unwrap();
    game.pot_ball("ann", 3, ScoreEffect::Add).await.unwrap();
    let expected = game.commit_foul("bob", 4).await.unwrap().state;
    manager.close_game(game_id).await.unwrap();

    // Corrupt the cache; the log is still authoritative.
    let stale = rotation_pool::GameState::new(&roster(), GameStatus::Lobby);
    store.save_state(game_id, &stale).await.unwrap();

    let restored = manager.restore_game(game_id, roster()).await.unwrap();
    assert_eq!(restored.snapshot().await.unwrap().state, expected);
    assert_eq!(store.load_state(game_id).await.unwrap(), Some(expected));
}

#[tokio::test]
async fn test_games_are_independent() {
    let (manager, _) = setup();
    let first = manager.create_game(roster()).await.unwrap();
    let second = manager
        .create_game(Roster::from_ids(["dee", "eve", "fay", "gus"]))
        .await
        .unwrap();

    first.start().await.unwrap();
    second.start().await.unwrap();
    first.pot_ball("ann", 3, ScoreEffect::Add).await.unwrap();

    let untouched = second.snapshot().await.unwrap();
    assert_eq!(untouched.state.top_score, 0);
    assert_eq!(untouched.state.scores.len(), 4);
    assert_eq!(manager.active_game_count().await, 2);
    assert_eq!(
        second.pot_ball("ann", 3, ScoreEffect::Add).await.unwrap_err(),
        SessionError::Game(GameError::UnknownPlayer(PlayerId::new("ann")))
    );
}

#[tokio::test]
async fn test_concurrent_commands_are_serialized() {
    let (manager, store) = setup();
    let game = manager.create_game(roster()).await.unwrap();
    game.start().await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let handle = game.clone();
        tasks.push(tokio::spawn(async move {
            handle.commit_foul("bob", 7).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let snapshot = game.snapshot().await.unwrap();
    assert_eq!(
        snapshot.state.score_of(&PlayerId::new("bob")).unwrap().score,
        -56
    );
    assert_eq!(store.events(game.game_id()).await.unwrap().len(), 9);
}

#[tokio::test]
async fn test_unsubscribed_receiver_gets_nothing() {
    let (manager, _) = setup();
    let game = manager.create_game(roster()).await.unwrap();
    let (kept_id, mut kept) = game.subscribe().await.unwrap();
    let (gone_id, mut gone) = game.subscribe().await.unwrap();
    assert_ne!(kept_id, gone_id);

    game.unsubscribe(gone_id).await.unwrap();
    game.start().await.unwrap();
    game.undo().await.unwrap();

    assert_eq!(
        kept.recv().await.unwrap().kind,
        UpdateKind::Applied(GameEvent::GameStarted)
    );
    let undone = kept.recv().await.unwrap();
    assert_eq!(undone.kind, UpdateKind::Undone(GameEvent::GameStarted));
    assert_eq!(undone.snapshot.state.status, GameStatus::Lobby);
    assert!(gone.recv().await.is_none());
}

#[tokio::test]
async fn test_export_from_session() {
    let (manager, _) = setup();
    let game = manager.create_game(roster()).await.unwrap();
    game.start().await.unwrap();
    game.pot_ball("bob", 3, ScoreEffect::Add).await.unwrap();
    let snapshot = game.end_game().await.unwrap();
    let records = game.events().await.unwrap();

    let export = GameExport::build(
        snapshot.game_id,
        &snapshot.roster,
        &snapshot.state,
        &records,
    );
    assert_eq!(export.events.len(), 3);
    assert_eq!(export.game.winners[0].id, PlayerId::new("bob"));

    let csv = export::to_csv(&snapshot.roster, &snapshot.state);
    assert!(csv.contains("bob,\"bob\",6,active,"));
}
