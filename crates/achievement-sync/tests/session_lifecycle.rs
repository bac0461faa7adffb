mod common;

use achievement_sync::setup;
use achievement_sync::store::{CachePolicy, CatalogCache, PendingSubmissionQueue, UserProgressCache};
use achievement_sync::tasks::heartbeat::spawn_heartbeat;
use achievement_sync::utils::config::HeartbeatConfig;
use achievement_sync::{SessionState, SyncError, WorkResult};
use common::*;
use rcheevos_api::{GameId, UserAuth};
use serde_json::json;
use std::time::Duration;
use tokio::sync::watch;
use wiremock::matchers::{body_string_contains, method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn login_persists_across_restarts() {
    init_test_logging();
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(body_string_contains("r=login2"))
        .respond_with(success(json!({ "User": "Tester", "Token": "fresh-token" })))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, &dir, CachePolicy::compliant());
    let context = setup::init(config.clone()).unwrap();
    assert_eq!(
        context.repository.session_state().await,
        SessionState::Unauthenticated
    );

    context.repository.login("tester", "hunter 2").await.unwrap();
    assert_eq!(
        context.repository.session_state().await,
        SessionState::Authenticated
    );
    drop(context);

    let restarted = setup::init(config).unwrap();
    assert!(restarted.repository.is_user_authenticated());
    assert_eq!(
        restarted.repository.get_user_authentication(),
        Some(UserAuth::new("Tester", "fresh-token"))
    );
    assert_eq!(
        restarted.repository.session_state().await,
        SessionState::Authenticated
    );
}

#[tokio::test]
async fn rejected_login_stores_nothing() {
    init_test_logging();
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(body_string_contains("r=login2"))
        .respond_with(failure(401, "Invalid User/Password combination. Please try again"))
        .mount(&server)
        .await;

    let context = setup::init(test_config(&server, &dir, CachePolicy::compliant())).unwrap();
    let result = context.repository.login("tester", "wrong").await;

    assert!(matches!(result, Err(SyncError::ServerRejected(_))));
    assert!(!context.repository.is_user_authenticated());
}

#[tokio::test]
async fn nothing_reaches_the_server_without_a_credential() {
    init_test_logging();
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .respond_with(success(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let context = setup::init(test_config(&server, &dir, CachePolicy::persist_all())).unwrap();

    let result = context.repository.start_session(GAME_HASH, true).await;
    assert!(matches!(result, Err(SyncError::NotAuthenticated)));
    assert!(matches!(
        context.repository.get_user_game_data(GAME_HASH, true).await,
        Err(SyncError::NotAuthenticated)
    ));
    assert_eq!(
        context.submission_worker().run().await,
        WorkResult::PermanentFailure
    );
}

#[tokio::test]
async fn unlock_without_session_is_refused() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let context = logged_in_context(test_config(&server, &dir, CachePolicy::persist_all())).await;

    assert!(matches!(
        context.repository.on_achievement_unlocked(501, true).await,
        Err(SyncError::NoActiveSession)
    ));
    assert!(matches!(
        context.repository.switch_mode(true).await,
        Err(SyncError::NoActiveSession)
    ));
    assert!(matches!(
        context.repository.submit_leaderboard_entry(7, 10).await,
        Err(SyncError::NoActiveSession)
    ));
    assert!(context.store.list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn logout_clears_user_data_but_keeps_catalog() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_online_session(&server).await;
    let context = logged_in_context(test_config(&server, &dir, CachePolicy::persist_all())).await;
    let game_id = GameId(GAME_ID);

    context.repository.start_session(GAME_HASH, true).await.unwrap();
    assert_eq!(context.store.get_user_unlocks(game_id, true).await.unwrap().len(), 1);

    context.repository.logout().await.unwrap();

    assert!(!context.repository.is_user_authenticated());
    assert_eq!(
        context.repository.session_state().await,
        SessionState::Unauthenticated
    );
    assert!(context.store.get_user_unlocks(game_id, true).await.unwrap().is_empty());
    let metadata = context.store.get_game_set_metadata(game_id).await.unwrap().unwrap();
    assert!(metadata.last_hardcore_user_data_refreshed_at.is_none());
    assert!(metadata.last_achievement_set_refreshed_at.is_some());
    assert!(context.store.get_game(game_id).await.unwrap().is_some());
}

#[tokio::test]
async fn session_tracks_mode_and_primed_achievements() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_online_session(&server).await;
    let context = logged_in_context(test_config(&server, &dir, CachePolicy::persist_all())).await;
    let repository = &context.repository;

    repository.start_session("ABC123", false).await.unwrap();
    let active = repository.active_session().await.unwrap();
    assert_eq!(active.game_id, GameId(GAME_ID));
    assert_eq!(active.game_hash, GAME_HASH);
    assert!(!active.for_hardcore_mode);
    assert_eq!(active.rich_presence_patch.as_deref(), Some("Display:\nExploring"));

    repository.on_achievement_primed(501).await;
    repository.on_achievement_primed(502).await;
    repository.on_achievement_unprimed(502).await;
    let primed: Vec<i64> = repository
        .active_session()
        .await
        .unwrap()
        .primed_achievements
        .into_iter()
        .collect();
    assert_eq!(primed, vec![501]);

    repository.switch_mode(true).await.unwrap();
    assert!(repository.active_session().await.unwrap().for_hardcore_mode);

    repository.end_session().await;
    assert!(repository.active_session().await.is_none());
    assert_eq!(repository.session_state().await, SessionState::Authenticated);
}

#[tokio::test]
async fn game_summary_comes_from_cache() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_online_session(&server).await;
    let context = logged_in_context(test_config(&server, &dir, CachePolicy::persist_all())).await;

    assert_eq!(context.repository.get_game_summary(GAME_HASH).await.unwrap(), None);

    context.repository.start_session(GAME_HASH, true).await.unwrap();
    let summary = context
        .repository
        .get_game_summary(GAME_HASH)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary.game_id, GameId(GAME_ID));
    assert_eq!(summary.title, "Pocket Quest");
    assert_eq!(summary.total_achievements, 3);
    assert_eq!(summary.total_points, 15);
    assert_eq!(summary.unlocked_hardcore, 1);
    assert_eq!(summary.unlocked_casual, 0);

    let leaderboard = context.repository.get_leaderboard(7).await.unwrap().unwrap();
    assert_eq!(leaderboard.title, "High Score");
    let achievement = context.repository.get_achievement(502).await.unwrap().unwrap();
    assert_eq!(achievement.points, 10);
}

#[tokio::test]
async fn leaderboard_entry_is_submitted_for_active_game() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_online_session(&server).await;
    Mock::given(method("GET"))
        .and(query_param("r", "submitlbentry"))
        .and(query_param("i", "7"))
        .and(query_param("s", "4200"))
        .respond_with(success(json!({
            "Response": {
                "Score": 4200,
                "ScoreFormatted": "004200",
                "BestScore": 4200,
                "LBData": {
                    "Format": "SCORE", "LeaderboardID": 7, "GameID": GAME_ID,
                    "Title": "High Score", "LowerIsBetter": false
                },
                "RankInfo": { "NumEntries": 12, "Rank": 2 }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let context = logged_in_context(test_config(&server, &dir, CachePolicy::compliant())).await;

    context.repository.start_session(GAME_HASH, true).await.unwrap();
    let response = context
        .repository
        .submit_leaderboard_entry(7, 4200)
        .await
        .unwrap();

    assert_eq!(response.game_id, GameId(GAME_ID));
    assert_eq!(response.formatted_score, "004200");
    assert_eq!(response.rank, 2);
}

fn fast_heartbeat() -> HeartbeatConfig {
    HeartbeatConfig {
        with_rich_presence_secs: 1,
        without_rich_presence_secs: 1,
    }
}

#[tokio::test]
async fn heartbeat_pings_with_rich_presence_until_cancelled() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_hash_library(&server, json!({ GAME_HASH: GAME_ID })).await;
    mount_game_data(&server).await;
    mount_unlocks(&server, true, &[]).await;
    mount_post(&server, "postactivity").await;
    Mock::given(method("POST"))
        .and(body_string_contains("r=ping"))
        .and(body_string_contains("m=Exploring"))
        .respond_with(success(json!({})))
        .expect(1..)
        .mount(&server)
        .await;
    let context = logged_in_context(test_config(&server, &dir, CachePolicy::compliant())).await;
    context.repository.start_session(GAME_HASH, true).await.unwrap();

    let (_presence_tx, presence_rx) = watch::channel(Some("Exploring".to_string()));
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let handle = spawn_heartbeat(
        context.repository.clone(),
        fast_heartbeat(),
        presence_rx,
        cancel_rx,
    );

    tokio::time::sleep(Duration::from_millis(1500)).await;
    cancel_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("heartbeat stops on cancel")
        .unwrap();
}

#[tokio::test]
async fn heartbeat_stops_when_session_ends() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let context = logged_in_context(test_config(&server, &dir, CachePolicy::compliant())).await;

    let (_presence_tx, presence_rx) = watch::channel(None);
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let handle = spawn_heartbeat(
        context.repository.clone(),
        fast_heartbeat(),
        presence_rx,
        cancel_rx,
    );

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("heartbeat stops without a session")
        .unwrap();
}
