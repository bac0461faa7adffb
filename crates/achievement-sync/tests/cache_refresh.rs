mod common;

use achievement_sync::store::{CachePolicy, CatalogCache, UserProgressCache};
use achievement_sync::SyncError;
use common::*;
use rcheevos_api::GameId;
use serde_json::json;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn hash_library_is_reused_while_fresh() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(query_param("r", "hashlibrary"))
        .respond_with(success(json!({ "MD5List": { GAME_HASH: GAME_ID } })))
        .expect(1)
        .mount(&server)
        .await;
    mount_game_data(&server).await;
    mount_unlocks(&server, false, &[]).await;
    let context = logged_in_context(test_config(&server, &dir, CachePolicy::persist_all())).await;

    for _ in 0..2 {
        let data = context
            .repository
            .get_user_game_data(GAME_HASH, false)
            .await
            .unwrap();
        assert_eq!(data.game_id, GameId(GAME_ID));
    }
    assert!(context
        .store
        .get_hash_library_refreshed_at()
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn stale_hash_library_picks_up_remapped_hashes() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(query_param("r", "hashlibrary"))
        .respond_with(success(json!({ "MD5List": { GAME_HASH: GAME_ID } })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    // The hash was withdrawn server side
    Mock::given(method("GET"))
        .and(query_param("r", "hashlibrary"))
        .respond_with(success(json!({ "MD5List": { "0123abcd": 7 } })))
        .expect(1)
        .mount(&server)
        .await;
    mount_game_data(&server).await;
    mount_unlocks(&server, false, &[]).await;
    let mut config = test_config(&server, &dir, CachePolicy::persist_all());
    config.hash_library_max_age_hours = 0;
    let context = logged_in_context(config).await;

    context
        .repository
        .get_user_game_data(GAME_HASH, false)
        .await
        .unwrap();
    let result = context.repository.get_user_game_data(GAME_HASH, false).await;

    assert!(matches!(result, Err(SyncError::UnknownGame(hash)) if hash == GAME_HASH));
    assert!(context
        .store
        .get_game_hash_entry(GAME_HASH)
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        context
            .store
            .get_game_hash_entry("0123abcd")
            .await
            .unwrap()
            .map(|e| e.game_id),
        Some(7)
    );
}

#[tokio::test]
async fn failed_hash_library_refresh_keeps_the_cached_library() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_online_session(&server).await;
    let mut config = test_config(&server, &dir, CachePolicy::persist_all());
    config.hash_library_max_age_hours = 0;
    let context = logged_in_context(config).await;

    context
        .repository
        .get_user_game_data(GAME_HASH, false)
        .await
        .unwrap();
    let refreshed_at = context.store.get_hash_library_refreshed_at().await.unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .and(query_param("r", "hashlibrary"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    // Catalog and unlocks are still fresh, only the library is due
    let data = context
        .repository
        .get_user_game_data(GAME_HASH, false)
        .await
        .unwrap();
    assert_eq!(data.game_id, GameId(GAME_ID));

    let result = context.repository.get_user_game_data("ffffffff", false).await;
    assert!(matches!(result, Err(SyncError::Network(_))));

    assert_eq!(
        context
            .store
            .get_game_hash_entry(GAME_HASH)
            .await
            .unwrap()
            .map(|e| e.game_id),
        Some(GAME_ID)
    );
    assert_eq!(
        context.store.get_hash_library_refreshed_at().await.unwrap(),
        refreshed_at
    );
}

async fn assert_failed_catalog_refresh_keeps_cache(
    catalog_response: ResponseTemplate,
    check: fn(&SyncError) -> bool,
) {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_online_session(&server).await;
    let mut config = test_config(&server, &dir, CachePolicy::persist_all());
    config.achievement_set_max_age_hours = 0;
    let context = logged_in_context(config).await;
    let game_id = GameId(GAME_ID);

    context
        .repository
        .get_user_game_data(GAME_HASH, false)
        .await
        .unwrap();
    let cached = context.store.get_game(game_id).await.unwrap().unwrap();
    let metadata = context
        .store
        .get_game_set_metadata(game_id)
        .await
        .unwrap()
        .unwrap();

    server.reset().await;
    mount_hash_library(&server, json!({ GAME_HASH: GAME_ID })).await;
    mount_unlocks(&server, false, &[]).await;
    Mock::given(method("GET"))
        .and(query_param("r", "achievementsets"))
        .respond_with(catalog_response)
        .expect(1)
        .mount(&server)
        .await;

    let error = context
        .repository
        .get_user_game_data(GAME_HASH, false)
        .await
        .unwrap_err();
    assert!(check(&error), "unexpected error: {:?}", error);

    assert_eq!(context.store.get_game(game_id).await.unwrap(), Some(cached));
    assert!(context.store.get_achievement(501).await.unwrap().is_some());
    assert!(context.store.get_leaderboard(7).await.unwrap().is_some());
    let after = context
        .store
        .get_game_set_metadata(game_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        after.last_achievement_set_refreshed_at,
        metadata.last_achievement_set_refreshed_at
    );
}

#[tokio::test]
async fn unreachable_server_leaves_catalog_untouched() {
    assert_failed_catalog_refresh_keeps_cache(ResponseTemplate::new(503), |e| {
        matches!(e, SyncError::Network(_))
    })
    .await;
}

#[tokio::test]
async fn malformed_catalog_leaves_catalog_untouched() {
    let mut body = game_json();
    body["Sets"][0]["Type"] = json!("mystery");
    assert_failed_catalog_refresh_keeps_cache(success(body), |e| {
        matches!(e, SyncError::Parse(_))
    })
    .await;
}
