#![allow(dead_code)]

use achievement_sync::setup::{self, SyncContext};
use achievement_sync::store::CachePolicy;
use achievement_sync::SyncConfig;
use rcheevos_api::UserAuth;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GAME_HASH: &str = "abc123";
pub const GAME_ID: i64 = 42;
pub const ENDPOINT: &str = "/dorequest.php";

pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_config(server: &MockServer, dir: &TempDir, policy: CachePolicy) -> SyncConfig {
    SyncConfig {
        base_url: format!("{}{}", server.uri(), ENDPOINT),
        data_dir: Some(dir.path().to_path_buf()),
        cache_policy: policy,
        ..SyncConfig::default()
    }
}

/// Context with a stored credential
pub async fn logged_in_context(config: SyncConfig) -> SyncContext {
    init_test_logging();
    let context = setup::init(config).expect("sync context");
    context
        .api
        .auth_store()
        .store_user_auth(UserAuth::new("tester", "token-123"))
        .await
        .expect("store credential");
    context
}

pub fn success(body: Value) -> ResponseTemplate {
    let mut body = body;
    body["Success"] = json!(true);
    ResponseTemplate::new(200).set_body_json(body)
}

pub fn failure(status: u16, error: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "Success": false, "Error": error }))
}

pub fn game_json() -> Value {
    json!({
        "GameId": GAME_ID,
        "Title": "Pocket Quest",
        "ImageIconUrl": "https://media.example/Images/042.png",
        "RichPresencePatch": "Display:\nExploring",
        "Sets": [{
            "GameId": GAME_ID,
            "AchievementSetId": 9000,
            "Title": null,
            "Type": "core",
            "ImageIconUrl": "https://media.example/Images/042.png",
            "Achievements": [
                {
                    "ID": 501, "MemAddr": "0xH0001=1", "Title": "First Steps",
                    "Description": "Leave the house", "Points": 5, "Flags": 3,
                    "NumAwarded": 120, "NumAwardedHardcore": 80
                },
                {
                    "ID": 502, "MemAddr": "0xH0002=1", "Title": "Second Steps",
                    "Description": "Reach town", "Points": 10, "Flags": 3,
                    "NumAwarded": 90, "NumAwardedHardcore": 40
                },
                {
                    "ID": 503, "MemAddr": "0xH0003=1", "Title": "Work In Progress",
                    "Points": 0, "Flags": 5
                }
            ],
            "Leaderboards": [{
                "ID": 7, "Mem": "STA:0xH0003=1", "Format": "SCORE",
                "LowerIsBetter": 0, "Title": "High Score", "Hidden": 0
            }]
        }]
    })
}

pub async fn mount_hash_library(server: &MockServer, library: Value) {
    Mock::given(method("GET"))
        .and(query_param("r", "hashlibrary"))
        .respond_with(success(json!({ "MD5List": library })))
        .mount(server)
        .await;
}

pub async fn mount_game_data(server: &MockServer) {
    Mock::given(method("GET"))
        .and(query_param("r", "achievementsets"))
        .and(query_param("g", GAME_ID.to_string()))
        .respond_with(success(game_json()))
        .mount(server)
        .await;
}

pub async fn mount_unlocks(server: &MockServer, hardcore: bool, unlocks: &[i64]) {
    Mock::given(method("GET"))
        .and(query_param("r", "unlocks"))
        .and(query_param("h", if hardcore { "1" } else { "0" }))
        .respond_with(success(json!({ "UserUnlocks": unlocks })))
        .mount(server)
        .await;
}

pub async fn mount_post(server: &MockServer, request: &str) {
    Mock::given(method("POST"))
        .and(body_string_contains(format!("r={}", request)))
        .respond_with(success(json!({})))
        .mount(server)
        .await;
}

/// Everything a session start needs: library, catalog, unlocks of both modes, session post
pub async fn mount_online_session(server: &MockServer) {
    mount_hash_library(server, json!({ GAME_HASH: GAME_ID })).await;
    mount_game_data(server).await;
    mount_unlocks(server, true, &[502]).await;
    mount_unlocks(server, false, &[]).await;
    mount_post(server, "postactivity").await;
    mount_post(server, "ping").await;
}

pub async fn mount_award(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(query_param("r", "awardachievement"))
        .respond_with(response)
        .mount(server)
        .await;
}
