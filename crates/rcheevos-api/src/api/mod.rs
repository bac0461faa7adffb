//! Protocol client for the RetroAchievements request endpoint
//!
//! Every call is a GET or POST against a single endpoint with URL-encoded
//! parameters. Responses are JSON objects carrying a `Success` flag and, when
//! unsuccessful, an `Error` message.

mod dto;
mod error;
mod mapper;

pub use error::ApiError;

use crate::auth::UserAuthStore;
use crate::models::{
    AwardAchievementResponse, Game, GameId, SubmitLeaderboardEntryResponse, UserAuth,
};
use crate::signature::{Md5SignatureProvider, SignatureProvider};
use dto::*;
use reqwest::{Client, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const BASE_URL: &str = "https://retroachievements.org/dorequest.php";
pub const DEFAULT_USER_AGENT: &str = "rcheevos-api/0.1.0";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const PARAMETER_USER: &str = "u";
const PARAMETER_PASSWORD: &str = "p";
const PARAMETER_TOKEN: &str = "t";
const PARAMETER_REQUEST: &str = "r";
const PARAMETER_GAME_ID: &str = "g";
const PARAMETER_SESSION_GAME_ID: &str = "m";
const PARAMETER_ACHIEVEMENT_ID: &str = "a";
const PARAMETER_ACTIVITY_TYPE: &str = "a";
const PARAMETER_IS_HARDCORE: &str = "h";
const PARAMETER_RICH_PRESENCE: &str = "m";
const PARAMETER_SIGNATURE: &str = "v";
const PARAMETER_LEADERBOARD_ID: &str = "i";
const PARAMETER_SCORE: &str = "s";

const REQUEST_LOGIN: &str = "login2";
const REQUEST_HASH_LIBRARY: &str = "hashlibrary";
const REQUEST_GAME_DATA: &str = "achievementsets";
const REQUEST_USER_UNLOCKED_ACHIEVEMENTS: &str = "unlocks";
const REQUEST_POST_ACTIVITY: &str = "postactivity";
const REQUEST_AWARD_ACHIEVEMENT: &str = "awardachievement";
const REQUEST_SUBMIT_LEADERBOARD_ENTRY: &str = "submitlbentry";
const REQUEST_PING: &str = "ping";

const ACTIVITY_TYPE_START_SESSION: &str = "3";

type Parameters = Vec<(&'static str, String)>;

/// Decoded response envelope
enum Envelope {
    Success(Value),
    Failure(String),
}

pub struct RaApiBuilder {
    base_url: String,
    user_agent: String,
    timeout: Duration,
    auth_store: Arc<dyn UserAuthStore>,
    signature_provider: Arc<dyn SignatureProvider>,
}

impl RaApiBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn signature_provider(mut self, provider: Arc<dyn SignatureProvider>) -> Self {
        self.signature_provider = provider;
        self
    }

    pub fn build(self) -> anyhow::Result<RaApi> {
        let base_url = Url::parse(&self.base_url)?;
        let client = Client::builder()
            .user_agent(self.user_agent)
            .timeout(self.timeout)
            .build()?;

        Ok(RaApi {
            client,
            base_url,
            auth_store: self.auth_store,
            signature_provider: self.signature_provider,
        })
    }
}

pub struct RaApi {
    client: Client,
    base_url: Url,
    auth_store: Arc<dyn UserAuthStore>,
    signature_provider: Arc<dyn SignatureProvider>,
}

impl RaApi {
    pub fn builder(auth_store: Arc<dyn UserAuthStore>) -> RaApiBuilder {
        RaApiBuilder {
            base_url: BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            auth_store,
            signature_provider: Arc::new(Md5SignatureProvider::new()),
        }
    }

    pub fn auth_store(&self) -> &Arc<dyn UserAuthStore> {
        &self.auth_store
    }

    /// Exchange a password for a session token. Does not touch the auth store.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserAuth, ApiError> {
        let login: UserLoginDto = self
            .post(
                REQUEST_LOGIN,
                vec![
                    (PARAMETER_USER, username.to_string()),
                    (PARAMETER_PASSWORD, password.to_string()),
                ],
            )
            .await?;

        Ok(UserAuth {
            username: login.user.unwrap_or_else(|| username.to_string()),
            token: login.token,
        })
    }

    pub async fn get_game_hash_library(&self) -> Result<HashMap<String, GameId>, ApiError> {
        let user_auth = self.require_user_auth()?;
        let library: HashLibraryDto = self
            .get(REQUEST_HASH_LIBRARY, authenticated(&user_auth, vec![]))
            .await?;

        Ok(library
            .md5_list
            .into_iter()
            .map(|(hash, game_id)| (hash.to_ascii_lowercase(), GameId(game_id)))
            .collect())
    }

    pub async fn get_user_unlocked_achievements(
        &self,
        game_id: GameId,
        for_hardcore_mode: bool,
    ) -> Result<Vec<i64>, ApiError> {
        let user_auth = self.require_user_auth()?;
        let unlocks: UserUnlocksDto = self
            .get(
                REQUEST_USER_UNLOCKED_ACHIEVEMENTS,
                authenticated(
                    &user_auth,
                    vec![
                        (PARAMETER_GAME_ID, game_id.to_string()),
                        (PARAMETER_IS_HARDCORE, hardcore_flag(for_hardcore_mode)),
                    ],
                ),
            )
            .await?;

        Ok(unlocks.user_unlocks)
    }

    pub async fn get_game_achievement_data(&self, game_id: GameId) -> Result<Game, ApiError> {
        let user_auth = self.require_user_auth()?;
        let game: GameAchievementSetsDto = self
            .get(
                REQUEST_GAME_DATA,
                authenticated(&user_auth, vec![(PARAMETER_GAME_ID, game_id.to_string())]),
            )
            .await?;

        game.into_model()
    }

    pub async fn start_session(&self, game_id: GameId) -> Result<(), ApiError> {
        let user_auth = self.require_user_auth()?;
        let _: IgnoredAny = self
            .post(
                REQUEST_POST_ACTIVITY,
                authenticated(
                    &user_auth,
                    vec![
                        (PARAMETER_ACTIVITY_TYPE, ACTIVITY_TYPE_START_SESSION.to_string()),
                        (PARAMETER_SESSION_GAME_ID, game_id.to_string()),
                    ],
                ),
            )
            .await?;

        Ok(())
    }

    /// Award an achievement. A server reply stating that the user already has
    /// the achievement counts as success, which makes resubmission harmless.
    pub async fn award_achievement(
        &self,
        achievement_id: i64,
        for_hardcore_mode: bool,
    ) -> Result<AwardAchievementResponse, ApiError> {
        let user_auth = self.require_user_auth()?;
        let signature = self.signature_provider.achievement_signature(
            achievement_id,
            &user_auth,
            for_hardcore_mode,
        );

        let result = self
            .get_with(
                REQUEST_AWARD_ACHIEVEMENT,
                authenticated(
                    &user_auth,
                    vec![
                        (PARAMETER_ACHIEVEMENT_ID, achievement_id.to_string()),
                        (PARAMETER_IS_HARDCORE, hardcore_flag(for_hardcore_mode)),
                        (PARAMETER_SIGNATURE, signature),
                    ],
                ),
                |reason| {
                    if is_already_awarded(&reason) {
                        log::info!(
                            "[ra-api] Achievement {} was already awarded, treating as confirmed",
                            achievement_id
                        );
                        Ok(None)
                    } else {
                        Err(ApiError::ServerRejected(reason))
                    }
                },
            )
            .await?;

        Ok(match result {
            Some(AwardAchievementDto {
                achievements_remaining,
            }) => AwardAchievementResponse {
                achievement_awarded: true,
                achievements_remaining,
            },
            None => AwardAchievementResponse::already_awarded(),
        })
    }

    pub async fn submit_leaderboard_entry(
        &self,
        leaderboard_id: i64,
        value: i32,
    ) -> Result<SubmitLeaderboardEntryResponse, ApiError> {
        let user_auth = self.require_user_auth()?;
        let signature =
            self.signature_provider
                .leaderboard_signature(leaderboard_id, value, &user_auth);

        let entry: SubmitLeaderboardEntryResponseDto = self
            .get(
                REQUEST_SUBMIT_LEADERBOARD_ENTRY,
                authenticated(
                    &user_auth,
                    vec![
                        (PARAMETER_LEADERBOARD_ID, leaderboard_id.to_string()),
                        (PARAMETER_SCORE, value.to_string()),
                        (PARAMETER_SIGNATURE, signature),
                    ],
                ),
            )
            .await?;

        let response = entry.response;
        Ok(SubmitLeaderboardEntryResponse {
            game_id: GameId(response.leaderboard_data.game_id),
            title: response.leaderboard_data.title,
            formatted_score: response.score_formatted,
            rank: response.rank_info.rank,
            num_entries: response.rank_info.num_entries,
        })
    }

    // Should be sent every 2 minutes with rich presence, every 4 minutes without
    pub async fn send_ping(
        &self,
        game_id: GameId,
        rich_presence_description: Option<&str>,
    ) -> Result<(), ApiError> {
        let user_auth = self.require_user_auth()?;
        let mut parameters = vec![(PARAMETER_GAME_ID, game_id.to_string())];
        if let Some(description) = rich_presence_description {
            parameters.push((PARAMETER_RICH_PRESENCE, description.to_string()));
        }

        let _: IgnoredAny = self
            .post(REQUEST_PING, authenticated(&user_auth, parameters))
            .await?;
        Ok(())
    }

    fn require_user_auth(&self) -> Result<UserAuth, ApiError> {
        self.auth_store
            .get_user_auth()
            .ok_or(ApiError::NotAuthenticated)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        request: &'static str,
        parameters: Parameters,
    ) -> Result<T, ApiError> {
        self.get_with(request, parameters, reject_unsuccessful::<T>)
            .await
    }

    async fn get_with<T, H>(
        &self,
        request: &'static str,
        parameters: Parameters,
        error_handler: H,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        H: FnOnce(String) -> Result<T, ApiError>,
    {
        log::debug!("[ra-api] GET r={}", request);
        let parameters = with_request(request, parameters);
        let builder = self.client.get(self.base_url.clone()).query(&parameters);
        self.execute(builder, error_handler).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        request: &'static str,
        parameters: Parameters,
    ) -> Result<T, ApiError> {
        log::debug!("[ra-api] POST r={}", request);
        let parameters = with_request(request, parameters);
        let builder = self.client.post(self.base_url.clone()).form(&parameters);
        self.execute(builder, reject_unsuccessful::<T>).await
    }

    async fn execute<T, H>(&self, builder: RequestBuilder, error_handler: H) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        H: FnOnce(String) -> Result<T, ApiError>,
    {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Error replies may come with a non-2xx status but still carry an envelope
        let envelope = match decode_envelope(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ApiError::HttpStatus {
                    status: status.as_u16(),
                })
            }
            Err(e) => return Err(e),
        };

        match envelope {
            Envelope::Success(_) if !status.is_success() => Err(ApiError::HttpStatus {
                status: status.as_u16(),
            }),
            Envelope::Success(json) => {
                serde_json::from_value(json).map_err(|e| ApiError::Parse(e.to_string()))
            }
            Envelope::Failure(reason) => {
                log::debug!("[ra-api] Request unsuccessful: {}", reason);
                error_handler(reason)
            }
        }
    }
}

fn with_request(request: &'static str, mut parameters: Parameters) -> Parameters {
    parameters.insert(0, (PARAMETER_REQUEST, request.to_string()));
    parameters
}

fn authenticated(user_auth: &UserAuth, mut parameters: Parameters) -> Parameters {
    parameters.insert(0, (PARAMETER_USER, user_auth.username.clone()));
    parameters.insert(1, (PARAMETER_TOKEN, user_auth.token.clone()));
    parameters
}

fn hardcore_flag(for_hardcore_mode: bool) -> String {
    let flag = if for_hardcore_mode { "1" } else { "0" };
    flag.to_string()
}

fn reject_unsuccessful<T>(reason: String) -> Result<T, ApiError> {
    Err(ApiError::ServerRejected(reason))
}

fn is_already_awarded(reason: &str) -> bool {
    reason
        .trim()
        .to_ascii_lowercase()
        .starts_with("user already has")
}

fn decode_envelope(body: &str) -> Result<Envelope, ApiError> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| ApiError::Parse(format!("Invalid JSON: {}", e)))?;

    let success = json
        .get("Success")
        .and_then(Value::as_bool)
        .ok_or_else(|| ApiError::Parse("Missing Success flag".to_string()))?;

    if success {
        Ok(Envelope::Success(json))
    } else {
        let reason = json
            .get("Error")
            .and_then(Value::as_str)
            .unwrap_or("Unknown reason")
            .to_string();
        Ok(Envelope::Failure(reason))
    }
}
