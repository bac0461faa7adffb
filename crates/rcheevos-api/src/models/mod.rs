//! Domain models returned by the protocol client

mod achievement;
mod game;
mod responses;

pub use achievement::{Achievement, AchievementType, Leaderboard};
pub use game::{AchievementSet, AchievementSetType, Game, GameId, SetId};
pub use responses::{AwardAchievementResponse, SubmitLeaderboardEntryResponse};

use serde::{Deserialize, Serialize};

/// Credential of the logged in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAuth {
    pub username: String,
    pub token: String,
}

impl UserAuth {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }
}
