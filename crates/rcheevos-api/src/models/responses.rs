use super::game::GameId;
use serde::{Deserialize, Serialize};

/// Outcome of an achievement award request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardAchievementResponse {
    /// `false` when the server already had the award on record
    pub achievement_awarded: bool,
    pub achievements_remaining: Option<u32>,
}

impl AwardAchievementResponse {
    pub fn already_awarded() -> Self {
        Self {
            achievement_awarded: false,
            achievements_remaining: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitLeaderboardEntryResponse {
    pub game_id: GameId,
    pub title: String,
    pub formatted_score: String,
    pub rank: u32,
    pub num_entries: u32,
}
