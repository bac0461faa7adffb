//! Wire formats of the request endpoint. Field names follow the server's casing.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub(crate) struct UserLoginDto {
    #[serde(rename = "User")]
    pub user: Option<String>,
    #[serde(rename = "Token")]
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HashLibraryDto {
    #[serde(rename = "MD5List", default)]
    pub md5_list: HashMap<String, i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserUnlocksDto {
    #[serde(rename = "UserUnlocks", default)]
    pub user_unlocks: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GameAchievementSetsDto {
    #[serde(rename = "GameId")]
    pub id: i64,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "ImageIconUrl", default)]
    pub icon_url: String,
    #[serde(rename = "RichPresencePatch")]
    pub rich_presence_patch: Option<String>,
    #[serde(rename = "Sets")]
    pub sets: Option<Vec<AchievementSetDto>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AchievementSetDto {
    #[serde(rename = "GameId")]
    pub game_id: i64,
    #[serde(rename = "AchievementSetId")]
    pub set_id: i64,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Type")]
    pub set_type: String,
    #[serde(rename = "ImageIconUrl", default)]
    pub icon_url: String,
    #[serde(rename = "Achievements", default)]
    pub achievements: Vec<AchievementDto>,
    #[serde(rename = "Leaderboards", default)]
    pub leaderboards: Vec<LeaderboardDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AchievementDto {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "MemAddr")]
    pub memory_address: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Points")]
    pub points: i32,
    #[serde(rename = "Flags")]
    pub flags: i32,
    #[serde(rename = "NumAwarded", default)]
    pub num_awarded: i32,
    #[serde(rename = "NumAwardedHardcore", default)]
    pub num_awarded_hardcore: i32,
    #[serde(rename = "DisplayOrder")]
    pub display_order: Option<i32>,
    #[serde(rename = "BadgeURL", default)]
    pub badge_url: String,
    #[serde(rename = "BadgeLockedURL", default)]
    pub badge_locked_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaderboardDto {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Mem")]
    pub memory_address: String,
    #[serde(rename = "Format")]
    pub format: String,
    #[serde(rename = "LowerIsBetter", deserialize_with = "bool_from_int_or_bool")]
    pub lower_is_better: bool,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Hidden", default, deserialize_with = "bool_from_int_or_bool")]
    pub hidden: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AwardAchievementDto {
    #[serde(rename = "AchievementsRemaining")]
    pub achievements_remaining: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitLeaderboardEntryResponseDto {
    #[serde(rename = "Response")]
    pub response: LeaderboardEntryDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaderboardEntryDto {
    #[serde(rename = "LBData")]
    pub leaderboard_data: LeaderboardDataDto,
    #[serde(rename = "ScoreFormatted")]
    pub score_formatted: String,
    #[serde(rename = "RankInfo")]
    pub rank_info: RankInfoDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaderboardDataDto {
    #[serde(rename = "GameID")]
    pub game_id: i64,
    #[serde(rename = "Title")]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RankInfoDto {
    #[serde(rename = "NumEntries")]
    pub num_entries: u32,
    #[serde(rename = "Rank")]
    pub rank: u32,
}

/// The server encodes some flags as `0`/`1` and others as JSON booleans
fn bool_from_int_or_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
    })
}
