use super::game::{GameId, SetId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AchievementType {
    Core,
    Unofficial,
}

impl AchievementType {
    /// Flags value used by the remote service for official achievements
    pub const FLAGS_CORE: i32 = 3;
    /// Flags value used by the remote service for unofficial achievements
    pub const FLAGS_UNOFFICIAL: i32 = 5;

    pub fn from_flags(flags: i32) -> Option<Self> {
        match flags {
            Self::FLAGS_CORE => Some(AchievementType::Core),
            Self::FLAGS_UNOFFICIAL => Some(AchievementType::Unofficial),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            AchievementType::Core => 0,
            AchievementType::Unofficial => 1,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(AchievementType::Core),
            1 => Some(AchievementType::Unofficial),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: i64,
    pub game_id: GameId,
    pub set_id: SetId,
    pub total_awards_casual: i32,
    pub total_awards_hardcore: i32,
    pub title: String,
    pub description: String,
    pub points: i32,
    pub display_order: i32,
    pub badge_url_unlocked: String,
    pub badge_url_locked: String,
    /// Memory-watch expression evaluated by the emulation core
    pub memory_address: String,
    pub achievement_type: AchievementType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub id: i64,
    pub game_id: GameId,
    pub set_id: SetId,
    pub memory_address: String,
    pub format: String,
    pub lower_is_better: bool,
    pub title: String,
    pub description: String,
    pub hidden: bool,
}
