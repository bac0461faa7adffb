use rcheevos_api::{
    Achievement, AchievementSet, AchievementSetType, AchievementType, GameId, Leaderboard,
};
use std::collections::HashSet;
use serde::{Deserialize, Serialize};

/// An achievement paired with the user's unlock state for the requested mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAchievement {
    pub achievement: Achievement,
    pub is_unlocked: bool,
    pub for_hardcore_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAchievementSet {
    pub id: i64,
    pub title: Option<String>,
    pub set_type: AchievementSetType,
    pub icon_url: String,
    pub achievements: Vec<UserAchievement>,
    pub leaderboards: Vec<Leaderboard>,
}

/// Everything a frontend needs to show a game's achievement list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGameData {
    pub game_id: GameId,
    pub title: String,
    pub icon_url: String,
    pub rich_presence_patch: Option<String>,
    pub sets: Vec<UserAchievementSet>,
}

impl UserGameData {
    /// Official achievements of every set, unofficial ones left out
    pub fn official_achievements(&self) -> Vec<UserAchievement> {
        self.sets
            .iter()
            .flat_map(|set| set.achievements.iter())
            .filter(|a| a.achievement.achievement_type == AchievementType::Core)
            .cloned()
            .collect()
    }

    pub fn set_of_type(&self, set_type: AchievementSetType) -> Option<&UserAchievementSet> {
        self.sets.iter().find(|set| set.set_type == set_type)
    }

    pub fn unlocked_count(&self) -> usize {
        self.sets
            .iter()
            .flat_map(|set| set.achievements.iter())
            .filter(|a| a.is_unlocked)
            .count()
    }
}

impl UserAchievementSet {
    pub(crate) fn from_set(
        set: AchievementSet,
        unlocked: &HashSet<i64>,
        for_hardcore_mode: bool,
    ) -> Self {
        UserAchievementSet {
            id: set.id.0,
            title: set.title,
            set_type: set.set_type,
            icon_url: set.icon_url,
            achievements: set
                .achievements
                .into_iter()
                .map(|achievement| UserAchievement {
                    is_unlocked: unlocked.contains(&achievement.id),
                    achievement,
                    for_hardcore_mode,
                })
                .collect(),
            leaderboards: set.leaderboards,
        }
    }
}

/// Cache-only summary of a game, no network involved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_id: GameId,
    pub title: String,
    pub icon_url: String,
    pub total_achievements: usize,
    pub total_points: i32,
    pub unlocked_casual: usize,
    pub unlocked_hardcore: usize,
}
