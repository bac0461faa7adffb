use super::dto::{AchievementDto, AchievementSetDto, GameAchievementSetsDto, LeaderboardDto};
use super::ApiError;
use crate::models::{
    Achievement, AchievementSet, AchievementSetType, AchievementType, Game, GameId, Leaderboard,
    SetId,
};

impl GameAchievementSetsDto {
    pub(crate) fn into_model(self) -> Result<Game, ApiError> {
        let sets = self
            .sets
            .unwrap_or_default()
            .into_iter()
            .map(AchievementSetDto::into_model)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Game {
            id: GameId(self.id),
            title: self.title,
            icon_url: self.icon_url,
            rich_presence_patch: self.rich_presence_patch.filter(|patch| !patch.is_empty()),
            sets,
        })
    }
}

impl AchievementSetDto {
    fn into_model(self) -> Result<AchievementSet, ApiError> {
        let game_id = GameId(self.game_id);
        let set_id = SetId(self.set_id);
        let set_type = self
            .set_type
            .parse::<AchievementSetType>()
            .map_err(ApiError::Parse)?;

        let achievements = self
            .achievements
            .into_iter()
            .enumerate()
            .map(|(index, achievement)| achievement.into_model(game_id, set_id, index))
            .collect::<Result<Vec<_>, _>>()?;

        let leaderboards = self
            .leaderboards
            .into_iter()
            .map(|leaderboard| leaderboard.into_model(game_id, set_id))
            .collect();

        Ok(AchievementSet {
            id: set_id,
            game_id,
            title: self.title,
            set_type,
            icon_url: self.icon_url,
            achievements,
            leaderboards,
        })
    }
}

impl AchievementDto {
    fn into_model(self, game_id: GameId, set_id: SetId, index: usize) -> Result<Achievement, ApiError> {
        let achievement_type = AchievementType::from_flags(self.flags).ok_or_else(|| {
            ApiError::Parse(format!(
                "Unknown flags {} for achievement {}",
                self.flags, self.id
            ))
        })?;

        Ok(Achievement {
            id: self.id,
            game_id,
            set_id,
            total_awards_casual: self.num_awarded,
            total_awards_hardcore: self.num_awarded_hardcore,
            title: self.title,
            description: self.description,
            points: self.points,
            display_order: self.display_order.unwrap_or(index as i32),
            badge_url_unlocked: self.badge_url,
            badge_url_locked: self.badge_locked_url,
            memory_address: self.memory_address,
            achievement_type,
        })
    }
}

impl LeaderboardDto {
    fn into_model(self, game_id: GameId, set_id: SetId) -> Leaderboard {
        Leaderboard {
            id: self.id,
            game_id,
            set_id,
            memory_address: self.memory_address,
            format: self.format,
            lower_is_better: self.lower_is_better,
            title: self.title,
            description: self.description,
            hidden: self.hidden,
        }
    }
}
