use crate::schema::{ra_achievement, ra_achievement_set, ra_game, ra_leaderboard};
use anyhow::anyhow;
use diesel::prelude::*;
use rcheevos_api::{
    Achievement, AchievementSet, AchievementSetType, AchievementType, Game, GameId, Leaderboard,
    SetId,
};
use serde::{Deserialize, Serialize};

/// Cached game row. Sets and their children live in their own tables.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = ra_game)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GameEntity {
    pub id: i64,
    pub title: String,
    pub icon_url: String,
    pub rich_presence_patch: Option<String>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = ra_achievement_set)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AchievementSetEntity {
    pub id: i64,
    pub owner_game_id: i64,
    pub game_id: i64,
    pub title: Option<String>,
    pub set_type: String,
    pub icon_url: String,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = ra_achievement)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AchievementEntity {
    pub id: i64,
    pub game_id: i64,
    pub set_id: i64,
    pub total_awards_casual: i32,
    pub total_awards_hardcore: i32,
    pub title: String,
    pub description: String,
    pub points: i32,
    pub display_order: i32,
    pub badge_url_unlocked: String,
    pub badge_url_locked: String,
    pub memory_address: String,
    pub achievement_type: i32,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = ra_leaderboard)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LeaderboardEntity {
    pub id: i64,
    pub game_id: i64,
    pub set_id: i64,
    pub memory_address: String,
    pub format: String,
    pub lower_is_better: bool,
    pub title: String,
    pub description: String,
    pub hidden: bool,
}

/// A full catalog snapshot split into rows, ready to be written in one transaction
#[derive(Debug, Clone)]
pub struct GameCatalogRows {
    pub game: GameEntity,
    pub sets: Vec<AchievementSetEntity>,
    pub achievements: Vec<AchievementEntity>,
    pub leaderboards: Vec<LeaderboardEntity>,
}

impl From<&Game> for GameCatalogRows {
    fn from(game: &Game) -> Self {
        GameCatalogRows {
            game: GameEntity {
                id: game.id.0,
                title: game.title.clone(),
                icon_url: game.icon_url.clone(),
                rich_presence_patch: game.rich_presence_patch.clone(),
            },
            sets: game
                .sets
                .iter()
                .map(|set| AchievementSetEntity::owned_by(game.id, set))
                .collect(),
            achievements: game.achievements().map(AchievementEntity::from).collect(),
            leaderboards: game.leaderboards().map(LeaderboardEntity::from).collect(),
        }
    }
}

impl GameCatalogRows {
    /// Reassemble the domain model. Children are grouped under their owning set.
    pub fn into_model(self) -> anyhow::Result<Game> {
        let mut achievements = self
            .achievements
            .into_iter()
            .map(Achievement::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        achievements.sort_by_key(|a| (a.display_order, a.id));

        let mut leaderboards: Vec<Leaderboard> =
            self.leaderboards.into_iter().map(Leaderboard::from).collect();

        let mut sets = Vec::with_capacity(self.sets.len());
        for set in self.sets {
            let set_id = SetId(set.id);
            let mut model = AchievementSet::try_from(set)?;
            model.achievements = achievements
                .iter()
                .filter(|a| a.set_id == set_id)
                .cloned()
                .collect();
            let (owned, rest): (Vec<_>, Vec<_>) =
                leaderboards.into_iter().partition(|l| l.set_id == set_id);
            model.leaderboards = owned;
            leaderboards = rest;
            sets.push(model);
        }

        Ok(Game {
            id: GameId(self.game.id),
            title: self.game.title,
            icon_url: self.game.icon_url,
            rich_presence_patch: self.game.rich_presence_patch,
            sets,
        })
    }
}

impl AchievementSetEntity {
    /// Row for `set` as part of the catalog of `owner`. Subsets keep their own `game_id`.
    pub fn owned_by(owner: GameId, set: &AchievementSet) -> Self {
        AchievementSetEntity {
            id: set.id.0,
            owner_game_id: owner.0,
            game_id: set.game_id.0,
            title: set.title.clone(),
            set_type: set.set_type.as_str().to_string(),
            icon_url: set.icon_url.clone(),
        }
    }
}

impl TryFrom<AchievementSetEntity> for AchievementSet {
    type Error = anyhow::Error;

    fn try_from(entity: AchievementSetEntity) -> anyhow::Result<Self> {
        let set_type = entity
            .set_type
            .parse::<AchievementSetType>()
            .map_err(|e| anyhow!(e))?;

        Ok(AchievementSet {
            id: SetId(entity.id),
            game_id: GameId(entity.game_id),
            title: entity.title,
            set_type,
            icon_url: entity.icon_url,
            achievements: Vec::new(),
            leaderboards: Vec::new(),
        })
    }
}

impl From<&Achievement> for AchievementEntity {
    fn from(achievement: &Achievement) -> Self {
        AchievementEntity {
            id: achievement.id,
            game_id: achievement.game_id.0,
            set_id: achievement.set_id.0,
            total_awards_casual: achievement.total_awards_casual,
            total_awards_hardcore: achievement.total_awards_hardcore,
            title: achievement.title.clone(),
            description: achievement.description.clone(),
            points: achievement.points,
            display_order: achievement.display_order,
            badge_url_unlocked: achievement.badge_url_unlocked.clone(),
            badge_url_locked: achievement.badge_url_locked.clone(),
            memory_address: achievement.memory_address.clone(),
            achievement_type: achievement.achievement_type.as_i32(),
        }
    }
}

impl TryFrom<AchievementEntity> for Achievement {
    type Error = anyhow::Error;

    fn try_from(entity: AchievementEntity) -> anyhow::Result<Self> {
        let achievement_type = AchievementType::from_i32(entity.achievement_type)
            .ok_or_else(|| anyhow!("Invalid achievement type {}", entity.achievement_type))?;

        Ok(Achievement {
            id: entity.id,
            game_id: GameId(entity.game_id),
            set_id: SetId(entity.set_id),
            total_awards_casual: entity.total_awards_casual,
            total_awards_hardcore: entity.total_awards_hardcore,
            title: entity.title,
            description: entity.description,
            points: entity.points,
            display_order: entity.display_order,
            badge_url_unlocked: entity.badge_url_unlocked,
            badge_url_locked: entity.badge_url_locked,
            memory_address: entity.memory_address,
            achievement_type,
        })
    }
}

impl From<&Leaderboard> for LeaderboardEntity {
    fn from(leaderboard: &Leaderboard) -> Self {
        LeaderboardEntity {
            id: leaderboard.id,
            game_id: leaderboard.game_id.0,
            set_id: leaderboard.set_id.0,
            memory_address: leaderboard.memory_address.clone(),
            format: leaderboard.format.clone(),
            lower_is_better: leaderboard.lower_is_better,
            title: leaderboard.title.clone(),
            description: leaderboard.description.clone(),
            hidden: leaderboard.hidden,
        }
    }
}

impl From<LeaderboardEntity> for Leaderboard {
    fn from(entity: LeaderboardEntity) -> Self {
        Leaderboard {
            id: entity.id,
            game_id: GameId(entity.game_id),
            set_id: SetId(entity.set_id),
            memory_address: entity.memory_address,
            format: entity.format,
            lower_is_better: entity.lower_is_better,
            title: entity.title,
            description: entity.description,
            hidden: entity.hidden,
        }
    }
}
