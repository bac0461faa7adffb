use crate::schema::{ra_game_hash_library, ra_game_set_metadata, ra_user_achievement};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use rcheevos_api::GameId;
use serde::{Deserialize, Serialize};

/// Unlock state of one achievement in one mode.
///
/// Casual and hardcore unlocks are separate rows and are never merged.
#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = ra_user_achievement)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserAchievementUnlock {
    pub game_id: i64,
    pub achievement_id: i64,
    pub is_hardcore: bool,
    pub is_unlocked: bool,
}

impl UserAchievementUnlock {
    pub fn unlocked(game_id: GameId, achievement_id: i64, is_hardcore: bool) -> Self {
        Self {
            game_id: game_id.0,
            achievement_id,
            is_hardcore,
            is_unlocked: true,
        }
    }
}

/// Refresh timestamps for a game's catalog and for each user-data mode
#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = ra_game_set_metadata)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GameSetMetadata {
    pub game_id: i64,
    pub last_achievement_set_refreshed_at: Option<NaiveDateTime>,
    pub last_softcore_user_data_refreshed_at: Option<NaiveDateTime>,
    pub last_hardcore_user_data_refreshed_at: Option<NaiveDateTime>,
}

impl GameSetMetadata {
    pub fn empty(game_id: GameId) -> Self {
        Self {
            game_id: game_id.0,
            last_achievement_set_refreshed_at: None,
            last_softcore_user_data_refreshed_at: None,
            last_hardcore_user_data_refreshed_at: None,
        }
    }

    pub fn user_data_refreshed_at(&self, for_hardcore_mode: bool) -> Option<NaiveDateTime> {
        if for_hardcore_mode {
            self.last_hardcore_user_data_refreshed_at
        } else {
            self.last_softcore_user_data_refreshed_at
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = ra_game_hash_library)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GameHashEntry {
    pub game_hash: String,
    pub game_id: i64,
}
