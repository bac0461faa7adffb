use crate::schema::ra_pending_achievement_award;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use rcheevos_api::GameId;
use serde::{Deserialize, Serialize};

/// An award that the server has not confirmed yet
#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = ra_pending_achievement_award)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PendingAchievementSubmission {
    pub achievement_id: i64,
    pub for_hardcore_mode: bool,
    pub game_id: i64,
    pub created_at: NaiveDateTime,
}

impl PendingAchievementSubmission {
    pub fn new(achievement_id: i64, game_id: GameId, for_hardcore_mode: bool) -> Self {
        Self {
            achievement_id,
            for_hardcore_mode,
            game_id: game_id.0,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Queue identity. `game_id` and `created_at` are payload.
    pub fn key(&self) -> (i64, bool) {
        (self.achievement_id, self.for_hardcore_mode)
    }
}
