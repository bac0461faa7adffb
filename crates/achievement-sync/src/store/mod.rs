//! Durable achievement stores.
//!
//! The three traits split the database by concern. [`SqliteAchievementsDao`]
//! implements all of them against one pool; [`PolicyAchievementsDao`] wraps
//! any implementation and drops the writes a [`CachePolicy`] does not allow.

mod policy;
mod sqlite;

pub use policy::{CachePolicy, PolicyAchievementsDao};
pub use sqlite::SqliteAchievementsDao;

use crate::models::{
    GameHashEntry, GameSetMetadata, PendingAchievementSubmission, UserAchievementUnlock,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rcheevos_api::{Achievement, Game, GameId, Leaderboard};

/// Static per-game data and the ROM hash library
#[async_trait]
pub trait CatalogCache: Send + Sync {
    async fn get_game(&self, game_id: GameId) -> Result<Option<Game>>;

    /// Replace every set, achievement and leaderboard of the game in one transaction
    async fn update_game_data(&self, game: &Game) -> Result<()>;

    async fn get_achievement(&self, achievement_id: i64) -> Result<Option<Achievement>>;

    async fn get_leaderboard(&self, leaderboard_id: i64) -> Result<Option<Leaderboard>>;

    async fn get_game_hash_entry(&self, game_hash: &str) -> Result<Option<GameHashEntry>>;

    /// Swap the whole library for `entries` and stamp the refresh time. Never patched row by row.
    async fn update_game_hash_library(&self, entries: Vec<GameHashEntry>) -> Result<()>;

    /// When the library was last swapped, `None` if it never was
    async fn get_hash_library_refreshed_at(&self) -> Result<Option<NaiveDateTime>>;
}

/// Per-user unlock state and refresh timestamps
#[async_trait]
pub trait UserProgressCache: Send + Sync {
    async fn get_user_unlocks(
        &self,
        game_id: GameId,
        for_hardcore_mode: bool,
    ) -> Result<Vec<UserAchievementUnlock>>;

    /// Replace the unlock rows of one mode, leaving the other mode untouched
    async fn update_user_unlocks(
        &self,
        game_id: GameId,
        for_hardcore_mode: bool,
        unlocked_achievement_ids: Vec<i64>,
    ) -> Result<()>;

    async fn add_user_unlock(&self, unlock: UserAchievementUnlock) -> Result<()>;

    async fn get_game_set_metadata(&self, game_id: GameId) -> Result<Option<GameSetMetadata>>;

    async fn update_achievement_set_refreshed_at(
        &self,
        game_id: GameId,
        refreshed_at: NaiveDateTime,
    ) -> Result<()>;

    async fn update_user_data_refreshed_at(
        &self,
        game_id: GameId,
        for_hardcore_mode: bool,
        refreshed_at: NaiveDateTime,
    ) -> Result<()>;

    /// Drop unlocks, user-data timestamps and queued awards
    async fn delete_all_user_data(&self) -> Result<()>;
}

/// Awards waiting for server confirmation
#[async_trait]
pub trait PendingSubmissionQueue: Send + Sync {
    /// At most one row per (achievement, mode); re-enqueueing is a no-op
    async fn enqueue(&self, submission: &PendingAchievementSubmission) -> Result<()>;

    async fn list_pending(&self) -> Result<Vec<PendingAchievementSubmission>>;

    async fn remove(&self, submission: &PendingAchievementSubmission) -> Result<()>;
}

pub trait AchievementStore: CatalogCache + UserProgressCache + PendingSubmissionQueue {}

impl<T> AchievementStore for T where T: CatalogCache + UserProgressCache + PendingSubmissionQueue {}
