use super::{AchievementStore, CatalogCache, PendingSubmissionQueue, UserProgressCache};
use crate::models::{
    GameHashEntry, GameSetMetadata, PendingAchievementSubmission, UserAchievementUnlock,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rcheevos_api::{Achievement, Game, GameId, Leaderboard};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which categories of server-authoritative data may outlive a session.
///
/// The catalog, the hash library and unlock rows are always cached.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CachePolicy {
    pub persist_freshness_metadata: bool,
    pub persist_pending_submissions: bool,
}

impl CachePolicy {
    /// Nothing beyond the static catalog is persisted
    pub fn compliant() -> Self {
        Self::default()
    }

    pub fn persist_all() -> Self {
        Self {
            persist_freshness_metadata: true,
            persist_pending_submissions: true,
        }
    }
}

/// Forwards to one underlying store, dropping the writes `policy` forbids
#[derive(Clone)]
pub struct PolicyAchievementsDao {
    inner: Arc<dyn AchievementStore>,
    policy: CachePolicy,
}

impl PolicyAchievementsDao {
    pub fn new(inner: Arc<dyn AchievementStore>, policy: CachePolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl CatalogCache for PolicyAchievementsDao {
    async fn get_game(&self, game_id: GameId) -> Result<Option<Game>> {
        self.inner.get_game(game_id).await
    }

    async fn update_game_data(&self, game: &Game) -> Result<()> {
        self.inner.update_game_data(game).await
    }

    async fn get_achievement(&self, achievement_id: i64) -> Result<Option<Achievement>> {
        self.inner.get_achievement(achievement_id).await
    }

    async fn get_leaderboard(&self, leaderboard_id: i64) -> Result<Option<Leaderboard>> {
        self.inner.get_leaderboard(leaderboard_id).await
    }

    async fn get_game_hash_entry(&self, game_hash: &str) -> Result<Option<GameHashEntry>> {
        self.inner.get_game_hash_entry(game_hash).await
    }

    async fn update_game_hash_library(&self, entries: Vec<GameHashEntry>) -> Result<()> {
        self.inner.update_game_hash_library(entries).await
    }

    async fn get_hash_library_refreshed_at(&self) -> Result<Option<NaiveDateTime>> {
        self.inner.get_hash_library_refreshed_at().await
    }
}

#[async_trait]
impl UserProgressCache for PolicyAchievementsDao {
    async fn get_user_unlocks(
        &self,
        game_id: GameId,
        for_hardcore_mode: bool,
    ) -> Result<Vec<UserAchievementUnlock>> {
        self.inner.get_user_unlocks(game_id, for_hardcore_mode).await
    }

    async fn update_user_unlocks(
        &self,
        game_id: GameId,
        for_hardcore_mode: bool,
        unlocked_achievement_ids: Vec<i64>,
    ) -> Result<()> {
        self.inner
            .update_user_unlocks(game_id, for_hardcore_mode, unlocked_achievement_ids)
            .await
    }

    async fn add_user_unlock(&self, unlock: UserAchievementUnlock) -> Result<()> {
        self.inner.add_user_unlock(unlock).await
    }

    async fn get_game_set_metadata(&self, game_id: GameId) -> Result<Option<GameSetMetadata>> {
        self.inner.get_game_set_metadata(game_id).await
    }

    async fn update_achievement_set_refreshed_at(
        &self,
        game_id: GameId,
        refreshed_at: NaiveDateTime,
    ) -> Result<()> {
        if !self.policy.persist_freshness_metadata {
            return Ok(());
        }
        self.inner
            .update_achievement_set_refreshed_at(game_id, refreshed_at)
            .await
    }

    async fn update_user_data_refreshed_at(
        &self,
        game_id: GameId,
        for_hardcore_mode: bool,
        refreshed_at: NaiveDateTime,
    ) -> Result<()> {
        if !self.policy.persist_freshness_metadata {
            return Ok(());
        }
        self.inner
            .update_user_data_refreshed_at(game_id, for_hardcore_mode, refreshed_at)
            .await
    }

    async fn delete_all_user_data(&self) -> Result<()> {
        self.inner.delete_all_user_data().await
    }
}

#[async_trait]
impl PendingSubmissionQueue for PolicyAchievementsDao {
    async fn enqueue(&self, submission: &PendingAchievementSubmission) -> Result<()> {
        if !self.policy.persist_pending_submissions {
            return Ok(());
        }
        self.inner.enqueue(submission).await
    }

    async fn list_pending(&self) -> Result<Vec<PendingAchievementSubmission>> {
        self.inner.list_pending().await
    }

    async fn remove(&self, submission: &PendingAchievementSubmission) -> Result<()> {
        if !self.policy.persist_pending_submissions {
            return Ok(());
        }
        self.inner.remove(submission).await
    }
}
