use super::{CatalogCache, PendingSubmissionQueue, UserProgressCache};
use crate::models::{
    AchievementEntity, AchievementSetEntity, GameCatalogRows, GameEntity, GameHashEntry,
    GameSetMetadata, LeaderboardEntity, PendingAchievementSubmission, UserAchievementUnlock,
};
use crate::schema::{
    ra_achievement, ra_achievement_set, ra_game, ra_game_hash_library, ra_game_set_metadata,
    ra_hash_library_metadata, ra_leaderboard, ra_pending_achievement_award, ra_user_achievement,
};
use crate::utils::db::DbPool;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use rcheevos_api::{Achievement, Game, GameId, Leaderboard};

// Stays well below SQLite's bound-parameter limit
const INSERT_CHUNK_SIZE: usize = 500;

// The library timestamp table holds a single row
const HASH_LIBRARY_METADATA_ROW: i32 = 1;

/// All achievement stores backed by one SQLite pool
#[derive(Clone)]
pub struct SqliteAchievementsDao {
    pool: DbPool,
}

impl SqliteAchievementsDao {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run Diesel work on the blocking pool
    async fn with_conn<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().context("Failed to get database connection")?;
            work(&mut conn)
        })
        .await
        .context("Database task failed")?
    }
}

fn load_game(conn: &mut SqliteConnection, game_id: i64) -> QueryResult<Option<GameCatalogRows>> {
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let game = ra_game::table
            .find(game_id)
            .select(GameEntity::as_select())
            .first(conn)
            .optional()?;
        let Some(game) = game else {
            return Ok(None);
        };

        let sets = ra_achievement_set::table
            .filter(ra_achievement_set::owner_game_id.eq(game_id))
            .order(ra_achievement_set::id)
            .select(AchievementSetEntity::as_select())
            .load(conn)?;
        let set_ids: Vec<i64> = sets.iter().map(|set| set.id).collect();

        let achievements = ra_achievement::table
            .filter(ra_achievement::set_id.eq_any(set_ids.clone()))
            .select(AchievementEntity::as_select())
            .load(conn)?;
        let leaderboards = ra_leaderboard::table
            .filter(ra_leaderboard::set_id.eq_any(set_ids))
            .order(ra_leaderboard::id)
            .select(LeaderboardEntity::as_select())
            .load(conn)?;

        Ok(Some(GameCatalogRows {
            game,
            sets,
            achievements,
            leaderboards,
        }))
    })
}

fn replace_game(conn: &mut SqliteConnection, rows: &GameCatalogRows) -> QueryResult<()> {
    let game_id = rows.game.id;

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let mut stale_set_ids: Vec<i64> = ra_achievement_set::table
            .filter(ra_achievement_set::owner_game_id.eq(game_id))
            .select(ra_achievement_set::id)
            .load(conn)?;
        // A set id may also move over from another owner's catalog
        stale_set_ids.extend(rows.sets.iter().map(|set| set.id));

        // Children go first so the result does not depend on foreign key enforcement
        diesel::delete(
            ra_achievement::table.filter(ra_achievement::set_id.eq_any(stale_set_ids.clone())),
        )
        .execute(conn)?;
        diesel::delete(
            ra_leaderboard::table.filter(ra_leaderboard::set_id.eq_any(stale_set_ids.clone())),
        )
        .execute(conn)?;
        diesel::delete(
            ra_achievement_set::table.filter(ra_achievement_set::id.eq_any(stale_set_ids)),
        )
        .execute(conn)?;

        for set in &rows.sets {
            diesel::replace_into(ra_achievement_set::table)
                .values(set)
                .execute(conn)?;
        }
        for achievement in &rows.achievements {
            diesel::replace_into(ra_achievement::table)
                .values(achievement)
                .execute(conn)?;
        }
        for leaderboard in &rows.leaderboards {
            diesel::replace_into(ra_leaderboard::table)
                .values(leaderboard)
                .execute(conn)?;
        }

        diesel::insert_into(ra_game::table)
            .values(&rows.game)
            .on_conflict(ra_game::id)
            .do_update()
            .set(&rows.game)
            .execute(conn)?;

        Ok(())
    })
}

#[async_trait]
impl CatalogCache for SqliteAchievementsDao {
    async fn get_game(&self, game_id: GameId) -> Result<Option<Game>> {
        let rows = self
            .with_conn(move |conn| {
                load_game(conn, game_id.0)
                    .with_context(|| format!("Failed to load game {}", game_id))
            })
            .await?;

        rows.map(GameCatalogRows::into_model).transpose()
    }

    async fn update_game_data(&self, game: &Game) -> Result<()> {
        let rows = GameCatalogRows::from(game);
        let game_id = game.id;
        self.with_conn(move |conn| {
            replace_game(conn, &rows)
                .with_context(|| format!("Failed to replace catalog of game {}", game_id))
        })
        .await?;

        log::debug!("[ra-db] Replaced catalog of game {}", game_id);
        Ok(())
    }

    async fn get_achievement(&self, achievement_id: i64) -> Result<Option<Achievement>> {
        let entity = self
            .with_conn(move |conn| {
                ra_achievement::table
                    .find(achievement_id)
                    .select(AchievementEntity::as_select())
                    .first(conn)
                    .optional()
                    .context("Failed to load achievement")
            })
            .await?;

        entity.map(Achievement::try_from).transpose()
    }

    async fn get_leaderboard(&self, leaderboard_id: i64) -> Result<Option<Leaderboard>> {
        let entity = self
            .with_conn(move |conn| {
                ra_leaderboard::table
                    .find(leaderboard_id)
                    .select(LeaderboardEntity::as_select())
                    .first(conn)
                    .optional()
                    .context("Failed to load leaderboard")
            })
            .await?;

        Ok(entity.map(Leaderboard::from))
    }

    async fn get_game_hash_entry(&self, game_hash: &str) -> Result<Option<GameHashEntry>> {
        let game_hash = game_hash.to_ascii_lowercase();
        self.with_conn(move |conn| {
            ra_game_hash_library::table
                .find(game_hash)
                .select(GameHashEntry::as_select())
                .first(conn)
                .optional()
                .context("Failed to look up game hash")
        })
        .await
    }

    async fn update_game_hash_library(&self, entries: Vec<GameHashEntry>) -> Result<()> {
        let count = entries.len();
        let refreshed_at = chrono::Utc::now().naive_utc();
        self.with_conn(move |conn| {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                diesel::delete(ra_game_hash_library::table).execute(conn)?;
                for chunk in entries.chunks(INSERT_CHUNK_SIZE) {
                    diesel::insert_or_ignore_into(ra_game_hash_library::table)
                        .values(chunk)
                        .execute(conn)?;
                }
                diesel::replace_into(ra_hash_library_metadata::table)
                    .values((
                        ra_hash_library_metadata::id.eq(HASH_LIBRARY_METADATA_ROW),
                        ra_hash_library_metadata::last_refreshed_at.eq(refreshed_at),
                    ))
                    .execute(conn)?;
                Ok(())
            })
            .context("Failed to replace game hash library")
        })
        .await?;

        log::info!("[ra-db] Stored game hash library with {} entries", count);
        Ok(())
    }

    async fn get_hash_library_refreshed_at(&self) -> Result<Option<NaiveDateTime>> {
        self.with_conn(|conn| {
            ra_hash_library_metadata::table
                .find(HASH_LIBRARY_METADATA_ROW)
                .select(ra_hash_library_metadata::last_refreshed_at)
                .first(conn)
                .optional()
                .context("Failed to read hash library refresh time")
        })
        .await
    }
}

#[async_trait]
impl UserProgressCache for SqliteAchievementsDao {
    async fn get_user_unlocks(
        &self,
        game_id: GameId,
        for_hardcore_mode: bool,
    ) -> Result<Vec<UserAchievementUnlock>> {
        self.with_conn(move |conn| {
            ra_user_achievement::table
                .filter(ra_user_achievement::game_id.eq(game_id.0))
                .filter(ra_user_achievement::is_hardcore.eq(for_hardcore_mode))
                .order(ra_user_achievement::achievement_id)
                .select(UserAchievementUnlock::as_select())
                .load(conn)
                .context("Failed to load user unlocks")
        })
        .await
    }

    async fn update_user_unlocks(
        &self,
        game_id: GameId,
        for_hardcore_mode: bool,
        unlocked_achievement_ids: Vec<i64>,
    ) -> Result<()> {
        let rows: Vec<UserAchievementUnlock> = unlocked_achievement_ids
            .into_iter()
            .map(|id| UserAchievementUnlock::unlocked(game_id, id, for_hardcore_mode))
            .collect();

        self.with_conn(move |conn| {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                diesel::delete(
                    ra_user_achievement::table
                        .filter(ra_user_achievement::game_id.eq(game_id.0))
                        .filter(ra_user_achievement::is_hardcore.eq(for_hardcore_mode)),
                )
                .execute(conn)?;
                for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
                    diesel::insert_or_ignore_into(ra_user_achievement::table)
                        .values(chunk)
                        .execute(conn)?;
                }
                Ok(())
            })
            .context("Failed to replace user unlocks")
        })
        .await
    }

    async fn add_user_unlock(&self, unlock: UserAchievementUnlock) -> Result<()> {
        self.with_conn(move |conn| {
            diesel::replace_into(ra_user_achievement::table)
                .values(&unlock)
                .execute(conn)
                .context("Failed to store user unlock")?;
            Ok(())
        })
        .await
    }

    async fn get_game_set_metadata(&self, game_id: GameId) -> Result<Option<GameSetMetadata>> {
        self.with_conn(move |conn| {
            ra_game_set_metadata::table
                .find(game_id.0)
                .select(GameSetMetadata::as_select())
                .first(conn)
                .optional()
                .context("Failed to load game set metadata")
        })
        .await
    }

    async fn update_achievement_set_refreshed_at(
        &self,
        game_id: GameId,
        refreshed_at: NaiveDateTime,
    ) -> Result<()> {
        let mut row = GameSetMetadata::empty(game_id);
        row.last_achievement_set_refreshed_at = Some(refreshed_at);

        self.with_conn(move |conn| {
            diesel::insert_into(ra_game_set_metadata::table)
                .values(&row)
                .on_conflict(ra_game_set_metadata::game_id)
                .do_update()
                .set(ra_game_set_metadata::last_achievement_set_refreshed_at.eq(Some(refreshed_at)))
                .execute(conn)
                .context("Failed to update achievement set timestamp")?;
            Ok(())
        })
        .await
    }

    async fn update_user_data_refreshed_at(
        &self,
        game_id: GameId,
        for_hardcore_mode: bool,
        refreshed_at: NaiveDateTime,
    ) -> Result<()> {
        use crate::schema::ra_game_set_metadata::dsl as metadata;

        let mut row = GameSetMetadata::empty(game_id);
        if for_hardcore_mode {
            row.last_hardcore_user_data_refreshed_at = Some(refreshed_at);
        } else {
            row.last_softcore_user_data_refreshed_at = Some(refreshed_at);
        }

        self.with_conn(move |conn| {
            let upsert = diesel::insert_into(metadata::ra_game_set_metadata)
                .values(&row)
                .on_conflict(metadata::game_id)
                .do_update();
            let result = if for_hardcore_mode {
                upsert
                    .set(metadata::last_hardcore_user_data_refreshed_at.eq(Some(refreshed_at)))
                    .execute(conn)
            } else {
                upsert
                    .set(metadata::last_softcore_user_data_refreshed_at.eq(Some(refreshed_at)))
                    .execute(conn)
            };
            result.context("Failed to update user data timestamp")?;
            Ok(())
        })
        .await
    }

    async fn delete_all_user_data(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                diesel::delete(ra_user_achievement::table).execute(conn)?;
                diesel::update(ra_game_set_metadata::table)
                    .set((
                        ra_game_set_metadata::last_softcore_user_data_refreshed_at
                            .eq(None::<NaiveDateTime>),
                        ra_game_set_metadata::last_hardcore_user_data_refreshed_at
                            .eq(None::<NaiveDateTime>),
                    ))
                    .execute(conn)?;
                diesel::delete(ra_pending_achievement_award::table).execute(conn)?;
                Ok(())
            })
            .context("Failed to delete user data")
        })
        .await?;

        log::info!("[ra-db] Cleared all user achievement data");
        Ok(())
    }
}

#[async_trait]
impl PendingSubmissionQueue for SqliteAchievementsDao {
    async fn enqueue(&self, submission: &PendingAchievementSubmission) -> Result<()> {
        let submission = submission.clone();
        self.with_conn(move |conn| {
            diesel::insert_into(ra_pending_achievement_award::table)
                .values(&submission)
                .on_conflict((
                    ra_pending_achievement_award::achievement_id,
                    ra_pending_achievement_award::for_hardcore_mode,
                ))
                .do_nothing()
                .execute(conn)
                .context("Failed to enqueue achievement award")?;
            Ok(())
        })
        .await
    }

    async fn list_pending(&self) -> Result<Vec<PendingAchievementSubmission>> {
        self.with_conn(|conn| {
            ra_pending_achievement_award::table
                .order((
                    ra_pending_achievement_award::created_at,
                    ra_pending_achievement_award::achievement_id,
                ))
                .select(PendingAchievementSubmission::as_select())
                .load(conn)
                .context("Failed to list pending awards")
        })
        .await
    }

    async fn remove(&self, submission: &PendingAchievementSubmission) -> Result<()> {
        let (achievement_id, for_hardcore_mode) = submission.key();
        self.with_conn(move |conn| {
            diesel::delete(
                ra_pending_achievement_award::table
                    .find((achievement_id, for_hardcore_mode)),
            )
            .execute(conn)
            .context("Failed to remove pending award")?;
            Ok(())
        })
        .await
    }
}
