//! Sync orchestration
//!
//! [`AchievementRepository`] owns the session state machine and is the only
//! writer of the achievement stores, apart from the retry worker which goes
//! through [`AchievementRepository::submit_pending_achievements`].

mod mapper;
mod session;

pub use session::{ActiveSession, SessionState};

use crate::error::{SyncError, SyncResult};
use crate::models::{
    GameSummary, PendingAchievementSubmission, UserAchievement, UserAchievementUnlock,
    UserGameData,
};
use crate::store::{AchievementStore, CatalogCache, PendingSubmissionQueue, UserProgressCache};
use crate::utils::config::SyncConfig;
use chrono::{Duration, NaiveDateTime, Utc};
use rcheevos_api::{
    Achievement, AwardAchievementResponse, Game, GameId, Leaderboard, RaApi,
    SubmitLeaderboardEntryResponse, UserAuth, UserAuthStore,
};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// How long cached data stays valid before it is fetched again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    pub achievement_set_max_age: Duration,
    pub user_data_max_age: Duration,
    pub hash_library_max_age: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            achievement_set_max_age: Duration::days(7),
            user_data_max_age: Duration::days(1),
            hash_library_max_age: Duration::days(30),
        }
    }
}

impl From<&SyncConfig> for FreshnessPolicy {
    fn from(config: &SyncConfig) -> Self {
        Self {
            achievement_set_max_age: config.achievement_set_max_age(),
            user_data_max_age: config.user_data_max_age(),
            hash_library_max_age: config.hash_library_max_age(),
        }
    }
}

fn needs_refresh(refreshed_at: Option<NaiveDateTime>, max_age: Duration) -> bool {
    match refreshed_at {
        None => true,
        Some(at) => Utc::now().naive_utc() - at >= max_age,
    }
}

/// Result of an unlock signal
#[derive(Debug)]
pub enum AwardOutcome {
    /// The server confirmed the award, possibly as one it already had
    Confirmed(AwardAchievementResponse),
    /// Delivery failed; the award stays queued for the retry worker
    Queued(SyncError),
}

/// What one pass over the pending queue achieved
#[derive(Debug, Default)]
pub struct SubmissionReport {
    pub confirmed: Vec<PendingAchievementSubmission>,
    pub failed: Vec<(PendingAchievementSubmission, SyncError)>,
}

impl SubmissionReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct AchievementRepository {
    api: Arc<RaApi>,
    store: Arc<dyn AchievementStore>,
    freshness: FreshnessPolicy,
    session: Mutex<SessionState>,
    // Held across enqueue/award/remove so the interactive path and the worker never interleave
    submission_lock: Mutex<()>,
    // Raised whenever an award lands in the queue instead of being confirmed
    submission_signal: Arc<Notify>,
}

impl AchievementRepository {
    pub fn new(api: Arc<RaApi>, store: Arc<dyn AchievementStore>, freshness: FreshnessPolicy) -> Self {
        let initial = SessionState::initial(api.auth_store().get_user_auth().is_some());
        Self {
            api,
            store,
            freshness,
            session: Mutex::new(initial),
            submission_lock: Mutex::new(()),
            submission_signal: Arc::new(Notify::new()),
        }
    }

    /// Notified each time an unlock is left queued for the retry worker
    pub fn submission_signal(&self) -> Arc<Notify> {
        self.submission_signal.clone()
    }

    fn auth_store(&self) -> &Arc<dyn UserAuthStore> {
        self.api.auth_store()
    }

    pub fn is_user_authenticated(&self) -> bool {
        self.auth_store().get_user_auth().is_some()
    }

    pub fn get_user_authentication(&self) -> Option<UserAuth> {
        self.auth_store().get_user_auth()
    }

    pub async fn session_state(&self) -> SessionState {
        self.session.lock().await.clone()
    }

    pub async fn login(&self, username: &str, password: &str) -> SyncResult<()> {
        let mut session = self.session.lock().await;
        let user_auth = self.api.login(username, password).await?;
        self.auth_store().store_user_auth(user_auth).await?;
        log::info!("[ra-sync] Logged in as {}", username);

        if matches!(*session, SessionState::Unauthenticated) {
            *session = SessionState::Authenticated;
        }
        Ok(())
    }

    /// Forget the credential and every piece of user data
    pub async fn logout(&self) -> SyncResult<()> {
        let mut session = self.session.lock().await;
        let _submissions = self.submission_lock.lock().await;

        self.auth_store().clear_user_auth().await?;
        self.store.delete_all_user_data().await?;
        *session = SessionState::Unauthenticated;
        log::info!("[ra-sync] Logged out");
        Ok(())
    }

    /// Drive the state machine up to `Active` for the title with `game_hash`
    pub async fn start_session(&self, game_hash: &str, for_hardcore_mode: bool) -> SyncResult<GameId> {
        let mut session = self.session.lock().await;
        if !self.is_user_authenticated() {
            *session = SessionState::Unauthenticated;
            return Err(SyncError::NotAuthenticated);
        }
        *session = SessionState::Authenticated;

        let game_id = self.resolve_game_id(game_hash).await?;
        *session = SessionState::GameIdentified { game_id };

        let game = self.load_game(game_id).await?;
        *session = SessionState::CatalogLoaded { game_id };

        self.load_user_unlocks(game_id, for_hardcore_mode).await?;
        self.api.start_session(game_id).await?;

        log::info!(
            "[ra-sync] Session started for game {} ({})",
            game_id,
            mode_name(for_hardcore_mode)
        );
        *session = SessionState::Active(ActiveSession {
            game_id,
            game_hash: game_hash.to_ascii_lowercase(),
            for_hardcore_mode,
            rich_presence_patch: game.rich_presence_patch,
            primed_achievements: BTreeSet::new(),
        });
        Ok(game_id)
    }

    /// Leave the active game. The credential stays.
    pub async fn end_session(&self) {
        let mut session = self.session.lock().await;
        *session = SessionState::initial(self.is_user_authenticated());
    }

    /// Only the newly selected mode's user data is refreshed
    pub async fn switch_mode(&self, for_hardcore_mode: bool) -> SyncResult<()> {
        let mut session = self.session.lock().await;
        let active = session.active_mut().ok_or(SyncError::NoActiveSession)?;
        if active.for_hardcore_mode == for_hardcore_mode {
            return Ok(());
        }

        self.load_user_unlocks(active.game_id, for_hardcore_mode)
            .await?;
        active.for_hardcore_mode = for_hardcore_mode;
        log::info!(
            "[ra-sync] Switched game {} to {} mode",
            active.game_id,
            mode_name(for_hardcore_mode)
        );
        Ok(())
    }

    pub async fn active_session(&self) -> Option<ActiveSession> {
        self.session.lock().await.active().cloned()
    }

    pub async fn get_user_game_data(
        &self,
        game_hash: &str,
        for_hardcore_mode: bool,
    ) -> SyncResult<UserGameData> {
        let _session = self.session.lock().await;
        if !self.is_user_authenticated() {
            return Err(SyncError::NotAuthenticated);
        }

        let game_id = self.resolve_game_id(game_hash).await?;
        let game = self.load_game(game_id).await?;
        let unlocked = self.load_user_unlocks(game_id, for_hardcore_mode).await?;

        Ok(mapper::user_game_data(game, &unlocked, for_hardcore_mode))
    }

    /// Official achievements of the title with their unlock state
    pub async fn get_game_user_achievements(
        &self,
        game_hash: &str,
        for_hardcore_mode: bool,
    ) -> SyncResult<Vec<UserAchievement>> {
        Ok(self
            .get_user_game_data(game_hash, for_hardcore_mode)
            .await?
            .official_achievements())
    }

    /// Summary from the local cache only; `None` when the title was never loaded
    pub async fn get_game_summary(&self, game_hash: &str) -> SyncResult<Option<GameSummary>> {
        let Some(entry) = self.store.get_game_hash_entry(game_hash).await? else {
            return Ok(None);
        };
        let game_id = GameId(entry.game_id);
        let Some(game) = self.store.get_game(game_id).await? else {
            return Ok(None);
        };

        let unlocked_casual = self.store.get_user_unlocks(game_id, false).await?;
        let unlocked_hardcore = self.store.get_user_unlocks(game_id, true).await?;

        Ok(Some(GameSummary {
            game_id,
            total_achievements: game.achievements().count(),
            total_points: game.achievements().map(|a| a.points).sum(),
            unlocked_casual: unlocked_casual.iter().filter(|u| u.is_unlocked).count(),
            unlocked_hardcore: unlocked_hardcore.iter().filter(|u| u.is_unlocked).count(),
            title: game.title,
            icon_url: game.icon_url,
        }))
    }

    pub async fn get_achievement(&self, achievement_id: i64) -> SyncResult<Option<Achievement>> {
        Ok(self.store.get_achievement(achievement_id).await?)
    }

    pub async fn get_leaderboard(&self, leaderboard_id: i64) -> SyncResult<Option<Leaderboard>> {
        Ok(self.store.get_leaderboard(leaderboard_id).await?)
    }

    pub async fn on_achievement_primed(&self, achievement_id: i64) {
        if let Some(active) = self.session.lock().await.active_mut() {
            active.primed_achievements.insert(achievement_id);
        }
    }

    pub async fn on_achievement_unprimed(&self, achievement_id: i64) {
        if let Some(active) = self.session.lock().await.active_mut() {
            active.primed_achievements.remove(&achievement_id);
        }
    }

    /// Queue the award, then try to deliver it right away
    pub async fn on_achievement_unlocked(
        &self,
        achievement_id: i64,
        for_hardcore_mode: bool,
    ) -> SyncResult<AwardOutcome> {
        let game_id = {
            let mut session = self.session.lock().await;
            let active = session.active_mut().ok_or(SyncError::NoActiveSession)?;
            active.primed_achievements.remove(&achievement_id);
            active.game_id
        };

        let _submissions = self.submission_lock.lock().await;
        let submission = PendingAchievementSubmission::new(achievement_id, game_id, for_hardcore_mode);
        self.store.enqueue(&submission).await?;

        match self.deliver(&submission).await {
            Ok(response) => Ok(AwardOutcome::Confirmed(response)),
            Err(SyncError::NotAuthenticated) => Err(SyncError::NotAuthenticated),
            Err(e) => {
                log::warn!(
                    "[ra-sync] Award of achievement {} queued for retry: {}",
                    achievement_id,
                    e
                );
                self.submission_signal.notify_one();
                Ok(AwardOutcome::Queued(e))
            }
        }
    }

    /// Try every queued award once, in queue order
    pub async fn drain_pending_submissions(&self) -> SyncResult<SubmissionReport> {
        if !self.is_user_authenticated() {
            return Err(SyncError::NotAuthenticated);
        }

        let pending = self.store.list_pending().await?;
        let mut report = SubmissionReport::default();
        if pending.is_empty() {
            return Ok(report);
        }
        log::info!("[ra-sync] Submitting {} pending awards", pending.len());

        for submission in pending {
            let _submissions = self.submission_lock.lock().await;
            match self.deliver(&submission).await {
                Ok(_) => report.confirmed.push(submission),
                Err(SyncError::NotAuthenticated) => return Err(SyncError::NotAuthenticated),
                Err(e) => {
                    log::warn!(
                        "[ra-sync] Pending award of achievement {} failed: {}",
                        submission.achievement_id,
                        e
                    );
                    report.failed.push((submission, e));
                }
            }
        }

        Ok(report)
    }

    /// Succeeds only when every queued award was confirmed
    pub async fn submit_pending_achievements(&self) -> SyncResult<()> {
        let report = self.drain_pending_submissions().await?;
        match report.failed.into_iter().next() {
            None => Ok(()),
            Some((_, e)) => Err(e),
        }
    }

    /// Leaderboard entries are not queued
    pub async fn submit_leaderboard_entry(
        &self,
        leaderboard_id: i64,
        value: i32,
    ) -> SyncResult<SubmitLeaderboardEntryResponse> {
        self.require_active_game().await?;
        Ok(self.api.submit_leaderboard_entry(leaderboard_id, value).await?)
    }

    pub async fn send_session_heartbeat(&self, rich_presence: Option<&str>) -> SyncResult<()> {
        let game_id = self.require_active_game().await?;
        self.api.send_ping(game_id, rich_presence).await?;
        log::debug!("[ra-sync] Heartbeat sent for game {}", game_id);
        Ok(())
    }

    async fn require_active_game(&self) -> SyncResult<GameId> {
        self.session
            .lock()
            .await
            .active()
            .map(|active| active.game_id)
            .ok_or(SyncError::NoActiveSession)
    }

    /// Caller holds `submission_lock`
    async fn deliver(
        &self,
        submission: &PendingAchievementSubmission,
    ) -> SyncResult<AwardAchievementResponse> {
        let response = self
            .api
            .award_achievement(submission.achievement_id, submission.for_hardcore_mode)
            .await?;

        self.store.remove(submission).await?;
        self.store
            .add_user_unlock(UserAchievementUnlock::unlocked(
                GameId(submission.game_id),
                submission.achievement_id,
                submission.for_hardcore_mode,
            ))
            .await?;

        log::info!(
            "[ra-sync] Achievement {} confirmed ({})",
            submission.achievement_id,
            mode_name(submission.for_hardcore_mode)
        );
        Ok(response)
    }

    /// Cache first. A miss or a library older than its max age fetches the whole library and swaps it in.
    async fn resolve_game_id(&self, game_hash: &str) -> SyncResult<GameId> {
        let cached = self.store.get_game_hash_entry(game_hash).await?;
        let refreshed_at = self.store.get_hash_library_refreshed_at().await?;
        let stale = needs_refresh(refreshed_at, self.freshness.hash_library_max_age);

        let cached = match cached {
            Some(entry) if !stale => return Ok(GameId(entry.game_id)),
            Some(entry) => {
                log::info!("[ra-sync] Hash library is stale, refreshing");
                Some(GameId(entry.game_id))
            }
            None => {
                log::info!("[ra-sync] Hash {} not cached, refreshing hash library", game_hash);
                None
            }
        };

        let library = match self.api.get_game_hash_library().await {
            Ok(library) => library,
            Err(e) => match cached {
                Some(game_id) => {
                    log::warn!(
                        "[ra-sync] Hash library refresh failed, using cached game {}: {}",
                        game_id,
                        e
                    );
                    return Ok(game_id);
                }
                None => return Err(e.into()),
            },
        };
        self.store
            .update_game_hash_library(mapper::hash_library_entries(&library))
            .await?;

        library
            .get(&game_hash.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| SyncError::UnknownGame(game_hash.to_string()))
    }

    async fn load_game(&self, game_id: GameId) -> SyncResult<Game> {
        let metadata = self.store.get_game_set_metadata(game_id).await?;
        let refreshed_at = metadata.and_then(|m| m.last_achievement_set_refreshed_at);

        if !needs_refresh(refreshed_at, self.freshness.achievement_set_max_age) {
            if let Some(game) = self.store.get_game(game_id).await? {
                return Ok(game);
            }
            log::warn!("[ra-sync] Catalog of game {} missing from cache", game_id);
        }

        let game = self.api.get_game_achievement_data(game_id).await?;
        self.store.update_game_data(&game).await?;
        self.store
            .update_achievement_set_refreshed_at(game_id, Utc::now().naive_utc())
            .await?;
        log::info!(
            "[ra-sync] Refreshed catalog of game {} ({} sets)",
            game_id,
            game.sets.len()
        );
        Ok(game)
    }

    async fn load_user_unlocks(&self, game_id: GameId, for_hardcore_mode: bool) -> SyncResult<HashSet<i64>> {
        let metadata = self.store.get_game_set_metadata(game_id).await?;
        let refreshed_at = metadata.and_then(|m| m.user_data_refreshed_at(for_hardcore_mode));

        if !needs_refresh(refreshed_at, self.freshness.user_data_max_age) {
            let cached = self.store.get_user_unlocks(game_id, for_hardcore_mode).await?;
            return Ok(cached
                .into_iter()
                .filter(|u| u.is_unlocked)
                .map(|u| u.achievement_id)
                .collect());
        }

        let unlocked = self
            .api
            .get_user_unlocked_achievements(game_id, for_hardcore_mode)
            .await?;

        self.store
            .update_user_unlocks(game_id, for_hardcore_mode, unlocked.clone())
            .await?;
        self.store
            .update_user_data_refreshed_at(game_id, for_hardcore_mode, Utc::now().naive_utc())
            .await?;
        log::debug!(
            "[ra-sync] Refreshed {} unlocks of game {} ({})",
            unlocked.len(),
            game_id,
            mode_name(for_hardcore_mode)
        );
        Ok(unlocked.into_iter().collect())
    }
}

fn mode_name(for_hardcore_mode: bool) -> &'static str {
    if for_hardcore_mode {
        "hardcore"
    } else {
        "casual"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_refresh() {
        let max_age = Duration::days(1);
        assert!(needs_refresh(None, max_age));

        let now = Utc::now().naive_utc();
        assert!(!needs_refresh(Some(now - Duration::hours(23)), max_age));
        assert!(needs_refresh(Some(now - Duration::hours(25)), max_age));
    }

    #[test]
    fn test_report_completeness() {
        let mut report = SubmissionReport::default();
        assert!(report.is_complete());
        report.failed.push((
            PendingAchievementSubmission::new(1, GameId(1), false),
            SyncError::Network("offline".into()),
        ));
        assert!(!report.is_complete());
    }
}
