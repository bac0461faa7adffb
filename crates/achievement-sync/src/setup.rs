use crate::auth::SqliteUserAuthStore;
use crate::repository::{AchievementRepository, FreshnessPolicy};
use crate::store::{AchievementStore, PolicyAchievementsDao, SqliteAchievementsDao};
use crate::tasks::scheduler::{spawn_on_signal, RetryPolicy};
use crate::tasks::submission::SubmissionWorker;
use crate::utils::config::SyncConfig;
use crate::utils::db::{open_pool, DbPool};
use anyhow::Context;
use rcheevos_api::{Md5SignatureProvider, RaApi};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Everything wired together from one [`SyncConfig`]
pub struct SyncContext {
    pub config: SyncConfig,
    pub pool: DbPool,
    pub api: Arc<RaApi>,
    pub store: Arc<dyn AchievementStore>,
    pub repository: Arc<AchievementRepository>,
}

impl SyncContext {
    pub fn submission_worker(&self) -> SubmissionWorker {
        SubmissionWorker::new(self.repository.clone())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.config.retry)
    }

    /// Drain the pending queue now and again after every unlock that could not be delivered
    pub fn spawn_submission_scheduler(&self, cancel_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        let signal = self.repository.submission_signal();
        // Awards left over from an earlier process
        signal.notify_one();
        spawn_on_signal(
            Arc::new(self.submission_worker()),
            self.retry_policy(),
            signal,
            cancel_rx,
        )
    }
}

pub fn init(config: SyncConfig) -> anyhow::Result<SyncContext> {
    let db_path = config.database_path()?;
    let pool = open_pool(&db_path)?;

    let auth_store = Arc::new(SqliteUserAuthStore::load(pool.clone())?);
    let signature_provider = match &config.signature_secret {
        Some(secret) => Md5SignatureProvider::with_secret(secret.clone()),
        None => Md5SignatureProvider::new(),
    };

    let api = RaApi::builder(auth_store)
        .base_url(config.base_url.clone())
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout())
        .signature_provider(Arc::new(signature_provider))
        .build()
        .context("Failed to build protocol client")?;
    let api = Arc::new(api);

    let dao: Arc<dyn AchievementStore> = Arc::new(SqliteAchievementsDao::new(pool.clone()));
    let store: Arc<dyn AchievementStore> =
        Arc::new(PolicyAchievementsDao::new(dao, config.cache_policy));
    log::debug!("[ra-sync] Cache policy: {:?}", config.cache_policy);

    let repository = Arc::new(AchievementRepository::new(
        api.clone(),
        store.clone(),
        FreshnessPolicy::from(&config),
    ));

    Ok(SyncContext {
        config,
        pool,
        api,
        store,
        repository,
    })
}
