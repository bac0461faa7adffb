//! Durable credential storage
//!
//! Keeps the single logged-in credential in `ra_user_auth` and mirrors it in
//! memory so reads never wait on the database.

use crate::models::user_auth::{UserAuthEntity, USER_AUTH_ROW_ID};
use crate::schema::ra_user_auth;
use crate::utils::db::DbPool;
use anyhow::{Context, Result};
use async_trait::async_trait;
use diesel::prelude::*;
use rcheevos_api::{UserAuth, UserAuthStore};
use std::sync::RwLock;

pub struct SqliteUserAuthStore {
    pool: DbPool,
    cached: RwLock<Option<UserAuth>>,
}

impl SqliteUserAuthStore {
    /// Load the stored credential, if any
    pub fn load(pool: DbPool) -> Result<Self> {
        let mut conn = pool.get().context("Failed to get database connection")?;
        let stored = ra_user_auth::table
            .find(USER_AUTH_ROW_ID)
            .select(UserAuthEntity::as_select())
            .first(&mut conn)
            .optional()
            .context("Failed to load stored credential")?
            .map(UserAuth::from);

        if let Some(user_auth) = &stored {
            log::info!("[ra-auth] Restored credential for {}", user_auth.username);
        }

        Ok(Self {
            pool,
            cached: RwLock::new(stored),
        })
    }

    fn set_cached(&self, user_auth: Option<UserAuth>) {
        let mut cached = self.cached.write().unwrap_or_else(|p| p.into_inner());
        *cached = user_auth;
    }
}

#[async_trait]
impl UserAuthStore for SqliteUserAuthStore {
    fn get_user_auth(&self) -> Option<UserAuth> {
        self.cached
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    async fn store_user_auth(&self, user_auth: UserAuth) -> Result<()> {
        let pool = self.pool.clone();
        let entity = UserAuthEntity::from(&user_auth);
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut conn = pool.get().context("Failed to get database connection")?;
            diesel::insert_into(ra_user_auth::table)
                .values(&entity)
                .on_conflict(ra_user_auth::id)
                .do_update()
                .set(&entity)
                .execute(&mut conn)
                .context("Failed to store credential")?;
            Ok(())
        })
        .await
        .context("Credential task failed")??;

        log::info!("[ra-auth] Stored credential for {}", user_auth.username);
        self.set_cached(Some(user_auth));
        Ok(())
    }

    async fn clear_user_auth(&self) -> Result<()> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut conn = pool.get().context("Failed to get database connection")?;
            diesel::delete(ra_user_auth::table)
                .execute(&mut conn)
                .context("Failed to clear credential")?;
            Ok(())
        })
        .await
        .context("Credential task failed")??;

        log::info!("[ra-auth] Cleared stored credential");
        self.set_cached(None);
        Ok(())
    }
}
