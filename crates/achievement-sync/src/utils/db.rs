// Database connection management using Diesel with r2d2 connection pooling

use anyhow::Context;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::Path;
use std::time::Duration;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

// Embed migrations at compile time
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pragmas applied to every pooled connection
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub enable_foreign_keys: bool,
    pub busy_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            enable_foreign_keys: true,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        let mut pragmas = format!("PRAGMA busy_timeout = {};", self.busy_timeout.as_millis());
        if self.enable_foreign_keys {
            pragmas.push_str(" PRAGMA foreign_keys = ON;");
        }
        conn.batch_execute(&pragmas).map_err(r2d2::Error::QueryError)
    }
}

/// Open (creating if needed) the achievements database and run pending migrations
pub fn open_pool(db_path: &Path) -> anyhow::Result<DbPool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let url = format!("file:{}", db_path.display());
    let manager = ConnectionManager::<SqliteConnection>::new(url);
    let pool = Pool::builder()
        .max_size(DEFAULT_POOL_SIZE)
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)
        .context("Failed to build database pool")?;

    // Run migrations
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    log::info!(
        "[ra-db] Database ready at {} ({} migrations applied)",
        db_path.display(),
        applied.len()
    );

    Ok(pool)
}
