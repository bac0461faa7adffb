//! Offline-tolerant achievement synchronization.
//!
//! Caches achievement catalogs in SQLite, tracks per-user unlock state for
//! casual and hardcore play, and queues award submissions until the server
//! confirms them.

pub mod auth;
pub mod error;
pub mod models;
pub mod repository;
pub mod schema;
pub mod setup;
pub mod store;
pub mod tasks;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use error::{SyncError, SyncResult};
pub use repository::{AchievementRepository, AwardOutcome, FreshnessPolicy, SessionState};
pub use setup::SyncContext;
pub use tasks::WorkResult;
pub use utils::config::SyncConfig;
