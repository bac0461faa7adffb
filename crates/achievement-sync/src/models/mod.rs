pub mod catalog;
pub mod pending;
pub mod progress;
pub mod user_auth;
pub mod user_data;

pub use catalog::{
    AchievementEntity, AchievementSetEntity, GameCatalogRows, GameEntity, LeaderboardEntity,
};
pub use pending::PendingAchievementSubmission;
pub use progress::{GameHashEntry, GameSetMetadata, UserAchievementUnlock};
pub use user_auth::UserAuthEntity;
pub use user_data::{GameSummary, UserAchievement, UserAchievementSet, UserGameData};
