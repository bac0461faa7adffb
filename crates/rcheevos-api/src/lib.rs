//! Client library for the RetroAchievements request endpoint.
//!
//! Provides the protocol client, request signing and the credential store
//! interface used by the synchronization layer.

pub mod api;
pub mod auth;
pub mod models;
pub mod signature;

pub use api::{ApiError, RaApi, RaApiBuilder};
pub use auth::{InMemoryUserAuthStore, UserAuthStore};
pub use models::*;
pub use signature::{Md5SignatureProvider, SignatureProvider};
