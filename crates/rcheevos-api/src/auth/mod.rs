//! Credential storage interface
//!
//! A single mutable credential slot. Reads are synchronous so that request
//! builders can consult the store without awaiting; writes are last-write-wins.

use crate::models::UserAuth;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::RwLock;

#[async_trait]
pub trait UserAuthStore: Send + Sync {
    fn get_user_auth(&self) -> Option<UserAuth>;
    async fn store_user_auth(&self, user_auth: UserAuth) -> Result<()>;
    async fn clear_user_auth(&self) -> Result<()>;
}

/// Process-local store, used when the credential should not outlive the process
#[derive(Debug, Default)]
pub struct InMemoryUserAuthStore {
    user_auth: RwLock<Option<UserAuth>>,
}

impl InMemoryUserAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_auth(user_auth: UserAuth) -> Self {
        Self {
            user_auth: RwLock::new(Some(user_auth)),
        }
    }
}

#[async_trait]
impl UserAuthStore for InMemoryUserAuthStore {
    fn get_user_auth(&self) -> Option<UserAuth> {
        self.user_auth
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn store_user_auth(&self, user_auth: UserAuth) -> Result<()> {
        *self
            .user_auth
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(user_auth);
        Ok(())
    }

    async fn clear_user_auth(&self) -> Result<()> {
        *self
            .user_auth
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_replace_and_clear() {
        let store = InMemoryUserAuthStore::new();
        assert!(store.get_user_auth().is_none());

        store
            .store_user_auth(UserAuth::new("first", "a"))
            .await
            .unwrap();
        store
            .store_user_auth(UserAuth::new("second", "b"))
            .await
            .unwrap();
        assert_eq!(store.get_user_auth(), Some(UserAuth::new("second", "b")));

        store.clear_user_auth().await.unwrap();
        assert!(store.get_user_auth().is_none());
    }
}
