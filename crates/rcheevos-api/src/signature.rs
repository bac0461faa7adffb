//! Request signing for mutating requests (achievement awards, leaderboard entries)
//!
//! Signatures are lowercase hex MD5 digests over the request fields, the
//! username and an optional shared secret. Verification happens server-side.

use crate::models::UserAuth;
use md5::{Digest, Md5};

pub trait SignatureProvider: Send + Sync {
    fn achievement_signature(
        &self,
        achievement_id: i64,
        user_auth: &UserAuth,
        for_hardcore_mode: bool,
    ) -> String;

    fn leaderboard_signature(&self, leaderboard_id: i64, score: i32, user_auth: &UserAuth)
        -> String;
}

/// Default [`SignatureProvider`]. An empty secret matches the public protocol.
#[derive(Debug, Clone, Default)]
pub struct Md5SignatureProvider {
    secret: Option<String>,
}

impl Md5SignatureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
        }
    }

    fn digest(&self, parts: &[&str]) -> String {
        let mut hasher = Md5::new();
        for part in parts {
            hasher.update(part.as_bytes());
        }
        if let Some(secret) = &self.secret {
            hasher.update(secret.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

impl SignatureProvider for Md5SignatureProvider {
    fn achievement_signature(
        &self,
        achievement_id: i64,
        user_auth: &UserAuth,
        for_hardcore_mode: bool,
    ) -> String {
        let achievement_id = achievement_id.to_string();
        let hardcore_flag = if for_hardcore_mode { "1" } else { "0" };
        self.digest(&[
            achievement_id.as_str(),
            user_auth.username.as_str(),
            hardcore_flag,
        ])
    }

    fn leaderboard_signature(
        &self,
        leaderboard_id: i64,
        score: i32,
        user_auth: &UserAuth,
    ) -> String {
        let leaderboard_id = leaderboard_id.to_string();
        let score = score.to_string();
        self.digest(&[
            leaderboard_id.as_str(),
            score.as_str(),
            user_auth.username.as_str(),
        ])
    }
}
