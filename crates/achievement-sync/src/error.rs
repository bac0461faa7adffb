use rcheevos_api::ApiError;

/// Failures surfaced by the synchronization layer
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("User is not authenticated")]
    NotAuthenticated,

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Server rejected the request: {0}")]
    ServerRejected(String),

    #[error("No game matches hash {0}")]
    UnknownGame(String),

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("No active game session")]
    NoActiveSession,

    #[error("Storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl SyncError {
    /// Failures where trying again later cannot help
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SyncError::NotAuthenticated | SyncError::UnknownGame(_) | SyncError::NoActiveSession
        )
    }
}

impl From<ApiError> for SyncError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NotAuthenticated => SyncError::NotAuthenticated,
            ApiError::Network(e) => SyncError::Network(e.to_string()),
            ApiError::HttpStatus { status } => {
                SyncError::Network(format!("Unexpected HTTP status {}", status))
            }
            ApiError::ServerRejected(reason) => SyncError::ServerRejected(reason),
            ApiError::Parse(reason) => SyncError::Parse(reason),
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
