/// Failures surfaced by [`super::RaApi`]
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("User is not authenticated")]
    NotAuthenticated,

    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {status}")]
    HttpStatus { status: u16 },

    #[error("Request was unsuccessful: {0}")]
    ServerRejected(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ApiError {
    /// Transport-level failures that may succeed on a later attempt
    pub fn is_network_failure(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::HttpStatus { .. })
    }
}
