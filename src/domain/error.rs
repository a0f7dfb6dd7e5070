use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClosureError {
    #[error("configuration: {0}")]
    Configuration(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("upstream {path} returned {status}: {body}")]
    Upstream {
        status: u16,
        path: String,
        body: String,
    },

    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("pagination: {0}")]
    Pagination(String),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClosureError {
    /// Whether the upstream client may try the same call again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(_) => true,
            _ => false,
        }
    }
}
