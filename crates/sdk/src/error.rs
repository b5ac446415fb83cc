//! Error types for the Slack SDK.

/// Result type for SDK operations.
pub type SlackResult<T> = Result<T, SlackError>;

/// Slack error codes that mean the credentials are unusable.
const AUTH_ERROR_CODES: &[&str] = &[
    "not_authed",
    "invalid_auth",
    "account_inactive",
    "token_revoked",
    "token_expired",
    "no_permission",
];

/// Error types that can occur when calling the Slack Web API.
#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack answered `"ok": false`.
    #[error("Slack API error in {method}: {error}")]
    Api { method: String, error: String },

    /// Non-success HTTP status.
    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SlackError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Api { error, .. } => error == "ratelimited" || error == "internal_error",
            _ => false,
        }
    }

    /// Check if this error means the credentials were rejected.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::Api { error, .. } => AUTH_ERROR_CODES.contains(&error.as_str()),
            Self::Status { status, .. } => *status == 401,
            _ => false,
        }
    }
}
