use axum::http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AvatarError>;

/// Error taxonomy for the avatar creation pipeline.
///
/// Upstream variants carry the provider label ("chat provider" / "image
/// provider") so callers can tell which stage failed without seeing raw
/// provider output.
#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported document '{filename}': {reason}")]
    UnsupportedDocument { filename: String, reason: String },

    #[error("{provider} unavailable: {reason}")]
    UpstreamUnavailable {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} rejected the request: {reason}")]
    UpstreamRejected {
        provider: &'static str,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AvatarError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::UnsupportedDocument { .. } => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable { .. } | Self::UpstreamRejected { .. } => {
                StatusCode::BAD_GATEWAY
            }
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller. Internal and configuration
    /// details stay in the server log.
    pub fn client_message(&self) -> String {
        match self {
            Self::Config(_) | Self::Internal(_) => {
                "An internal error occurred while creating the avatar".to_string()
            }
            other => other.to_string(),
        }
    }
}
