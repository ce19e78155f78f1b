//! Backend API client error types.

use cs_state::GatewayError;

/// Errors from backend API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The backend returned a non-2xx status.
    #[error("backend {endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The response parsed but carried values the domain types reject.
    #[error("invalid payload from {endpoint}: {reason}")]
    InvalidPayload { endpoint: String, reason: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl From<ApiError> for GatewayError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, body, .. } => GatewayError::Rejected {
                status,
                message: body,
            },
            ApiError::Deserialization { .. } | ApiError::InvalidPayload { .. } => {
                GatewayError::InvalidResponse(err.to_string())
            }
            ApiError::Http { .. } | ApiError::Config(_) => GatewayError::Transport(err.to_string()),
        }
    }
}
