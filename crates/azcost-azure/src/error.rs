//! Error types for the Azure clients.

use azcost_cost::CostError;
use thiserror::Error;

/// Azure client errors.
#[derive(Debug, Error)]
pub enum AzureError {
    /// Credentials missing, expired or rejected (401/403)
    #[error("Azure authentication failed: {0}")]
    Auth(String),

    /// Request was throttled (429)
    #[error("Azure throttled the request")]
    Throttled {
        /// Value of the `Retry-After` header, in seconds
        retry_after_secs: Option<u64>,
    },

    /// Any other non-success response
    #[error("Azure API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("unexpected Azure response: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Azure CLI could not be run or reported failure
    #[error("Azure CLI error: {0}")]
    Cli(String),

    /// No subscription or access token available
    #[error("not logged in: {0}")]
    NotLoggedIn(String),
}

/// Result alias for the Azure clients.
pub type Result<T> = std::result::Result<T, AzureError>;

impl From<AzureError> for CostError {
    fn from(err: AzureError) -> Self {
        match err {
            AzureError::Auth(message) => CostError::Auth(message),
            AzureError::Throttled { retry_after_secs } => CostError::Throttled { retry_after_secs },
            AzureError::Api { status, message } => CostError::Api { status, message },
            AzureError::Serialization(e) => CostError::Json(e),
            AzureError::Http(e) => CostError::Transport(e.to_string()),
            AzureError::Cli(message) | AzureError::NotLoggedIn(message) => {
                CostError::Session(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_keeps_status_and_hint() {
        let err: CostError = AzureError::Api {
            status: 503,
            message: "unavailable".into(),
        }
        .into();
        assert!(matches!(err, CostError::Api { status: 503, .. }));
        assert!(err.is_retryable());

        let err: CostError = AzureError::Throttled {
            retry_after_secs: Some(30),
        }
        .into();
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn test_cli_failures_become_session_errors() {
        let err: CostError = AzureError::NotLoggedIn("run az login".into()).into();
        assert!(matches!(err, CostError::Session(msg) if msg == "run az login"));

        let err: CostError = AzureError::Auth("expired".into()).into();
        assert!(!err.is_retryable());
    }
}
