//! Error types for the cost pipeline.

use thiserror::Error;

/// Cost pipeline errors.
///
/// Collaborator implementations convert their own failures into these
/// variants, so the orchestrator can report a group failure without
/// knowing which transport produced it.
#[derive(Error, Debug)]
pub enum CostError {
    /// No usable session (not logged in, no subscription selected)
    #[error("no active session: {0}")]
    Session(String),

    /// Credentials rejected by the service
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Service returned an error response
    #[error("service error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or service message
        message: String,
    },

    /// Service throttled the request
    #[error("request throttled{}", retry_hint(*retry_after_secs))]
    Throttled {
        /// Seconds the service asked us to wait, if it said
        retry_after_secs: Option<u64>,
    },

    /// Network failure or timeout
    #[error("transport error: {0}")]
    Transport(String),

    /// Resource groups could not be listed
    #[error("failed to list resource groups: {0}")]
    Enumeration(String),

    /// A single cost row could not be parsed
    #[error("invalid cost row: {0}")]
    RowParse(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn retry_hint(retry_after_secs: Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(" (retry after {secs}s)"),
        None => String::new(),
    }
}

impl CostError {
    /// Whether a later run could succeed without user action.
    ///
    /// Only classifies; azcost itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            CostError::Throttled { .. } | CostError::Transport(_) => true,
            CostError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Create a user-friendly message for this error.
    pub fn friendly_message(&self) -> String {
        match self {
            CostError::Session(_) => {
                "Not signed in. Run 'az login' or set AZURE_ACCESS_TOKEN and AZURE_SUBSCRIPTION_ID."
                    .to_string()
            }
            CostError::Auth(_) => {
                "Access denied. Check that your account can read Cost Management data for this scope."
                    .to_string()
            }
            CostError::Throttled { retry_after_secs } => match retry_after_secs {
                Some(secs) => format!("Cost Management throttled the request. Try again in {secs}s."),
                None => "Cost Management throttled the request. Try again shortly.".to_string(),
            },
            CostError::Transport(msg) => {
                format!("Network problem talking to Azure: {msg}")
            }
            _ => format!("Error: {}", self),
        }
    }
}

/// Result type for cost pipeline operations.
pub type Result<T> = std::result::Result<T, CostError>;
