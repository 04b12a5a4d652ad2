//! Error types for the remote cart service.

use thiserror::Error;

/// Envelope code the HTTP layer uses for request validation failures.
pub const VALIDATION_CODE: i64 = 422;

/// Notification text for failures where no response reached the client.
pub const CONNECTION_FAILED: &str = "Network connection failed";

/// Notification text when the server rejected a request without saying why.
pub const REQUEST_FAILED: &str = "Request failed";

/// Failures reported by a [`CartService`](crate::service::CartService).
///
/// Transport failures and non-zero envelope codes are both failures for branching
/// purposes; the variants only keep the distinction for the user-facing message.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// No response reached the client (connection refused, timeout, closed channel).
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The service answered with a non-zero code.
    #[error("Request rejected with code {code}: {}", message.as_deref().unwrap_or(REQUEST_FAILED))]
    Api { code: i64, message: Option<String> },

    /// The request payload was refused as invalid.
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl ServiceError {
    pub fn api(code: i64, message: impl Into<String>) -> Self {
        ServiceError::Api {
            code,
            message: Some(message.into()),
        }
    }

    /// Text shown to the user when this error is surfaced.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Transport(_) => CONNECTION_FAILED.to_string(),
            ServiceError::Api { message, .. } => message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(REQUEST_FAILED)
                .to_string(),
            ServiceError::Validation(message) => message.clone(),
        }
    }

    /// Validation-class failures may be kept quiet during rapid interaction.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation(_) | ServiceError::Api { code: VALIDATION_CODE, .. }
        )
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ServiceError::Transport(_))
    }
}
