//! # Gateway Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Gateway Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │   Backend               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Network        │  │  InvalidCredentials     │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  Rejected{status,msg}   │ │
//! │  │                 │  │                 │  │  Unauthenticated        │ │
//! │  │                 │  │                 │  │  NotFound  Decode       │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Display` is for logs. What the operator sees comes from
//! [`GatewayError::user_message`].

use thiserror::Error;

/// Shown for any failure the backend did not explain.
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Shown when login is refused with HTTP 400.
pub const INVALID_CREDENTIALS: &str = "email or password is incorrect";

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid gateway configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// Login refused with HTTP 400.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Non-2xx response. `message` is the body's `message` or `error` field
    /// when there was one.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Rejected { status: u16, message: Option<String> },

    /// No usable session, or the backend refused the token.
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// A lookup returned no record.
    #[error("{0} not found")]
    NotFound(String),

    /// Response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Message for the operator.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::InvalidCredentials => INVALID_CREDENTIALS.to_string(),
            GatewayError::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            GatewayError::Unauthenticated(_) => "Please log in again".to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    /// Whether the failure means the session is unusable.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidCredentials
                | GatewayError::Unauthenticated(_)
                | GatewayError::Rejected {
                    status: 401 | 403,
                    ..
                }
        )
    }

    /// Whether the failure happened before the backend answered.
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Network(_) | GatewayError::Timeout)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

impl From<norsa_store::StoreError> for GatewayError {
    fn from(err: norsa_store::StoreError) -> Self {
        GatewayError::Unauthenticated(format!("session unavailable: {err}"))
    }
}
