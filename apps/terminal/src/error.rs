//! # Terminal Error Type
//!
//! The one error type every terminal operation returns.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Norsa Terminal                     │
//! │                                                                         │
//! │  Operator                    Terminal                                   │
//! │  ────────                    ────────                                   │
//! │                                                                         │
//! │  norsa-terminal transaction expense NRS-42 --amount 12.50 --pin 1234    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Workflow step                                                   │  │
//! │  │  Result<T, TerminalError>                                        │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Backend Error? ─── GatewayError ──────────────┐                 │  │
//! │  │  Input Error?   ─── ValidationError ───────────┤                 │  │
//! │  │  Card Error?    ─── TagError / DeviceError ────┼── TerminalError │  │
//! │  │  Gate closed?   ─── CoreError ─────────────────┤   {kind,message}│  │
//! │  │  Disk Error?    ─── StoreError ────────────────┘                 │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄── "error: The Expense amount exceeds your balance"                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure is a dismissible message. Nothing here panics.

use serde::Serialize;

use norsa_client::GatewayError;
use norsa_core::{CoreError, TagError, ValidationError};
use norsa_device::DeviceError;
use norsa_store::StoreError;

/// Error returned from terminal operations.
///
/// ## Serialization
/// ```json
/// {
///   "kind": "BUSINESS_RULE_FAILURE",
///   "message": "Please print daily report first"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalError {
    /// Machine-readable category
    pub kind: ErrorKind,

    /// Text shown to the operator
    pub message: String,
}

/// Failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Backend unreachable, timed out or answered with an error
    NetworkFailure,

    /// Wrong credentials, missing or expired session
    AuthFailure,

    /// Operator input must be corrected
    ValidationFailure,

    /// The card is not a Norsa card
    TagFailure,

    /// A rule blocked the action (daily gate, balance, wrong step)
    BusinessRuleFailure,

    /// NFC radio or printer failure
    DeviceFailure,

    /// Local state could not be read or written
    StorageFailure,
}

impl TerminalError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        TerminalError {
            kind,
            message: message.into(),
        }
    }

    /// Creates a business rule error.
    pub fn business_rule(message: impl Into<String>) -> Self {
        TerminalError::new(ErrorKind::BusinessRuleFailure, message)
    }

    /// No merchant is logged in.
    pub fn not_logged_in() -> Self {
        TerminalError::new(ErrorKind::AuthFailure, "Please log in first")
    }

    pub fn is_auth_failure(&self) -> bool {
        self.kind == ErrorKind::AuthFailure
    }
}

impl From<GatewayError> for TerminalError {
    fn from(err: GatewayError) -> Self {
        let kind = if err.is_auth_failure() {
            ErrorKind::AuthFailure
        } else {
            ErrorKind::NetworkFailure
        };

        if err.is_transport() {
            tracing::warn!(error = %err, "Backend unreachable");
        }

        TerminalError::new(kind, err.user_message())
    }
}

/// The balance rule is a business rule; every other input error is
/// something the operator retypes.
impl From<ValidationError> for TerminalError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::AmountExceedsBalance => TerminalError::business_rule(err.to_string()),
            other => TerminalError::new(ErrorKind::ValidationFailure, other.to_string()),
        }
    }
}

impl From<TagError> for TerminalError {
    fn from(err: TagError) -> Self {
        TerminalError::new(ErrorKind::TagFailure, err.to_string())
    }
}

impl From<CoreError> for TerminalError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::Tag(e) => e.into(),
            CoreError::InvalidIssuance { .. } | CoreError::UnknownTransactionType(_) => {
                tracing::error!(error = %err, "Backend sent an unusable record");
                TerminalError::new(ErrorKind::NetworkFailure, "Something went wrong")
            }
            CoreError::DailyReportRequired => TerminalError::business_rule(err.to_string()),
        }
    }
}

impl From<DeviceError> for TerminalError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::Tag(e) => e.into(),
            other => TerminalError::new(ErrorKind::DeviceFailure, other.to_string()),
        }
    }
}

/// Converts store errors. The detail is logged, the operator gets a
/// generic message.
impl From<StoreError> for TerminalError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Local state operation failed: {}", err);
        TerminalError::new(ErrorKind::StorageFailure, "Local storage operation failed")
    }
}

impl std::fmt::Display for TerminalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for TerminalError {}

/// Result type for terminal operations.
pub type TerminalResult<T> = Result<T, TerminalError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(GatewayError::InvalidCredentials, ErrorKind::AuthFailure, "email or password is incorrect")]
    #[case(GatewayError::Unauthenticated("no session".into()), ErrorKind::AuthFailure, "Please log in again")]
    #[case(GatewayError::Timeout, ErrorKind::NetworkFailure, "Something went wrong")]
    #[case(
        GatewayError::Rejected { status: 422, message: Some("Insufficient balance".into()) },
        ErrorKind::NetworkFailure,
        "Insufficient balance"
    )]
    #[case(
        GatewayError::Rejected { status: 401, message: None },
        ErrorKind::AuthFailure,
        "Something went wrong"
    )]
    fn test_gateway_error_mapping(
        #[case] err: GatewayError,
        #[case] kind: ErrorKind,
        #[case] message: &str,
    ) {
        let mapped = TerminalError::from(err);
        assert_eq!(mapped.kind, kind);
        assert_eq!(mapped.message, message);
    }

    #[rstest]
    #[case(ValidationError::AmountExceedsBalance, ErrorKind::BusinessRuleFailure)]
    #[case(ValidationError::AmountNotNumeric, ErrorKind::ValidationFailure)]
    #[case(ValidationError::PinMismatch, ErrorKind::ValidationFailure)]
    fn test_validation_error_mapping(#[case] err: ValidationError, #[case] kind: ErrorKind) {
        let message = err.to_string();
        let mapped = TerminalError::from(err);
        assert_eq!(mapped.kind, kind);
        assert_eq!(mapped.message, message);
    }

    #[test]
    fn test_core_error_mapping() {
        let gate = TerminalError::from(CoreError::DailyReportRequired);
        assert_eq!(gate.kind, ErrorKind::BusinessRuleFailure);
        assert_eq!(gate.message, "Please print daily report first");

        let tag = TerminalError::from(CoreError::Tag(TagError::NoTextRecord));
        assert_eq!(tag.kind, ErrorKind::TagFailure);

        let bad_record = TerminalError::from(CoreError::InvalidIssuance {
            id: "iss-1".into(),
            reason: "negative balance".into(),
        });
        assert_eq!(bad_record.message, "Something went wrong");
    }

    #[test]
    fn test_device_error_mapping() {
        let tag = TerminalError::from(DeviceError::Tag(TagError::InvalidTagContent));
        assert_eq!(tag.kind, ErrorKind::TagFailure);

        let radio = TerminalError::from(DeviceError::NfcDisabled);
        assert_eq!(radio.kind, ErrorKind::DeviceFailure);
        assert_eq!(radio.message, "Nfc is disabled. Please enable Nfc and try again");
    }

    #[test]
    fn test_store_error_hides_detail() {
        let err = TerminalError::from(StoreError::QueryFailed("disk I/O error".into()));
        assert_eq!(err.kind, ErrorKind::StorageFailure);
        assert!(!err.message.contains("disk"));
    }

    #[test]
    fn test_serialization_shape() {
        let err = TerminalError::business_rule("Please print daily report first");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "BUSINESS_RULE_FAILURE");
        assert_eq!(json["message"], "Please print daily report first");
    }
}
