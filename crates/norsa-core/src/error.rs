//! # Error Types
//!
//! Domain-specific error types for norsa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  norsa-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule failures                         │
//! │  ├── ValidationError  - User input that must be corrected              │
//! │  └── TagError         - NFC tag content that cannot be decoded         │
//! │                                                                         │
//! │  norsa-store / norsa-client / norsa-device errors (separate crates)    │
//! │                                                                         │
//! │  Terminal errors (in app)                                              │
//! │  └── TerminalError    - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → TerminalError → operator message  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. The `Display` text of every variant is the message shown to the operator
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An issuance record violates `0 <= balance <= amount`.
    ///
    /// ## When This Occurs
    /// - Backend returned a negative balance
    /// - Backend returned a balance larger than the issued amount
    #[error("Issuance {id} is invalid: {reason}")]
    InvalidIssuance { id: String, reason: String },

    /// The backend sent a transaction type we do not know.
    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(String),

    /// Expense, retour and balance actions are locked until today's
    /// daily report has been printed.
    ///
    /// ## User Workflow
    /// ```text
    /// Operator scans card
    ///      │
    ///      ▼
    /// Last daily report printed yesterday
    ///      │
    ///      ▼
    /// DailyReportRequired
    ///      │
    ///      ▼
    /// UI shows: "Please print daily report first"
    /// ```
    #[error("Please print daily report first")]
    DailyReportRequired,

    /// Validation error (wraps ValidationError).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Tag decoding error (wraps TagError).
    #[error(transparent)]
    Tag(#[from] TagError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each message is what the operator reads in the blocking alert.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Amount field left empty.
    #[error("Expense Amount cannot be empty")]
    AmountEmpty,

    /// Amount contains something other than digits and one decimal point.
    #[error("Expense Amount entered is invalid. Only numbers are allowed")]
    AmountNotNumeric,

    /// Amount has more precision than the currency supports.
    #[error("Expense Amount entered is invalid. Only two decimal places are allowed")]
    AmountTooPrecise,

    /// Amount is zero (or would be negative).
    #[error("Please enter a valid amount")]
    AmountNotPositive,

    /// Expense larger than the remaining issuance balance.
    #[error("The Expense amount exceeds your balance")]
    AmountExceedsBalance,

    /// PIN confirmation left empty.
    #[error("Enter pincode")]
    PinEmpty,

    /// PIN confirmation does not match the issuance PIN.
    #[error("Pin Code entered is incorrect")]
    PinMismatch,

    /// Login email left empty.
    #[error("Please enter an email.")]
    EmailEmpty,

    /// Login email is not an address.
    #[error("The email entered is invalid.")]
    EmailInvalid,

    /// Login password left empty.
    #[error("Please enter a password.")]
    PasswordEmpty,

    /// Login password shorter than the minimum.
    #[error("The password must be {min} characters long.")]
    PasswordTooShort { min: usize },

    /// A printer setting is empty, non-numeric or zero.
    #[error("{field} is invalid")]
    PrinterSetting { field: PrinterSetting },
}

/// Printer settings that can be rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterSetting {
    Dpi,
    WidthMm,
    CharactersPerLine,
}

impl std::fmt::Display for PrinterSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrinterSetting::Dpi => write!(f, "Dpi"),
            PrinterSetting::WidthMm => write!(f, "Width MM"),
            PrinterSetting::CharactersPerLine => write!(f, "Nbr Characters Per Line"),
        }
    }
}

// =============================================================================
// Tag Error
// =============================================================================

/// NFC tag decoding failures.
///
/// `InvalidTagContent` and `NoTextRecord` share one operator message: from
/// the counter both mean "this card is not a Norsa card".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// The text record decoded to nothing but whitespace.
    #[error("Invalid Nfc Tag. Please try again with another tag")]
    InvalidTagContent,

    /// The tag carries no well-known text record.
    #[error("Invalid Nfc Tag. Please try again with another tag")]
    NoTextRecord,

    /// The NDEF bytes or the text payload are malformed.
    #[error("{0}")]
    Parse(String),
}

impl TagError {
    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        TagError::Parse(reason.into())
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::AmountExceedsBalance.to_string(),
            "The Expense amount exceeds your balance"
        );
        assert_eq!(
            ValidationError::PasswordTooShort { min: 8 }.to_string(),
            "The password must be 8 characters long."
        );
        assert_eq!(
            ValidationError::PrinterSetting {
                field: PrinterSetting::WidthMm
            }
            .to_string(),
            "Width MM is invalid"
        );
    }

    #[test]
    fn test_tag_errors_share_operator_message() {
        assert_eq!(
            TagError::InvalidTagContent.to_string(),
            TagError::NoTextRecord.to_string()
        );
    }

    #[test]
    fn test_validation_converts_to_core_error_transparently() {
        let core_err: CoreError = ValidationError::PinMismatch.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Pin Code entered is incorrect");
    }
}
