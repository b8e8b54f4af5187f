//! # Validation Module
//!
//! Input validation for everything the operator types at the counter.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Terminal shell                                               │
//! │  └── Collects raw strings from the operator                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Amount: numeric, two decimals, > 0, <= balance                   │
//! │  ├── PIN re-entry matches the issuance                                │
//! │  ├── Login: email shape, password length                              │
//! │  └── Printer geometry: numeric and non-zero                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Authoritative balance check on create_transaction                 │
//! │                                                                         │
//! │  A failure here never reaches the network.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{PrinterSetting, ValidationError};
use crate::money::Money;
use crate::types::{PrinterConfig, TransactionType};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum login password length accepted before calling the backend.
pub const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Amount
// =============================================================================

/// Validates the amount the operator typed for a transaction.
///
/// ## Rules
/// - Must parse as a decimal with at most two places
/// - Must be greater than zero
/// - For expenses, must not exceed `balance`
///
/// Retours are not capped by the balance: they put money back.
///
/// ## Example
/// ```rust
/// use norsa_core::money::Money;
/// use norsa_core::types::TransactionType;
/// use norsa_core::validation::validate_amount;
///
/// let balance = Money::from_cents(3000);
/// assert_eq!(validate_amount("30", TransactionType::Expense, balance).unwrap(), balance);
/// assert!(validate_amount("30.01", TransactionType::Expense, balance).is_err());
/// assert!(validate_amount("30.01", TransactionType::Retour, balance).is_ok());
/// ```
pub fn validate_amount(
    input: &str,
    kind: TransactionType,
    balance: Money,
) -> ValidationResult<Money> {
    let amount = Money::parse_amount(input)?;

    if !amount.is_positive() {
        return Err(ValidationError::AmountNotPositive);
    }

    if kind == TransactionType::Expense && amount > balance {
        return Err(ValidationError::AmountExceedsBalance);
    }

    Ok(amount)
}

// =============================================================================
// PIN
// =============================================================================

/// Checks the re-entered PIN against the one on the issuance record.
pub fn verify_pin(entered: &str, expected: &str) -> ValidationResult<()> {
    let entered = entered.trim();

    if entered.is_empty() {
        return Err(ValidationError::PinEmpty);
    }

    if entered != expected.trim() {
        return Err(ValidationError::PinMismatch);
    }

    Ok(())
}

// =============================================================================
// Login
// =============================================================================

/// Validates the login email and returns it trimmed.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }

    if !is_email_shaped(email) {
        return Err(ValidationError::EmailInvalid);
    }

    Ok(email.to_string())
}

/// Validates the login password and returns it trimmed.
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    let password = password.trim();

    if password.is_empty() {
        return Err(ValidationError::PasswordEmpty);
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(password)
}

/// `local@domain.tld`, with a dotted domain and a TLD of two or more chars.
fn is_email_shaped(email: &str) -> bool {
    const FORBIDDEN: &[char] = &['<', '>', '(', ')', '[', ']', ',', ';', ':', '"', '@', '\\'];

    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };

    let clean = |s: &str| !s.chars().any(|c| c.is_whitespace() || FORBIDDEN.contains(&c));

    if local.is_empty() || !clean(local) || local.starts_with('.') || local.ends_with('.') {
        return false;
    }

    if !clean(domain) {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return false;
    }

    labels.last().is_some_and(|tld| tld.chars().count() >= 2)
}

// =============================================================================
// Printer Config
// =============================================================================

/// Validates one printer setting typed by the operator.
///
/// ## Rules
/// - Must not be empty
/// - Must be a plain decimal number (`48`, `48.5`, `.5`)
/// - Must not be zero
///
/// Decimals are rounded to the nearest whole number, which must be at
/// least 1.
pub fn validate_printer_setting(field: PrinterSetting, input: &str) -> ValidationResult<u32> {
    let input = input.trim();
    let invalid = || ValidationError::PrinterSetting { field };

    if !is_plain_decimal(input) {
        return Err(invalid());
    }

    let value = input.parse::<f64>().map_err(|_| invalid())?.round();
    if value < 1.0 || value > f64::from(u32::MAX) {
        return Err(invalid());
    }

    Ok(value as u32)
}

/// Digits with an optional fractional part, or a bare fraction.
fn is_plain_decimal(input: &str) -> bool {
    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (input, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match fraction {
        None => digits(whole),
        Some(fraction) => (whole.is_empty() || digits(whole)) && digits(fraction),
    }
}

/// Validates all three printer settings, reporting the first bad one.
pub fn validate_printer_config(
    dpi: &str,
    width_mm: &str,
    chars_per_line: &str,
) -> ValidationResult<PrinterConfig> {
    Ok(PrinterConfig {
        dpi: validate_printer_setting(PrinterSetting::Dpi, dpi)?,
        width_mm: validate_printer_setting(PrinterSetting::WidthMm, width_mm)?,
        chars_per_line: validate_printer_setting(PrinterSetting::CharactersPerLine, chars_per_line)?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
