//! # Domain Types
//!
//! Core domain types used throughout the Norsa terminal.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ IssuanceHistory │   │   Transaction   │   │ DailyTransaction│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  issuance id    │   │  client id      │       │
//! │  │  pin code       │   │  client id      │   │  amount         │       │
//! │  │  amount/balance │   │  merchant id    │   │  kind           │       │
//! │  │  client ident.  │   │  amount, kind   │   │  date_time      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │     backend-owned         built once,           report input only     │
//! │     read-only copy        posted once                                  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Session      │   │  PrinterConfig  │   terminal-owned,           │
//! │  │  access token   │   │  dpi 150        │   persisted locally         │
//! │  │  merchant name  │   │  width 48mm     │                             │
//! │  └─────────────────┘   │  30 chars/line  │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Transaction Type
// =============================================================================

/// Direction of a transaction against the cardholder balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Debit: the cardholder spends part of the issuance.
    Expense,

    /// Credit: goods returned, the balance goes back up.
    Retour,
}

impl TransactionType {
    /// Receipt label for the amount line.
    pub fn receipt_label(&self) -> &'static str {
        match self {
            TransactionType::Expense => "Sale",
            TransactionType::Retour => "Retour",
        }
    }

    /// Signed contribution of `amount` to a daily total.
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            TransactionType::Expense => amount,
            TransactionType::Retour => -amount,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Expense => write!(f, "expense"),
            TransactionType::Retour => write!(f, "retour"),
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(TransactionType::Expense),
            "retour" => Ok(TransactionType::Retour),
            other => Err(CoreError::UnknownTransactionType(other.to_string())),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Cardholder identity as printed on the receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    /// Short display code, e.g. `C-0042`.
    pub code: String,
    pub name: String,
}

// =============================================================================
// Issuance History
// =============================================================================

/// A credit line issued to a cardholder and bound to an NFC card.
///
/// Construct through [`IssuanceHistory::new`] so the balance invariant holds.
/// The record is stale as soon as a transaction against it is posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceHistory {
    pub id: String,
    pub client_id: String,
    pub pin_code: String,
    /// Amount originally issued.
    pub amount: Money,
    /// Amount still available, `0 <= balance <= amount`.
    pub balance: Money,
    pub payback_period_months: u32,
    pub client_code: String,
    pub client_name: String,
}

/// Fields of an issuance record before the invariant check.
#[derive(Debug, Clone)]
pub struct IssuanceFields {
    pub id: String,
    pub client_id: String,
    pub pin_code: String,
    pub amount: Money,
    pub balance: Money,
    pub payback_period_months: u32,
    pub client_code: String,
    pub client_name: String,
}

impl IssuanceHistory {
    /// Builds an issuance record, rejecting `balance < 0` and `balance > amount`.
    pub fn new(fields: IssuanceFields) -> CoreResult<Self> {
        if fields.balance.is_negative() {
            return Err(CoreError::InvalidIssuance {
                id: fields.id,
                reason: format!("balance {} is negative", fields.balance),
            });
        }
        if fields.balance > fields.amount {
            return Err(CoreError::InvalidIssuance {
                id: fields.id,
                reason: format!(
                    "balance {} exceeds issued amount {}",
                    fields.balance, fields.amount
                ),
            });
        }

        Ok(IssuanceHistory {
            id: fields.id,
            client_id: fields.client_id,
            pin_code: fields.pin_code,
            amount: fields.amount,
            balance: fields.balance,
            payback_period_months: fields.payback_period_months,
            client_code: fields.client_code,
            client_name: fields.client_name,
        })
    }

    /// Identity block for receipts.
    pub fn client(&self) -> Client {
        Client {
            id: self.client_id.clone(),
            code: self.client_code.clone(),
            name: self.client_name.clone(),
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// Description the backend expects on every terminal transaction.
pub const DEFAULT_ITEM_DESCRIPTION: &str = "Expense";

/// A transaction built locally and submitted once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub client_id: String,
    pub merchant_id: String,
    pub issuance_history_id: String,
    pub description: String,
    /// UTC instant the operator confirmed the transaction.
    pub date_time: DateTime<Utc>,
    pub amount: Money,
    pub kind: TransactionType,
}

impl Transaction {
    /// Builds a transaction against `issuance` on behalf of `merchant_id`.
    pub fn new(
        issuance: &IssuanceHistory,
        merchant_id: impl Into<String>,
        kind: TransactionType,
        amount: Money,
        date_time: DateTime<Utc>,
    ) -> Self {
        Transaction {
            client_id: issuance.client_id.clone(),
            merchant_id: merchant_id.into(),
            issuance_history_id: issuance.id.clone(),
            description: DEFAULT_ITEM_DESCRIPTION.to_string(),
            date_time,
            amount,
            kind,
        }
    }
}

// =============================================================================
// Daily Transaction
// =============================================================================

/// A transaction as the backend reports it for the daily summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTransaction {
    pub client_id: String,
    pub amount: Money,
    pub kind: TransactionType,
    pub date_time: DateTime<Utc>,
}

// =============================================================================
// Printer Config
// =============================================================================

/// Thermal printer geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterConfig {
    pub dpi: u32,
    pub width_mm: u32,
    pub chars_per_line: u32,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        PrinterConfig {
            dpi: 150,
            width_mm: 48,
            chars_per_line: 30,
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Authenticated merchant session.
///
/// Created by login, persisted across restarts, dropped on logout or expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Backend user id, also used as the merchant id on transactions.
    pub user_id: String,
    pub merchant_name: String,
}

impl Session {
    /// A session without an expiry never expires locally; the backend
    /// rejects it with 401 instead.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

// =============================================================================
// Receipt Copy
// =============================================================================

/// Which of the two printed copies a receipt is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptCopy {
    Merchant,
    Client,
}

// =============================================================================
// Unit Tests
// =============================================================================
