//! # norsa-core: Pure Business Logic for the Norsa Terminal
//!
//! Everything the terminal decides without touching a device, the network
//! or the disk.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Norsa Terminal Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Terminal (workflow + CLI)                       │   │
//! │  │   scan card ──► lookup ──► amount ──► PIN ──► post ──► print   │   │
//! │  └───────┬──────────────────┬──────────────────┬───────────────────┘   │
//! │          │                  │                  │                       │
//! │  ┌───────▼──────┐   ┌───────▼──────┐   ┌───────▼──────┐                │
//! │  │ norsa-device │   │ norsa-client │   │ norsa-store  │                │
//! │  │ NFC, printer │   │ REST gateway │   │ SQLite state │                │
//! │  └───────┬──────┘   └───────┬──────┘   └───────┬──────┘                │
//! │          │                  │                  │                       │
//! │  ┌───────▼──────────────────▼──────────────────▼───────────────────┐   │
//! │  │               ★ norsa-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────┐ ┌────────┐ ┌──────────┐ ┌─────────┐ ┌─────────┐   │   │
//! │  │   │ types  │ │ money  │ │validation│ │  ndef   │ │ receipt │   │   │
//! │  │   └────────┘ └────────┘ └──────────┘ └─────────┘ └─────────┘   │   │
//! │  │                          ┌──────────┐                           │   │
//! │  │                          │  report  │                           │   │
//! │  │                          └──────────┘                           │   │
//! │  │   NO I/O • NO CLOCK • PURE FUNCTIONS                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Issuance, transaction, session, printer config
//! - [`money`] - Integer-cent NAFL amounts
//! - [`validation`] - Operator input rules
//! - [`ndef`] - NFC tag → card token
//! - [`receipt`] - Printer markup
//! - [`report`] - Daily totals and the once-per-day gate
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use norsa_core::money::Money;
//! use norsa_core::types::TransactionType;
//! use norsa_core::validation::validate_amount;
//!
//! let balance = Money::from_cents(5000);
//! let amount = validate_amount("12.50", TransactionType::Expense, balance).unwrap();
//! assert_eq!(amount.with_currency("NAFL"), "NAFL 12.50");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod ndef;
pub mod receipt;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, PrinterSetting, TagError, ValidationError};
pub use money::Money;
pub use types::*;
