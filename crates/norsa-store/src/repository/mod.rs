//! # Repository Module
//!
//! Typed access to the `local_state` key/value table.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SessionRepository        PrinterConfigRepository   JournalRepository  │
//! │  get / save / clear       get / save                daily report time  │
//! │       │                        │                    last receipt       │
//! │       └────────────┬───────────┴──────────────┬─────────┘              │
//! │                    ▼                          ▼                         │
//! │               LocalStateRepository (get / put / delete / clear)        │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │               local_state table                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`state::LocalStateRepository`] - Raw string and JSON values by key
//! - [`session::SessionRepository`] - Logged-in merchant session
//! - [`printer::PrinterConfigRepository`] - Printer geometry
//! - [`journal::JournalRepository`] - Daily report timestamp, last receipt

pub mod journal;
pub mod printer;
pub mod session;
pub mod state;

/// Keys used in `local_state`.
pub mod keys {
    pub const SESSION: &str = "session";
    pub const PRINTER_CONFIG: &str = "printer_config";
    pub const DAILY_REPORT_PRINTED_AT: &str = "daily_report_printed_at";
    pub const LAST_PRINTED_RECEIPT: &str = "last_printed_receipt";
}
