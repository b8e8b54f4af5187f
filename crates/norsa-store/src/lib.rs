//! # norsa-store: Local State for the Norsa Terminal
//!
//! The terminal owns very little state of its own: the merchant session,
//! the printer geometry and a short print journal. It all lives in one
//! SQLite key/value table accessed through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Norsa Terminal Data Flow                         │
//! │                                                                         │
//! │  login / logout / printer set / daily-report                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   norsa-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │    Repositories    │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │◄───│ Session  Printer   │  │ (embedded) │  │   │
//! │  │   │  SqlitePool   │    │ Journal  State     │  │ 001_...sql │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   <data dir>/com.norsa.terminal/terminal.db                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use norsa_store::{Database, StoreConfig};
//!
//! let db = Database::new(StoreConfig::new("terminal.db")).await?;
//! let printer = db.printer_config().get().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Database, StoreConfig};

pub use repository::journal::JournalRepository;
pub use repository::printer::PrinterConfigRepository;
pub use repository::session::SessionRepository;
pub use repository::state::LocalStateRepository;
