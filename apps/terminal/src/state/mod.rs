//! # State Module
//!
//! What the terminal keeps between operator actions.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────┐        ┌──────────────────────────────┐  │
//! │  │     TerminalConfig       │        │      SessionManager          │  │
//! │  │                          │        │                              │  │
//! │  │  terminal.toml + NORSA_* │        │  login / logout / current    │  │
//! │  │  read once at startup    │        │  backed by norsa-store       │  │
//! │  └──────────────────────────┘        └──────────────────────────────┘  │
//! │                                                                         │
//! │  Config is read-only after startup. The session lives in SQLite so a   │
//! │  restart keeps the merchant logged in.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod session;

pub use config::{
    ConfigError, ConfigResult, NfcSettings, ReceiptSettings, StorageSettings, TerminalConfig,
    CONFIG_FILE_NAME, DATABASE_FILE_NAME,
};
pub use session::SessionManager;
