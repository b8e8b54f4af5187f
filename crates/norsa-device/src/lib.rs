//! # norsa-device: NFC Radio and Receipt Printer
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Workflow ──► CardReader<R: NfcRadio> ──► NfcRadio (plugin / mock)     │
//! │     │              │                                                    │
//! │     │              └─► norsa_core::ndef::decode_tag                     │
//! │     │                                                                   │
//! │     └──────► P: ReceiptPrinter ──► ConsolePrinter / MockPrinter        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`traits`] - `NfcRadio` and `ReceiptPrinter`
//! - [`card_reader`] - Scan state machine and card writer
//! - [`console`] - Printer that writes markup to a stream
//! - [`mock`] - Channel-driven mocks with control handles
//! - [`error`] - Device error types

#![allow(async_fn_in_trait)]

pub mod card_reader;
pub mod console;
pub mod error;
pub mod mock;
pub mod traits;

pub use card_reader::{CardReader, ReaderState, DEFAULT_SCAN_TIMEOUT};
pub use console::ConsolePrinter;
pub use error::{DeviceError, DeviceResult};
pub use traits::{NfcEvent, NfcRadio, ReceiptPrinter};
