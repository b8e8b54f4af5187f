//! # Norsa Terminal Library
//!
//! Wires configuration, local state, the backend gateway and the printer
//! into a [`workflow::Terminal`], and runs one command against it.
//!
//! ## Module Organization
//! ```text
//! norsa_terminal/
//! ├── lib.rs          ◄─── You are here (startup & wiring)
//! ├── commands.rs     ◄─── clap command line
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── terminal.toml + NORSA_* overrides
//! │   └── session.rs  ◄─── Login state owner
//! ├── workflow/
//! │   ├── mod.rs          ◄─── Terminal, Clock, daily gate
//! │   ├── transaction.rs  ◄─── Scan → amount → PIN → post → print
//! │   ├── report.rs       ◄─── Daily report
//! │   ├── balance.rs      ◄─── Balance enquiry
//! │   └── printer.rs      ◄─── Printer settings and reprint
//! └── error.rs        ◄─── TerminalError for every action
//! ```

pub mod commands;
pub mod error;
pub mod state;
pub mod workflow;

use anyhow::Context;
use tracing::{info, Subscriber};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use norsa_client::{Gateway, StoredSessionToken};
use norsa_device::{CardReader, ConsolePrinter, NfcRadio};
use norsa_store::{Database, StoreConfig};

use commands::Cli;
use error::TerminalResult;
use state::{NfcSettings, TerminalConfig};
use workflow::Terminal;

/// Runs one command.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Terminal Startup                                  │
/// │                                                                         │
/// │  1. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → terminal.toml → NORSA_* environment                    │
/// │                                                                         │
/// │  2. Open Local State ─────────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  3. Build Services ───────────────────────────────────────────────────► │
/// │     • Gateway with the stored session as token source                   │
/// │     • Console printer on stdout                                         │
/// │                                                                         │
/// │  4. Execute Command ──────────────────────────────────────────────────► │
/// │                                                                         │
/// │  5. Close the pool                                                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = TerminalConfig::load(cli.config).context("Failed to load configuration")?;

    let db_path = config.database_path()?;
    info!(?db_path, "Database path determined");

    let db = Database::new(StoreConfig::new(db_path))
        .await
        .context("Failed to open local state")?;

    let gateway = Gateway::new(&config.api, StoredSessionToken::new(db.clone()))
        .context("Invalid backend configuration")?;

    let mut terminal = Terminal::new(
        gateway,
        ConsolePrinter::stdout(),
        db.clone(),
        config.receipt.branding(),
    );

    let result = commands::execute(&mut terminal, cli.command, &mut std::io::stdout()).await;

    db.close().await;
    result
}

/// Starts a card reader with the configured scan timeout.
pub async fn start_card_reader<R: NfcRadio>(
    radio: R,
    settings: &NfcSettings,
) -> TerminalResult<CardReader<R>> {
    Ok(CardReader::start(radio, settings.scan_timeout()).await?)
}

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "info,norsa=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr; stdout carries operator messages and console receipts.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=norsa=trace` - Show trace for norsa crates only
/// - Default: INFO, debug for norsa crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    log_subscriber(filter).init();
}

fn log_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use norsa_device::mock::MockNfcRadio;
    use std::time::Duration;
    use tracing::Level;

    #[tokio::test]
    async fn test_card_reader_uses_configured_timeout() {
        let (radio, nfc) = MockNfcRadio::new();
        let settings = NfcSettings {
            scan_timeout_secs: 12,
        };

        let _reader = start_card_reader(radio, &settings).await.unwrap();
        assert!(nfc.is_started());
        assert_eq!(settings.scan_timeout(), Duration::from_secs(12));
    }

    #[test]
    fn test_default_log_filter_is_honoured() {
        let subscriber = log_subscriber(EnvFilter::new(DEFAULT_LOG_FILTER));

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "norsa_terminal::workflow", Level::DEBUG));
            assert!(!tracing::enabled!(target: "norsa_terminal::workflow", Level::TRACE));
            assert!(tracing::enabled!(target: "sqlx::query", Level::WARN));
            assert!(!tracing::enabled!(target: "sqlx::query", Level::INFO));
        });
    }
}
