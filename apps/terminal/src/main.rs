//! # Norsa Terminal Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Norsa Terminal                                   │
//! │                                                                         │
//! │  main.rs ────► logging, argument parsing, exit code                    │
//! │                                                                         │
//! │  lib.rs ─────► configuration, local state, gateway, printer            │
//! │                                                                         │
//! │  commands ───► login, balance, transaction, daily-report, printer      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operator-facing failures print their message; anything else prints the
//! full error chain.

use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use norsa_terminal::commands::Cli;
use norsa_terminal::error::TerminalError;

#[tokio::main]
async fn main() -> ExitCode {
    norsa_terminal::init_tracing();
    let cli = Cli::parse();

    info!(command = cli.command.name(), "Starting Norsa terminal");

    match norsa_terminal::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<TerminalError>() {
                Some(terminal_err) => eprintln!("error: {}", terminal_err.message),
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
