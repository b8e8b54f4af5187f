//! # Commands
//!
//! Command line surface. Each subcommand is one operator action on a
//! [`Terminal`]. The card token is typed in place of a scan.
//!
//! ```text
//! norsa-terminal login --email merchant@norsa.cw --password ********
//! norsa-terminal daily-report
//! norsa-terminal balance NRS-42 --print
//! norsa-terminal transaction expense NRS-42 --amount 12.50 --pin 1234 --client-copy
//! norsa-terminal printer set --dpi 203 --width-mm 58 --chars-per-line 32
//! norsa-terminal printer reset
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use norsa_client::MerchantApi;
use norsa_core::TransactionType;
use norsa_device::ReceiptPrinter;

use crate::workflow::{Clock, Stage, Terminal};

/// Norsa merchant terminal.
#[derive(Debug, Parser)]
#[command(name = "norsa-terminal", version, about)]
pub struct Cli {
    /// Config file. Defaults to terminal.toml in the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in as a merchant.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Log out and forget all local state.
    Logout,

    /// Show the balance on a card.
    Balance {
        card: String,
        /// Also print a balance receipt.
        #[arg(long)]
        print: bool,
    },

    /// Record an expense or a retour.
    Transaction {
        #[arg(value_enum)]
        kind: Kind,
        card: String,
        #[arg(long)]
        amount: String,
        /// PIN of the card's issuance.
        #[arg(long)]
        pin: String,
        /// Print the client copy after the merchant copy.
        #[arg(long)]
        client_copy: bool,
    },

    /// Print today's daily report.
    DailyReport {
        /// Only show whether the report is due.
        #[arg(long)]
        status: bool,
    },

    /// Print the last receipt again.
    Reprint,

    /// Printer settings.
    Printer {
        #[command(subcommand)]
        action: PrinterCommand,
    },
}

impl Command {
    /// Subcommand name for logs. Arguments are left out since they carry
    /// the password and the PIN.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::Balance { .. } => "balance",
            Command::Transaction { .. } => "transaction",
            Command::DailyReport { .. } => "daily-report",
            Command::Reprint => "reprint",
            Command::Printer { .. } => "printer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Expense,
    Retour,
}

impl From<Kind> for TransactionType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Expense => TransactionType::Expense,
            Kind::Retour => TransactionType::Retour,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum PrinterCommand {
    /// Show the stored settings.
    Show,

    /// Store new settings.
    Set {
        #[arg(long)]
        dpi: String,
        #[arg(long)]
        width_mm: String,
        #[arg(long)]
        chars_per_line: String,
    },

    /// Restore the default settings.
    Reset,

    /// Print a calibration page.
    Test,
}

/// Runs one command, writing operator messages to `out`.
pub async fn execute<A, P, C>(
    terminal: &mut Terminal<A, P, C>,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    A: MerchantApi,
    P: ReceiptPrinter,
    C: Clock,
{
    debug!(command = command.name(), "Executing command");

    match command {
        Command::Login { email, password } => {
            let session = terminal.login(&email, &password).await?;
            writeln!(out, "Logged in as {}", session.merchant_name)?;
        }

        Command::Logout => {
            terminal.logout().await?;
            writeln!(out, "Logged out")?;
        }

        Command::Balance { card, print } => {
            let inquiry = terminal.check_balance(&card).await?;
            writeln!(out, "{}", inquiry.message)?;
            if print {
                terminal.print_balance(&inquiry).await?;
            }
        }

        Command::Transaction {
            kind,
            card,
            amount,
            pin,
            client_copy,
        } => {
            let mut workflow = terminal.begin_transaction(kind.into()).await?;

            workflow.resolve_card(&card).await?;
            if let Some(client) = workflow.client() {
                writeln!(out, "Customer: {} ({})", client.name, client.code)?;
            }

            workflow.enter_amount(&amount).await?;
            if let Err(e) = workflow.confirm_pin(&pin).await {
                if workflow.stage() == Stage::Printing {
                    writeln!(out, "Transaction recorded, receipt not printed")?;
                }
                return Err(e.into());
            }

            if client_copy {
                workflow.print_client_copy().await?;
            } else {
                workflow.finish()?;
            }

            if let Some(posted) = workflow.posted() {
                writeln!(
                    out,
                    "{} of {} recorded (receipt {})",
                    posted.transaction.kind.receipt_label(),
                    posted.transaction.amount,
                    posted.receipt_number
                )?;
            }
        }

        Command::DailyReport { status: true } => {
            let status = terminal.daily_report_status().await?;
            if status.due {
                writeln!(out, "Daily report not printed today")?;
            } else {
                writeln!(out, "Daily report printed today")?;
            }
            if let Some(check) = status.server {
                writeln!(out, "Backend print check: {}", check.printed)?;
            }
        }

        Command::DailyReport { status: false } => {
            let outcome = terminal.print_daily_report().await?;
            writeln!(
                out,
                "Daily report printed: {} transactions, total {}",
                outcome.summary.transactions.len(),
                outcome.summary.total
            )?;
        }

        Command::Reprint => {
            terminal.reprint_last().await?;
        }

        Command::Printer {
            action: PrinterCommand::Show,
        } => {
            let config = terminal.printer_config().await?;
            writeln!(out, "Dpi: {}", config.dpi)?;
            writeln!(out, "Width MM: {}", config.width_mm)?;
            writeln!(out, "Nbr Characters Per Line: {}", config.chars_per_line)?;
        }

        Command::Printer {
            action:
                PrinterCommand::Set {
                    dpi,
                    width_mm,
                    chars_per_line,
                },
        } => {
            terminal
                .update_printer_config(&dpi, &width_mm, &chars_per_line)
                .await?;
            writeln!(out, "Printer settings saved")?;
        }

        Command::Printer {
            action: PrinterCommand::Reset,
        } => {
            terminal.reset_printer_config().await?;
            writeln!(out, "Printer config reset")?;
        }

        Command::Printer {
            action: PrinterCommand::Test,
        } => {
            terminal.print_test_page().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, TerminalError};
    use crate::workflow::testing::{Harness, CARD, PIN};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("norsa-terminal").chain(args.iter().copied())).unwrap()
    }

    async fn run(h: &mut Harness, args: &[&str]) -> anyhow::Result<String> {
        let mut out = Vec::new();
        execute(&mut h.terminal, parse(args).command, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_transaction() {
        let cli = parse(&[
            "--config",
            "/tmp/terminal.toml",
            "transaction",
            "retour",
            "NRS-42",
            "--amount",
            "4.50",
            "--pin",
            "1234",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/terminal.toml")));
        match cli.command {
            Command::Transaction {
                kind,
                card,
                client_copy,
                ..
            } => {
                assert_eq!(kind, Kind::Retour);
                assert_eq!(card, "NRS-42");
                assert!(!client_copy);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = Cli::try_parse_from([
            "norsa-terminal",
            "transaction",
            "refund",
            "NRS-42",
            "--amount",
            "1",
            "--pin",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_login_then_transaction_with_client_copy() {
        let mut h = Harness::logged_out().await;

        let output = run(&mut h, &["login", "--email", "merchant@norsa.cw", "--password", "hunter22"])
            .await
            .unwrap();
        assert_eq!(output, "Logged in as Snack Kas Ta Ta\n");

        run(&mut h, &["daily-report"]).await.unwrap();

        let output = run(
            &mut h,
            &["transaction", "expense", CARD, "--amount", "12.50", "--pin", PIN, "--client-copy"],
        )
        .await
        .unwrap();

        assert!(output.contains("Customer: Maria Martina (C-0007)"));
        assert!(output.contains("Sale of 12.50 recorded"));
        assert_eq!(h.api.posted().len(), 1);
        // daily report + merchant copy + client copy
        assert_eq!(h.printer.printed().len(), 3);
    }

    #[tokio::test]
    async fn test_errors_carry_terminal_error() {
        let mut h = Harness::logged_in().await;

        let err = run(&mut h, &["balance", CARD]).await.unwrap_err();
        let err = err.downcast_ref::<TerminalError>().unwrap();
        assert_eq!(err.kind, ErrorKind::BusinessRuleFailure);
    }

    #[tokio::test]
    async fn test_printer_show_and_set() {
        let mut h = Harness::logged_out().await;

        run(
            &mut h,
            &["printer", "set", "--dpi", "203", "--width-mm", "58", "--chars-per-line", "32"],
        )
        .await
        .unwrap();

        let output = run(&mut h, &["printer", "show"]).await.unwrap();
        assert_eq!(output, "Dpi: 203\nWidth MM: 58\nNbr Characters Per Line: 32\n");

        let output = run(&mut h, &["printer", "reset"]).await.unwrap();
        assert_eq!(output, "Printer config reset\n");

        let output = run(&mut h, &["printer", "show"]).await.unwrap();
        assert_eq!(output, "Dpi: 150\nWidth MM: 48\nNbr Characters Per Line: 30\n");
    }
}
