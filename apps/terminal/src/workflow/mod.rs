//! # Workflow Module
//!
//! Operator actions, each a short sequence of backend calls, local state
//! reads and prints.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Terminal<A, P, C>                                │
//! │                                                                         │
//! │  A: MerchantApi      P: ReceiptPrinter      C: Clock      Database      │
//! │                                                                         │
//! │  ┌───────────────────────┐  ┌──────────────────┐  ┌──────────────────┐ │
//! │  │ transaction.rs        │  │ report.rs        │  │ balance.rs       │ │
//! │  │ TransactionWorkflow   │  │ daily report     │  │ balance enquiry  │ │
//! │  │ scan → post → print   │  │ unlocks the gate │  │                  │ │
//! │  └───────────────────────┘  └──────────────────┘  └──────────────────┘ │
//! │  ┌──────────────────────────────────────────────┐                       │
//! │  │ printer.rs  settings, test page, reprint     │                       │
//! │  └──────────────────────────────────────────────┘                       │
//! │                                                                         │
//! │  DAILY GATE: expense, retour and balance are refused until a daily     │
//! │  report has been printed on the current local calendar day.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every action takes `&mut self` when it prints, so at most one print or
//! one workflow is in flight per terminal.

mod balance;
mod printer;
mod report;
mod transaction;

#[cfg(test)]
pub(crate) mod testing;

pub use balance::BalanceInquiry;
pub use report::{DailyReportOutcome, DailyReportStatus};
pub use transaction::{PostedTransaction, Stage, TransactionWorkflow};

use chrono::{DateTime, FixedOffset, Local};
use tracing::{debug, warn};
use uuid::Uuid;

use norsa_client::MerchantApi;
use norsa_core::receipt::{ReceiptBranding, ReceiptFormatter};
use norsa_core::report::is_daily_report_due;
use norsa_core::{CoreError, Session, TransactionType};
use norsa_device::ReceiptPrinter;
use norsa_store::Database;

use crate::error::TerminalResult;
use crate::state::SessionManager;

// =============================================================================
// Clock
// =============================================================================

/// Source of "now" for receipts, transactions and the daily gate.
pub trait Clock {
    /// Current local time with its UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the terminal's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Receipt numbers are short and only need to differ between consecutive
/// receipts.
pub(crate) fn next_receipt_number() -> u32 {
    (Uuid::new_v4().as_u128() % 1000) as u32
}

// =============================================================================
// Terminal
// =============================================================================

/// Everything an operator action needs.
pub struct Terminal<A, P, C = SystemClock> {
    api: A,
    printer: P,
    db: Database,
    sessions: SessionManager,
    branding: ReceiptBranding,
    clock: C,
}

impl<A, P> Terminal<A, P, SystemClock>
where
    A: MerchantApi,
    P: ReceiptPrinter,
{
    pub fn new(api: A, printer: P, db: Database, branding: ReceiptBranding) -> Self {
        Terminal::with_clock(api, printer, db, branding, SystemClock)
    }
}

impl<A, P, C> Terminal<A, P, C>
where
    A: MerchantApi,
    P: ReceiptPrinter,
    C: Clock,
{
    pub fn with_clock(api: A, printer: P, db: Database, branding: ReceiptBranding, clock: C) -> Self {
        Terminal {
            api,
            printer,
            sessions: SessionManager::new(db.clone()),
            db,
            branding,
            clock,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn branding(&self) -> &ReceiptBranding {
        &self.branding
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub async fn login(&self, email: &str, password: &str) -> TerminalResult<Session> {
        self.sessions.login(&self.api, email, password).await
    }

    pub async fn logout(&self) -> TerminalResult<()> {
        self.sessions.logout().await
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Starts an expense or retour.
    ///
    /// Requires a session and today's daily report.
    pub async fn begin_transaction(
        &mut self,
        kind: TransactionType,
    ) -> TerminalResult<TransactionWorkflow<'_, A, P, C>> {
        let session = self.sessions.current().await?;
        self.ensure_daily_report_printed().await?;
        Ok(TransactionWorkflow::new(self, kind, session))
    }

    // =========================================================================
    // Daily Gate
    // =========================================================================

    /// Whether the daily report still has to be printed today.
    pub async fn daily_report_due(&self) -> TerminalResult<bool> {
        let last_printed = self.db.journal().daily_report_printed_at().await?;
        Ok(is_daily_report_due(last_printed, &self.clock.now()))
    }

    pub(crate) async fn ensure_daily_report_printed(&self) -> TerminalResult<()> {
        if self.daily_report_due().await? {
            debug!("Action refused until the daily report is printed");
            return Err(CoreError::DailyReportRequired.into());
        }
        Ok(())
    }

    // =========================================================================
    // Printing
    // =========================================================================

    /// Renders a receipt with the stored printer geometry, prints it and
    /// remembers it for reprinting.
    pub(crate) async fn print_receipt(
        &mut self,
        render: impl FnOnce(&ReceiptFormatter) -> String,
    ) -> TerminalResult<()> {
        let config = self.db.printer_config().get().await?;
        let formatter = ReceiptFormatter::new(self.branding.clone(), &config);
        let markup = render(&formatter);

        self.printer.print(&markup, &config).await?;

        // Best effort: the receipt is already on paper
        if let Err(e) = self.db.journal().save_last_printed_receipt(&markup).await {
            warn!(error = %e, "Could not remember the printed receipt");
        }

        Ok(())
    }
}
