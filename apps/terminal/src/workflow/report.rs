//! # Daily Report
//!
//! Prints today's sales and unlocks the terminal for the day.
//!
//! ```text
//! get_daily_transactions ──► DailySummary ──► print
//!                                               │
//!                         mark_daily_report_printed (local gate opens)
//!                                               │
//!             get_merchant_id ──► post_daily_print_check (best effort)
//! ```
//!
//! The local timestamp is what the gate checks. The server print check is
//! informational; failing to send it never fails the report.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{info, warn};

use norsa_client::{DailyPrintCheck, GatewayResult, MerchantApi};
use norsa_core::receipt::DailyReceipt;
use norsa_core::report::DailySummary;
use norsa_core::Session;
use norsa_device::ReceiptPrinter;

use super::{next_receipt_number, Clock, Terminal};
use crate::error::TerminalResult;

/// What a printed daily report contained.
#[derive(Debug, Clone)]
pub struct DailyReportOutcome {
    pub summary: DailySummary,
    pub receipt_number: u32,
    pub printed_at: DateTime<FixedOffset>,
    /// Whether the backend recorded the print.
    pub server_acknowledged: bool,
}

/// Daily report state, locally and on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyReportStatus {
    /// Transactions stay blocked while this is true.
    pub due: bool,
    pub last_printed_at: Option<DateTime<Utc>>,
    /// `None` when the backend has no record or could not be asked.
    pub server: Option<DailyPrintCheck>,
}

impl<A, P, C> Terminal<A, P, C>
where
    A: MerchantApi,
    P: ReceiptPrinter,
    C: Clock,
{
    /// Fetches, prints and records today's daily report.
    ///
    /// Not gated: this is the action that opens the gate. A printer
    /// failure leaves the gate closed.
    pub async fn print_daily_report(&mut self) -> TerminalResult<DailyReportOutcome> {
        let session = self.sessions.current().await?;
        let summary = DailySummary::new(self.api.get_daily_transactions().await?);

        let receipt_number = next_receipt_number();
        let printed_at = self.clock.now();

        self.print_receipt(|formatter| {
            formatter.daily(&DailyReceipt {
                receipt_number,
                printed_at,
                merchant_name: &session.merchant_name,
                summary: &summary,
            })
        })
        .await?;

        self.db
            .journal()
            .mark_daily_report_printed(printed_at.with_timezone(&Utc))
            .await?;

        let server_acknowledged = match self.acknowledge_daily_report(&session, printed_at).await {
            Ok(acknowledged) => acknowledged,
            Err(e) => {
                warn!(error = %e, "Daily print check not recorded by backend");
                false
            }
        };

        info!(
            transactions = summary.transactions.len(),
            total = %summary.total,
            server_acknowledged,
            "Daily report printed"
        );

        Ok(DailyReportOutcome {
            summary,
            receipt_number,
            printed_at,
            server_acknowledged,
        })
    }

    /// Local gate state plus the backend's print check.
    pub async fn daily_report_status(&self) -> TerminalResult<DailyReportStatus> {
        let session = self.sessions.current().await?;
        let last_printed_at = self.db.journal().daily_report_printed_at().await?;
        let due = self.daily_report_due().await?;

        let server = match self.fetch_print_check(&session).await {
            Ok(check) => check,
            Err(e) => {
                warn!(error = %e, "Could not read daily print check");
                None
            }
        };

        Ok(DailyReportStatus {
            due,
            last_printed_at,
            server,
        })
    }

    async fn acknowledge_daily_report(
        &self,
        session: &Session,
        printed_at: DateTime<FixedOffset>,
    ) -> GatewayResult<bool> {
        let merchant_id = self.api.get_merchant_id(&session.user_id).await?;
        let check = DailyPrintCheck {
            printed: true,
            printed_at: Some(printed_at.with_timezone(&Utc)),
        };
        self.api.post_daily_print_check(&merchant_id, &check).await
    }

    async fn fetch_print_check(&self, session: &Session) -> GatewayResult<Option<DailyPrintCheck>> {
        let merchant_id = self.api.get_merchant_id(&session.user_id).await?;
        self.api.get_daily_print_check(&merchant_id).await
    }
}
