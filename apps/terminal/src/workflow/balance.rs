//! # Balance Enquiry
//!
//! Looks up what is left on a card and optionally prints it.

use tracing::info;

use norsa_client::MerchantApi;
use norsa_core::receipt::BalanceReceipt;
use norsa_core::{Client, IssuanceHistory, Session};
use norsa_device::ReceiptPrinter;

use super::{next_receipt_number, Clock, Terminal};
use crate::error::TerminalResult;

/// Result of a balance lookup.
#[derive(Debug, Clone)]
pub struct BalanceInquiry {
    pub card_token: String,
    pub issuance: IssuanceHistory,
    pub client: Client,
    /// "Your balance for card number … is : NAFL …"
    pub message: String,
    session: Session,
}

impl<A, P, C> Terminal<A, P, C>
where
    A: MerchantApi,
    P: ReceiptPrinter,
    C: Clock,
{
    /// Resolves the card and reports its balance.
    ///
    /// Blocked until today's daily report has been printed.
    pub async fn check_balance(&self, card_token: &str) -> TerminalResult<BalanceInquiry> {
        let session = self.sessions.current().await?;
        self.ensure_daily_report_printed().await?;

        let card_token = card_token.trim();
        let issuance = self.api.get_issuance_history(card_token).await?;
        let client = self.api.get_client(&issuance.client_id).await?;

        let message = format!(
            "Your balance for card number {} is : {}",
            card_token,
            issuance.balance.with_currency(&self.branding.currency)
        );
        info!(issuance_id = %issuance.id, balance = %issuance.balance, "Balance checked");

        Ok(BalanceInquiry {
            card_token: card_token.to_string(),
            issuance,
            client,
            message,
            session,
        })
    }

    /// Prints the balance receipt for a previous enquiry.
    pub async fn print_balance(&mut self, inquiry: &BalanceInquiry) -> TerminalResult<()> {
        let printed_at = self.clock.now();

        self.print_receipt(|formatter| {
            formatter.balance(&BalanceReceipt {
                receipt_number: next_receipt_number(),
                printed_at,
                balance: inquiry.issuance.balance,
                merchant_name: &inquiry.session.merchant_name,
                client: &inquiry.client,
            })
        })
        .await
    }
}
