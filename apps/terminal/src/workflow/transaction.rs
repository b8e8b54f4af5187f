//! # Transaction Workflow
//!
//! One expense or retour, from card to printed receipts.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  AwaitingScan ──resolve_card──► Resolving ──ok──► AwaitingAmount        │
//! │       ▲                            │                  │   ▲             │
//! │       └─────────── lookup failed ──┘      enter_amount│   │ edit_amount │
//! │                                                       ▼   │             │
//! │                                        AwaitingPinConfirmation          │
//! │                                           │    ▲                        │
//! │                               confirm_pin │    └── wrong PIN            │
//! │                                           ▼                             │
//! │  AwaitingAmount ◄── post failed ──── Posting                            │
//! │  (PIN already verified: enter_amount posts directly)                    │
//! │                                           │ posted once                 │
//! │                                           ▼                             │
//! │                                       Printing ◄── printer failed       │
//! │                                  merchant copy, then client copy        │
//! │                                           │                             │
//! │                                           ▼                             │
//! │                                         Done                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The backend call happens exactly once per workflow. Every later print
//! (client copy, retry after a printer failure) reuses the posted
//! transaction held in memory.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use norsa_client::{GatewayError, MerchantApi};
use norsa_core::receipt::TransactionReceipt;
use norsa_core::validation::{validate_amount, verify_pin};
use norsa_core::{
    Client, IssuanceHistory, Money, ReceiptCopy, Session, TagError, Transaction, TransactionType,
};
use norsa_device::{CardReader, NfcRadio, ReceiptPrinter};

use super::{next_receipt_number, Clock, Terminal};
use crate::error::{TerminalError, TerminalResult};

/// Where a [`TransactionWorkflow`] stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitingScan,
    Resolving,
    AwaitingAmount,
    AwaitingPinConfirmation,
    Posting,
    Printing,
    Done,
}

/// A transaction the backend accepted, plus what its receipts need.
#[derive(Debug, Clone)]
pub struct PostedTransaction {
    pub transaction: Transaction,
    pub receipt_number: u32,
    pub printed_at: DateTime<FixedOffset>,
    /// Message the backend answered with.
    pub server_message: String,
}

/// Drives one transaction. Created by [`Terminal::begin_transaction`].
pub struct TransactionWorkflow<'t, A, P, C> {
    terminal: &'t mut Terminal<A, P, C>,
    attempt_id: Uuid,
    kind: TransactionType,
    session: Session,
    stage: Stage,
    issuance: Option<IssuanceHistory>,
    client: Option<Client>,
    amount: Option<Money>,
    pin_verified: bool,
    posted: Option<PostedTransaction>,
    has_printed_for_merchant: bool,
}

impl<'t, A, P, C> TransactionWorkflow<'t, A, P, C>
where
    A: MerchantApi,
    P: ReceiptPrinter,
    C: Clock,
{
    pub(crate) fn new(terminal: &'t mut Terminal<A, P, C>, kind: TransactionType, session: Session) -> Self {
        let attempt_id = Uuid::new_v4();
        debug!(attempt_id = %attempt_id, kind = %kind, "Transaction workflow started");

        TransactionWorkflow {
            terminal,
            attempt_id,
            kind,
            session,
            stage: Stage::AwaitingScan,
            issuance: None,
            client: None,
            amount: None,
            pin_verified: false,
            posted: None,
            has_printed_for_merchant: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    /// Correlation id carried by every log line of this attempt.
    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn issuance(&self) -> Option<&IssuanceHistory> {
        self.issuance.as_ref()
    }

    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    pub fn posted(&self) -> Option<&PostedTransaction> {
        self.posted.as_ref()
    }

    pub fn has_printed_for_merchant(&self) -> bool {
        self.has_printed_for_merchant
    }

    // =========================================================================
    // Card
    // =========================================================================

    /// Waits for a card on `reader` and resolves it.
    pub async fn scan_card<R: NfcRadio>(
        &mut self,
        reader: &CardReader<R>,
    ) -> TerminalResult<IssuanceHistory> {
        self.expect_stage(Stage::AwaitingScan)?;
        let token = reader.scan().await?;
        self.resolve_card(&token).await
    }

    /// Looks up the issuance and the cardholder for a card token.
    ///
    /// Any failure returns to `AwaitingScan`.
    pub async fn resolve_card(&mut self, card_token: &str) -> TerminalResult<IssuanceHistory> {
        self.expect_stage(Stage::AwaitingScan)?;

        let token = card_token.trim();
        if token.is_empty() {
            return Err(TagError::InvalidTagContent.into());
        }

        self.stage = Stage::Resolving;

        match self.lookup(token).await {
            Ok((issuance, client)) => {
                info!(
                    attempt_id = %self.attempt_id,
                    issuance_id = %issuance.id,
                    client_id = %client.id,
                    balance = %issuance.balance,
                    "Card resolved"
                );
                self.issuance = Some(issuance.clone());
                self.client = Some(client);
                self.pin_verified = false;
                self.stage = Stage::AwaitingAmount;
                Ok(issuance)
            }
            Err(e) => {
                warn!(attempt_id = %self.attempt_id, error = %e, "Card lookup failed");
                self.stage = Stage::AwaitingScan;
                Err(e.into())
            }
        }
    }

    async fn lookup(&self, token: &str) -> Result<(IssuanceHistory, Client), GatewayError> {
        let issuance = self.terminal.api.get_issuance_history(token).await?;
        let client = self.terminal.api.get_client(&issuance.client_id).await?;
        Ok((issuance, client))
    }

    // =========================================================================
    // Amount and PIN
    // =========================================================================

    /// Validates the amount against the balance.
    ///
    /// Before the PIN has been confirmed this moves to
    /// `AwaitingPinConfirmation`; afterwards it posts straight away.
    /// A rejected amount leaves the stage unchanged and nothing is posted.
    pub async fn enter_amount(&mut self, input: &str) -> TerminalResult<Stage> {
        self.expect_stage(Stage::AwaitingAmount)?;

        let balance = self.current_issuance()?.balance;
        let amount = validate_amount(input, self.kind, balance).map_err(|e| {
            debug!(attempt_id = %self.attempt_id, error = %e, "Amount rejected");
            TerminalError::from(e)
        })?;
        self.amount = Some(amount);

        if self.pin_verified {
            return self.post().await;
        }

        self.stage = Stage::AwaitingPinConfirmation;
        Ok(self.stage)
    }

    /// Goes back from PIN entry to change the amount.
    pub fn edit_amount(&mut self) -> TerminalResult<()> {
        self.expect_stage(Stage::AwaitingPinConfirmation)?;
        self.stage = Stage::AwaitingAmount;
        Ok(())
    }

    /// Checks the re-entered PIN, then posts and prints the merchant copy.
    ///
    /// A wrong PIN stays in `AwaitingPinConfirmation`.
    pub async fn confirm_pin(&mut self, pin: &str) -> TerminalResult<Stage> {
        self.expect_stage(Stage::AwaitingPinConfirmation)?;

        if let Err(e) = verify_pin(pin, &self.current_issuance()?.pin_code) {
            warn!(attempt_id = %self.attempt_id, "PIN confirmation failed");
            return Err(e.into());
        }

        self.pin_verified = true;
        self.post().await
    }

    // =========================================================================
    // Posting
    // =========================================================================

    async fn post(&mut self) -> TerminalResult<Stage> {
        let amount = self
            .amount
            .ok_or_else(|| TerminalError::business_rule("Enter an amount first"))?;
        let now = self.terminal.clock.now();
        let transaction = Transaction::new(
            self.current_issuance()?,
            self.session.user_id.clone(),
            self.kind,
            amount,
            now.with_timezone(&Utc),
        );

        self.stage = Stage::Posting;
        info!(
            attempt_id = %self.attempt_id,
            kind = %self.kind,
            amount = %amount,
            issuance_id = %transaction.issuance_history_id,
            "Posting transaction"
        );

        let server_message = match self.terminal.api.create_transaction(&transaction).await {
            Ok(message) => message,
            Err(e) => {
                warn!(attempt_id = %self.attempt_id, error = %e, "Transaction rejected");
                self.stage = Stage::AwaitingAmount;
                return Err(e.into());
            }
        };

        info!(attempt_id = %self.attempt_id, message = %server_message, "Transaction posted");

        self.posted = Some(PostedTransaction {
            transaction,
            receipt_number: next_receipt_number(),
            printed_at: now,
            server_message,
        });
        self.stage = Stage::Printing;

        self.print_copy(ReceiptCopy::Merchant).await?;
        Ok(self.stage)
    }

    // =========================================================================
    // Printing
    // =========================================================================

    /// Prints whichever copy is outstanding. Also the retry after a
    /// printer failure.
    pub async fn print_next_copy(&mut self) -> TerminalResult<ReceiptCopy> {
        self.expect_stage(Stage::Printing)?;

        let copy = if self.has_printed_for_merchant {
            ReceiptCopy::Client
        } else {
            ReceiptCopy::Merchant
        };
        self.print_copy(copy).await?;
        Ok(copy)
    }

    /// Prints the client copy of the already posted transaction.
    pub async fn print_client_copy(&mut self) -> TerminalResult<()> {
        self.expect_stage(Stage::Printing)?;

        if !self.has_printed_for_merchant {
            return Err(TerminalError::business_rule("Print the merchant copy first"));
        }
        self.print_copy(ReceiptCopy::Client).await
    }

    /// Ends the workflow without a client copy.
    pub fn finish(&mut self) -> TerminalResult<()> {
        self.expect_stage(Stage::Printing)?;

        if !self.has_printed_for_merchant {
            return Err(TerminalError::business_rule("Print the merchant copy first"));
        }
        self.stage = Stage::Done;
        Ok(())
    }

    async fn print_copy(&mut self, copy: ReceiptCopy) -> TerminalResult<()> {
        let (Some(posted), Some(client)) = (self.posted.as_ref(), self.client.as_ref()) else {
            return Err(TerminalError::business_rule("Nothing has been posted yet"));
        };
        let merchant_name = self.session.merchant_name.as_str();

        let printed = self
            .terminal
            .print_receipt(|formatter| {
                formatter.transaction(&TransactionReceipt {
                    receipt_number: posted.receipt_number,
                    printed_at: posted.printed_at,
                    kind: posted.transaction.kind,
                    amount: posted.transaction.amount,
                    merchant_name,
                    client,
                })
            })
            .await;

        if let Err(e) = printed {
            warn!(attempt_id = %self.attempt_id, ?copy, error = %e, "Receipt not printed");
            return Err(e);
        }

        debug!(attempt_id = %self.attempt_id, ?copy, "Receipt printed");
        match copy {
            ReceiptCopy::Merchant => self.has_printed_for_merchant = true,
            ReceiptCopy::Client => self.stage = Stage::Done,
        }
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn expect_stage(&self, expected: Stage) -> TerminalResult<()> {
        if self.stage != expected {
            return Err(TerminalError::business_rule(format!(
                "Not available while {:?}",
                self.stage
            )));
        }
        Ok(())
    }

    fn current_issuance(&self) -> TerminalResult<&IssuanceHistory> {
        self.issuance
            .as_ref()
            .ok_or_else(|| TerminalError::business_rule("Scan a card first"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
