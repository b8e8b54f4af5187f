//! In-memory backend and terminal fixtures for workflow tests.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use norsa_client::{DailyPrintCheck, GatewayError, GatewayResult, MerchantApi};
use norsa_core::ndef::{NdefRecord, NfcTag};
use norsa_core::receipt::ReceiptBranding;
use norsa_core::{
    Client, DailyTransaction, IssuanceFields, IssuanceHistory, Money, Session, Transaction,
};
use norsa_device::mock::{MockPrinter, MockPrinterHandle};
use norsa_store::{Database, StoreConfig};

use super::{Clock, Terminal};

pub const CARD: &str = "NRS-42";
pub const PIN: &str = "1234";

// =============================================================================
// Clock
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// 16 Oct 2026, 10:30 in Willemstad (UTC-4).
pub fn morning() -> DateTime<FixedOffset> {
    FixedOffset::west_opt(4 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 16, 10, 30, 0)
        .unwrap()
}

pub fn card_tag(text: &str) -> NfcTag {
    NfcTag {
        id: vec![0x04, 0xA2, 0x19, 0x7F],
        records: vec![NdefRecord::text(text, "en")],
    }
}

// =============================================================================
// Fake Backend
// =============================================================================

#[derive(Debug, Default)]
struct Inner {
    logins: Vec<String>,
    posted: Vec<Transaction>,
    post_attempts: usize,
    post_failures: usize,
    issuance_lookups: usize,
    daily: Vec<DailyTransaction>,
    print_checks: Vec<(String, DailyPrintCheck)>,
    print_check_fails: bool,
}

/// Backend with one merchant and one card.
#[derive(Debug, Clone, Default)]
pub struct FakeApi {
    inner: Arc<Mutex<Inner>>,
}

impl FakeApi {
    pub fn new() -> Self {
        FakeApi::default()
    }

    pub fn session() -> Session {
        Session {
            access_token: "tok-abc".into(),
            refresh_token: None,
            expires_at: None,
            user_id: "user-9".into(),
            merchant_name: "Snack Kas Ta Ta".into(),
        }
    }

    pub fn issuance() -> IssuanceHistory {
        IssuanceHistory::new(IssuanceFields {
            id: "iss-42".into(),
            client_id: "cl-7".into(),
            pin_code: PIN.into(),
            amount: Money::from_major(500),
            balance: Money::from_major(120),
            payback_period_months: 6,
            client_code: "C-0007".into(),
            client_name: "Maria Martina".into(),
        })
        .unwrap()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn fail_next_posts(&self, count: usize) {
        self.lock().post_failures = count;
    }

    pub fn fail_print_checks(&self) {
        self.lock().print_check_fails = true;
    }

    pub fn set_daily(&self, transactions: Vec<DailyTransaction>) {
        self.lock().daily = transactions;
    }

    pub fn logins(&self) -> Vec<String> {
        self.lock().logins.clone()
    }

    pub fn posted(&self) -> Vec<Transaction> {
        self.lock().posted.clone()
    }

    pub fn post_attempts(&self) -> usize {
        self.lock().post_attempts
    }

    pub fn issuance_lookups(&self) -> usize {
        self.lock().issuance_lookups
    }

    pub fn print_checks(&self) -> Vec<(String, DailyPrintCheck)> {
        self.lock().print_checks.clone()
    }
}

impl MerchantApi for FakeApi {
    async fn login(&self, email: &str, password: &str) -> GatewayResult<Session> {
        self.lock().logins.push(email.to_string());

        if email == "merchant@norsa.cw" && password == "hunter22" {
            Ok(FakeApi::session())
        } else {
            Err(GatewayError::InvalidCredentials)
        }
    }

    async fn get_issuance_history(&self, card_token: &str) -> GatewayResult<IssuanceHistory> {
        self.lock().issuance_lookups += 1;

        if card_token == CARD {
            Ok(FakeApi::issuance())
        } else {
            Err(GatewayError::Rejected {
                status: 404,
                message: Some("No issuance found for this card".into()),
            })
        }
    }

    async fn get_issuance_histories(&self, card_token: &str) -> GatewayResult<Vec<IssuanceHistory>> {
        Ok(vec![self.get_issuance_history(card_token).await?])
    }

    async fn get_client(&self, client_id: &str) -> GatewayResult<Client> {
        if client_id == "cl-7" {
            Ok(FakeApi::issuance().client())
        } else {
            Err(GatewayError::NotFound(client_id.to_string()))
        }
    }

    async fn get_merchant_id(&self, user_id: &str) -> GatewayResult<String> {
        if user_id == "user-9" {
            Ok("merchant-3".into())
        } else {
            Err(GatewayError::NotFound(user_id.to_string()))
        }
    }

    async fn create_transaction(&self, transaction: &Transaction) -> GatewayResult<String> {
        let mut inner = self.lock();
        inner.post_attempts += 1;

        if inner.post_failures > 0 {
            inner.post_failures -= 1;
            return Err(GatewayError::Rejected {
                status: 503,
                message: Some("Database offline".into()),
            });
        }

        inner.posted.push(transaction.clone());
        Ok("success".into())
    }

    async fn get_daily_transactions(&self) -> GatewayResult<Vec<DailyTransaction>> {
        Ok(self.lock().daily.clone())
    }

    async fn get_daily_print_check(&self, merchant_id: &str) -> GatewayResult<Option<DailyPrintCheck>> {
        Ok(self
            .lock()
            .print_checks
            .iter()
            .rev()
            .find(|(id, _)| id == merchant_id)
            .map(|(_, check)| check.clone()))
    }

    async fn post_daily_print_check(
        &self,
        merchant_id: &str,
        check: &DailyPrintCheck,
    ) -> GatewayResult<bool> {
        let mut inner = self.lock();
        if inner.print_check_fails {
            return Err(GatewayError::Timeout);
        }
        inner.print_checks.push((merchant_id.to_string(), check.clone()));
        Ok(true)
    }
}

// =============================================================================
// Harness
// =============================================================================

/// A terminal on the fake backend with a mock printer.
pub struct Harness {
    pub terminal: Terminal<FakeApi, MockPrinter, FixedClock>,
    pub api: FakeApi,
    pub printer: MockPrinterHandle,
    pub db: Database,
    now: DateTime<FixedOffset>,
}

impl Harness {
    /// Nobody logged in.
    pub async fn logged_out() -> Self {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let api = FakeApi::new();
        let (printer, handle) = MockPrinter::new();
        let now = morning();

        Harness {
            terminal: Terminal::with_clock(
                api.clone(),
                printer,
                db.clone(),
                ReceiptBranding::default(),
                FixedClock(now),
            ),
            api,
            printer: handle,
            db,
            now,
        }
    }

    /// Logged in, daily report not printed yet.
    pub async fn logged_in() -> Self {
        let harness = Harness::logged_out().await;
        harness.db.sessions().save(&FakeApi::session()).await.unwrap();
        harness
    }

    /// Logged in and today's daily report printed.
    pub async fn ready() -> Self {
        let harness = Harness::logged_in().await;
        harness
            .db
            .journal()
            .mark_daily_report_printed(harness.now.with_timezone(&Utc))
            .await
            .unwrap();
        harness
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }
}
