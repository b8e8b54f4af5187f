//! # Merchant API
//!
//! The backend operations the terminal depends on. [`crate::Gateway`] is the
//! HTTP implementation; workflows are generic over this trait so they run
//! against in-memory fakes in tests.

use norsa_core::{Client, DailyTransaction, IssuanceHistory, Session, Transaction};

use crate::error::GatewayResult;
use crate::wire::DailyPrintCheck;

/// Backend operations. Each call is independently fallible.
pub trait MerchantApi {
    /// Authenticates and resolves the merchant display name.
    async fn login(&self, email: &str, password: &str) -> GatewayResult<Session>;

    /// Issuance bound to the scanned card.
    async fn get_issuance_history(&self, card_token: &str) -> GatewayResult<IssuanceHistory>;

    /// Every issuance bound to the scanned card.
    async fn get_issuance_histories(&self, card_token: &str)
        -> GatewayResult<Vec<IssuanceHistory>>;

    async fn get_client(&self, client_id: &str) -> GatewayResult<Client>;

    /// Merchant record id for a backend user id.
    async fn get_merchant_id(&self, user_id: &str) -> GatewayResult<String>;

    /// Posts a transaction and returns the server's message.
    ///
    /// Not idempotent: a second call books a second transaction.
    async fn create_transaction(&self, transaction: &Transaction) -> GatewayResult<String>;

    /// Today's transactions for the logged-in merchant.
    async fn get_daily_transactions(&self) -> GatewayResult<Vec<DailyTransaction>>;

    async fn get_daily_print_check(&self, merchant_id: &str)
        -> GatewayResult<Option<DailyPrintCheck>>;

    async fn post_daily_print_check(
        &self,
        merchant_id: &str,
        check: &DailyPrintCheck,
    ) -> GatewayResult<bool>;
}
