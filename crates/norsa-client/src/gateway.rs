//! # HTTP Gateway
//!
//! [`MerchantApi`] over reqwest.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  operation ──► url(template, id) ──► authed(builder) ──► send (≤ 15 s) │
//! │                                          │                    │         │
//! │                              TokenSource::token()             ▼         │
//! │                              (fresh every call)        parse::<T>(resp) │
//! │                                                               │         │
//! │                  2xx ─► strict serde decode ─► domain type ◄──┤         │
//! │                  4xx/5xx ─► ErrorBody { message | error } ────┘         │
//! │                             → GatewayError::Rejected                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here retries. In particular `create_transaction` is sent exactly
//! once per call.

use chrono::Utc;
use norsa_core::{Client, DailyTransaction, IssuanceHistory, Session, Transaction};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::MerchantApi;
use crate::config::{Endpoints, GatewayConfig};
use crate::error::{GatewayError, GatewayResult};
use crate::token::TokenSource;
use crate::wire::{
    ClientRecord, DailyPrintCheck, DailyPrintCheckBody, DailyTransactionsBody, DataEnvelope,
    ErrorBody, IdRecord, IssuanceEntry, IssuanceRequest, LoginData, LoginRequest, MerchantName,
    MessageBody, SuccessBody, TransactionPayload, SUCCESS_MESSAGE,
};

/// REST client for the merchant backend.
#[derive(Debug, Clone)]
pub struct Gateway<T> {
    http: reqwest::Client,
    base: Url,
    endpoints: Endpoints,
    tokens: T,
}

impl<T: TokenSource> Gateway<T> {
    /// Builds a gateway. Fails on an invalid configuration.
    pub fn new(config: &GatewayConfig, tokens: T) -> GatewayResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GatewayError::InvalidConfig(format!("http client: {e}")))?;

        let base = config.base()?;
        info!(base_url = %base, timeout_secs = config.timeout_secs, "Backend gateway ready");

        Ok(Gateway {
            http,
            base,
            endpoints: config.endpoints.clone(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> GatewayResult<Url> {
        self.base
            .join(path)
            .map_err(|e| GatewayError::InvalidUrl(format!("{path}: {e}")))
    }

    fn url_with_id(&self, template: &str, id: &str) -> GatewayResult<Url> {
        self.url(&Endpoints::resolve(template, id))
    }

    /// Attaches the current bearer token.
    async fn authed(&self, builder: reqwest::RequestBuilder) -> GatewayResult<reqwest::RequestBuilder> {
        let token = self.tokens.token().await?;
        Ok(builder.bearer_auth(token))
    }

    /// Maps non-2xx to [`GatewayError::Rejected`] and decodes the body.
    async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> GatewayResult<R> {
        let status = resp.status();
        let url = resp.url().path().to_string();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message);
            warn!(path = %url, status = status.as_u16(), message = ?message, "Backend rejected request");

            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice::<R>(&bytes).map_err(|e| {
            warn!(path = %url, error = %e, "Unexpected response body");
            GatewayError::Decode(format!("{url}: {e}"))
        })
    }

    async fn get<R: DeserializeOwned>(&self, url: Url) -> GatewayResult<R> {
        debug!(path = url.path(), "GET");
        let req = self.authed(self.http.get(url)).await?;
        let resp = req.send().await?;
        Self::parse(resp).await
    }

    async fn post<B: serde::Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> GatewayResult<R> {
        debug!(path = url.path(), "POST");
        let req = self.authed(self.http.post(url).json(body)).await?;
        let resp = req.send().await?;
        Self::parse(resp).await
    }
}

impl<T: TokenSource> MerchantApi for Gateway<T> {
    async fn login(&self, email: &str, password: &str) -> GatewayResult<Session> {
        info!(email = %email, "Logging in");

        let resp = self
            .http
            .post(self.url(&self.endpoints.login)?)
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        if resp.status() == StatusCode::BAD_REQUEST {
            warn!(email = %email, "Login refused");
            return Err(GatewayError::InvalidCredentials);
        }

        let login: DataEnvelope<LoginData> = Self::parse(resp).await?;

        // The new token is not persisted yet, so this call bypasses the token source
        let resp = self
            .http
            .get(self.url(&self.endpoints.merchant_name)?)
            .bearer_auth(&login.data.access_token)
            .send()
            .await?;
        let merchant: MerchantName = Self::parse(resp).await?;

        let session = login.data.into_session(merchant.name, Utc::now());
        info!(user_id = %session.user_id, merchant = %session.merchant_name, "Logged in");
        Ok(session)
    }

    async fn get_issuance_history(&self, card_token: &str) -> GatewayResult<IssuanceHistory> {
        let url = self.url(&self.endpoints.issuance_history)?;
        let body: DataEnvelope<IssuanceEntry> = self
            .post(url, &IssuanceRequest { nfc_card_id: card_token })
            .await?;

        let issuance = body.data.into_domain()?;
        debug!(issuance_id = %issuance.id, client_id = %issuance.client_id, "Issuance resolved");
        Ok(issuance)
    }

    async fn get_issuance_histories(
        &self,
        card_token: &str,
    ) -> GatewayResult<Vec<IssuanceHistory>> {
        let url = self.url(&self.endpoints.issuance_histories)?;
        let body: DataEnvelope<Vec<IssuanceEntry>> = self
            .post(url, &IssuanceRequest { nfc_card_id: card_token })
            .await?;

        body.data.into_iter().map(IssuanceEntry::into_domain).collect()
    }

    async fn get_client(&self, client_id: &str) -> GatewayResult<Client> {
        let url = self.url_with_id(&self.endpoints.client, client_id)?;
        let record: ClientRecord = self.get(url).await?;
        Ok(record.into())
    }

    async fn get_merchant_id(&self, user_id: &str) -> GatewayResult<String> {
        let url = self.url_with_id(&self.endpoints.merchant_id, user_id)?;
        let body: DataEnvelope<Vec<IdRecord>> = self.get(url).await?;

        body.data
            .into_iter()
            .next()
            .map(|record| record.id)
            .ok_or_else(|| GatewayError::NotFound(format!("merchant for user {user_id}")))
    }

    async fn create_transaction(&self, transaction: &Transaction) -> GatewayResult<String> {
        info!(
            client_id = %transaction.client_id,
            issuance_id = %transaction.issuance_history_id,
            kind = %transaction.kind,
            amount = %transaction.amount,
            "Posting transaction"
        );

        let url = self.url(&self.endpoints.create_transaction)?;
        let body: MessageBody = self.post(url, &TransactionPayload::from(transaction)).await?;
        Ok(body.message)
    }

    async fn get_daily_transactions(&self) -> GatewayResult<Vec<DailyTransaction>> {
        let url = self.url(&self.endpoints.daily_transactions)?;
        let body: DailyTransactionsBody = self.get(url).await?;

        if body.message != SUCCESS_MESSAGE {
            warn!(message = %body.message, "Daily transactions not available");
            return Err(GatewayError::Decode(format!(
                "daily transactions reported '{}'",
                body.message
            )));
        }

        let records = body
            .data
            .ok_or_else(|| GatewayError::Decode("daily transactions without data".to_string()))?;

        records.into_iter().map(|r| r.into_domain()).collect()
    }

    async fn get_daily_print_check(
        &self,
        merchant_id: &str,
    ) -> GatewayResult<Option<DailyPrintCheck>> {
        let url = self.url_with_id(&self.endpoints.daily_print_check, merchant_id)?;
        let body: DailyPrintCheckBody = self.get(url).await?;

        if !body.success {
            return Ok(None);
        }
        Ok(body.data)
    }

    async fn post_daily_print_check(
        &self,
        merchant_id: &str,
        check: &DailyPrintCheck,
    ) -> GatewayResult<bool> {
        let url = self.url_with_id(&self.endpoints.daily_print_check, merchant_id)?;
        let body: SuccessBody = self.post(url, check).await?;
        Ok(body.success)
    }
}
