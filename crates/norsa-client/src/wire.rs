//! # Wire Shapes
//!
//! JSON bodies exactly as the backend sends and expects them, with the
//! conversions into `norsa-core` types.
//!
//! ## Response Envelopes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST auth/login            { data: { accessToken, id, ... } }         │
//! │  GET  merchant name         { Name }                                   │
//! │  POST issuance (single)     { data: { data: {...}, clientCode... } }   │
//! │  POST issuance (all)        { data: [ { data: {...}, clientCode... } ] }│
//! │  GET  client                { id, Code, FullName }                     │
//! │  GET  merchant id           { data: [ { id } ] }                       │
//! │  POST transaction           { message }                                │
//! │  GET  daily transactions    { message: "success", data: [...] }        │
//! │  GET  daily print check     { success, data? }                         │
//! │  POST daily print check     { success }                                │
//! │  any error                  { message } | { error }                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decoding is strict: a missing required field fails the call instead of
//! defaulting. Ids arrive as numbers or strings and are kept as strings.
//! Amounts accept JSON numbers or numeric strings.

use chrono::{DateTime, Duration, Utc};
use norsa_core::{
    Client, DailyTransaction, IssuanceFields, IssuanceHistory, Money, Session, Transaction,
    TransactionType,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{GatewayError, GatewayResult};

/// The backend formats transaction timestamps like an HTTP date.
const WIRE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// `"success"` marker on the daily transaction listing.
pub const SUCCESS_MESSAGE: &str = "success";

// =============================================================================
// Helpers
// =============================================================================

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn format_wire_date(at: DateTime<Utc>) -> String {
    at.format(WIRE_DATE_FORMAT).to_string()
}

/// Accepts RFC 3339 and RFC 2822 (`Fri, 10 May 2024 21:15:00 GMT`).
pub fn parse_wire_date(raw: &str) -> GatewayResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| GatewayError::Decode(format!("unreadable timestamp '{raw}': {e}")))
}

/// Body of any non-2xx response.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// First non-blank explanation, `message` before `error`.
    pub fn into_message(self) -> Option<String> {
        [self.message, self.error]
            .into_iter()
            .flatten()
            .map(|m| m.trim().to_string())
            .find(|m| !m.is_empty())
    }
}

/// `{ data: T }`
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

// =============================================================================
// Login
// =============================================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    #[serde(rename = "expiresIn", default)]
    pub expires_in: Option<i64>,
    #[serde(deserialize_with = "id_string")]
    pub id: String,
}

impl LoginData {
    pub fn into_session(self, merchant_name: String, now: DateTime<Utc>) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self.expires_in.map(|secs| now + Duration::seconds(secs)),
            user_id: self.id,
            merchant_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MerchantName {
    #[serde(rename = "Name")]
    pub name: String,
}

// =============================================================================
// Issuance
// =============================================================================

#[derive(Debug, Serialize)]
pub struct IssuanceRequest<'a> {
    #[serde(rename = "nfcCardId")]
    pub nfc_card_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct IssuanceRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "Client_id", deserialize_with = "id_string")]
    pub client_id: String,
    #[serde(rename = "Amount")]
    pub amount: Money,
    /// Older backends only send `Amount`, which then is the balance.
    #[serde(rename = "Balance", default)]
    pub balance: Option<Money>,
    #[serde(rename = "Pincode", deserialize_with = "id_string")]
    pub pin_code: String,
}

#[derive(Debug, Deserialize)]
pub struct ClientCodeAndFullName {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "numberOfMonths", default)]
    pub number_of_months: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct IssuanceEntry {
    pub data: IssuanceRecord,
    #[serde(rename = "clientCodeAndFullName")]
    pub client: ClientCodeAndFullName,
}

impl IssuanceEntry {
    pub fn into_domain(self) -> GatewayResult<IssuanceHistory> {
        let IssuanceEntry { data, client } = self;

        IssuanceHistory::new(IssuanceFields {
            id: data.id,
            client_id: data.client_id,
            pin_code: data.pin_code,
            amount: data.amount,
            balance: data.balance.unwrap_or(data.amount),
            payback_period_months: client.number_of_months.unwrap_or(0),
            client_code: client.code,
            client_name: client.full_name,
        })
        .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

// =============================================================================
// Client & Merchant
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ClientRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "FullName")]
    pub full_name: String,
}

impl From<ClientRecord> for Client {
    fn from(record: ClientRecord) -> Self {
        Client {
            id: record.id,
            code: record.code,
            name: record.full_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IdRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
}

// =============================================================================
// Transactions
// =============================================================================

#[derive(Debug, Serialize)]
pub struct TransactionPayload<'a> {
    #[serde(rename = "Client_id")]
    pub client_id: &'a str,
    #[serde(rename = "ItemDescription")]
    pub item_description: &'a str,
    #[serde(rename = "Merchant_ID")]
    pub merchant_id: &'a str,
    #[serde(rename = "IssuanceHistoryId")]
    pub issuance_history_id: &'a str,
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "AmountUser")]
    pub amount: Money,
    #[serde(rename = "transactionType")]
    pub kind: TransactionType,
}

impl<'a> From<&'a Transaction> for TransactionPayload<'a> {
    fn from(tx: &'a Transaction) -> Self {
        TransactionPayload {
            client_id: &tx.client_id,
            item_description: &tx.description,
            merchant_id: &tx.merchant_id,
            issuance_history_id: &tx.issuance_history_id,
            date_time: format_wire_date(tx.date_time),
            amount: tx.amount,
            kind: tx.kind,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DailyTransactionRecord {
    #[serde(rename = "Client_id", deserialize_with = "id_string")]
    pub client_id: String,
    #[serde(rename = "AmountUser")]
    pub amount: Money,
    #[serde(rename = "transactionType")]
    pub kind: String,
    #[serde(rename = "dateTime")]
    pub date_time: String,
}

impl DailyTransactionRecord {
    pub fn into_domain(self) -> GatewayResult<DailyTransaction> {
        let kind: TransactionType = self
            .kind
            .parse()
            .map_err(|e: norsa_core::CoreError| GatewayError::Decode(e.to_string()))?;

        Ok(DailyTransaction {
            client_id: self.client_id,
            amount: self.amount,
            kind,
            date_time: parse_wire_date(&self.date_time)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DailyTransactionsBody {
    pub message: String,
    #[serde(default)]
    pub data: Option<Vec<DailyTransactionRecord>>,
}

// =============================================================================
// Daily Print Check
// =============================================================================

/// Server-side record that a merchant printed the daily report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPrintCheck {
    pub printed: bool,
    #[serde(default)]
    pub printed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct DailyPrintCheckBody {
    pub success: bool,
    #[serde(default)]
    pub data: Option<DailyPrintCheck>,
}

#[derive(Debug, Deserialize)]
pub struct SuccessBody {
    pub success: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_issuance_entry_with_numeric_ids_and_string_amount() {
        let body = json!({
            "data": {
                "data": {"id": 12, "Client_id": 7, "Amount": "150.00", "Pincode": 4321},
                "clientCodeAndFullName": {"Code": "C-007", "FullName": "Maria Martina", "numberOfMonths": 3}
            }
        });

        let envelope: DataEnvelope<IssuanceEntry> = serde_json::from_value(body).unwrap();
        let issuance = envelope.data.into_domain().unwrap();

        assert_eq!(issuance.id, "12");
        assert_eq!(issuance.client_id, "7");
        assert_eq!(issuance.pin_code, "4321");
        assert_eq!(issuance.balance, Money::from_cents(15000));
        assert_eq!(issuance.amount, issuance.balance);
        assert_eq!(issuance.payback_period_months, 3);
        assert_eq!(issuance.client_name, "Maria Martina");
    }

    #[test]
    fn test_issuance_missing_amount_is_rejected() {
        let body = json!({
            "data": {"id": 1, "Client_id": 2, "Pincode": "1"},
            "clientCodeAndFullName": {"Code": "C", "FullName": "N"}
        });
        assert!(serde_json::from_value::<IssuanceEntry>(body).is_err());
    }

    #[test]
    fn test_issuance_balance_above_amount_is_rejected() {
        let body = json!({
            "data": {"id": 1, "Client_id": 2, "Amount": 10, "Balance": 20, "Pincode": "1"},
            "clientCodeAndFullName": {"Code": "C", "FullName": "N"}
        });
        let entry: IssuanceEntry = serde_json::from_value(body).unwrap();
        assert!(matches!(entry.into_domain(), Err(GatewayError::Decode(_))));
    }

    #[test]
    fn test_transaction_payload_shape() {
        let tx = Transaction {
            client_id: "7".into(),
            merchant_id: "3".into(),
            issuance_history_id: "12".into(),
            description: "Expense".into(),
            date_time: Utc.with_ymd_and_hms(2024, 5, 10, 21, 15, 0).unwrap(),
            amount: Money::from_cents(1250),
            kind: TransactionType::Expense,
        };

        let value = serde_json::to_value(TransactionPayload::from(&tx)).unwrap();
        assert_eq!(
            value,
            json!({
                "Client_id": "7",
                "ItemDescription": "Expense",
                "Merchant_ID": "3",
                "IssuanceHistoryId": "12",
                "dateTime": "Fri, 10 May 2024 21:15:00 GMT",
                "AmountUser": 12.5,
                "transactionType": "expense"
            })
        );
    }

    #[test]
    fn test_daily_record_accepts_both_date_styles() {
        let rfc2822: DailyTransactionRecord = serde_json::from_value(json!({
            "Client_id": 1, "AmountUser": 5, "transactionType": "Retour",
            "dateTime": "Fri, 10 May 2024 21:15:00 GMT"
        }))
        .unwrap();
        let rfc3339: DailyTransactionRecord = serde_json::from_value(json!({
            "Client_id": 1, "AmountUser": 5, "transactionType": "expense",
            "dateTime": "2024-05-10T21:15:00.000Z"
        }))
        .unwrap();

        let a = rfc2822.into_domain().unwrap();
        let b = rfc3339.into_domain().unwrap();
        assert_eq!(a.date_time, b.date_time);
        assert_eq!(a.kind, TransactionType::Retour);
    }

    #[test]
    fn test_error_body_prefers_message_then_error() {
        let both: ErrorBody = serde_json::from_str(r#"{"message":"m","error":"e"}"#).unwrap();
        assert_eq!(both.into_message().as_deref(), Some("m"));

        let only_error: ErrorBody = serde_json::from_str(r#"{"error":"Card not found"}"#).unwrap();
        assert_eq!(only_error.into_message().as_deref(), Some("Card not found"));

        let blank: ErrorBody = serde_json::from_str(r#"{"message":"  "}"#).unwrap();
        assert_eq!(blank.into_message(), None);
    }

    #[test]
    fn test_login_data_into_session() {
        let data: LoginData = serde_json::from_value(json!({
            "accessToken": "jwt", "id": 3, "expiresIn": 3600
        }))
        .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();

        let session = data.into_session("Snack Punda".into(), now);
        assert_eq!(session.user_id, "3");
        assert_eq!(session.expires_at, Some(now + Duration::hours(1)));
        assert_eq!(session.refresh_token, None);
    }
}
