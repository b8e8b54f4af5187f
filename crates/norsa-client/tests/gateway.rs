//! Gateway tests against an in-process fake backend.
//!
//! Starts an axum server on a random port that mimics the merchant
//! backend's envelopes, then drives every `MerchantApi` operation through
//! real HTTP.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use norsa_client::{
    DailyPrintCheck, Gateway, GatewayConfig, GatewayError, MerchantApi, StaticToken,
    StoredSessionToken,
};
use norsa_core::{Money, Session, Transaction, TransactionType};
use norsa_store::{Database, StoreConfig};

// =====================================================================
// Fake backend
// =====================================================================

const TOKEN: &str = "tok-abc";

#[derive(Clone, Default)]
struct Backend {
    transactions: Arc<Mutex<Vec<Value>>>,
    print_checks: Arc<Mutex<Vec<(String, Value)>>>,
}

type Reply = (StatusCode, Json<Value>);

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        == Some(TOKEN)
}

fn unauthorized() -> Reply {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthorized"})))
}

fn issuance(id: u32, amount: &str) -> Value {
    json!({
        "data": {"id": id, "Client_id": 7, "Amount": amount, "Pincode": "4321"},
        "clientCodeAndFullName": {"Code": "C-007", "FullName": "Maria Martina", "numberOfMonths": 3}
    })
}

async fn login(Json(body): Json<Value>) -> Reply {
    match (body["email"].as_str(), body["password"].as_str()) {
        (Some("merchant@norsa.cw"), Some("hunter22")) => (
            StatusCode::OK,
            Json(json!({"data": {"accessToken": TOKEN, "id": 3, "expiresIn": 3600}})),
        ),
        (Some("down@norsa.cw"), _) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"message": "Database offline"})),
        ),
        _ => (StatusCode::BAD_REQUEST, Json(json!({"message": "Bad Request"}))),
    }
}

async fn merchant_name(headers: HeaderMap) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::OK, Json(json!({"Name": "Snack Punda"})))
}

async fn issuance_history(headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    match body["nfcCardId"].as_str() {
        Some("NRS-42") => (StatusCode::OK, Json(json!({"data": issuance(12, "150.00")}))),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "No issuance found for this card"})),
        ),
    }
}

async fn issuance_histories(headers: HeaderMap, Json(_body): Json<Value>) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({"data": [issuance(12, "150.00"), issuance(13, "75.5")]})),
    )
}

async fn client(headers: HeaderMap, Path(id): Path<String>) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({"id": id, "Code": "C-007", "FullName": "Maria Martina"})),
    )
}

async fn merchant_id(headers: HeaderMap, Path(user_id): Path<String>) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    if user_id == "3" {
        (StatusCode::OK, Json(json!({"data": [{"id": 11}]})))
    } else {
        (StatusCode::OK, Json(json!({"data": []})))
    }
}

async fn create_transaction(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["AmountUser"].as_f64() == Some(999.0) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "Insufficient balance"})),
        );
    }
    backend.transactions.lock().unwrap().push(body);
    (StatusCode::OK, Json(json!({"message": "Transaction created"})))
}

async fn daily_transactions(headers: HeaderMap) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "message": "success",
            "data": [
                {"Client_id": 7, "AmountUser": 20, "transactionType": "expense", "dateTime": "Fri, 10 May 2024 15:00:00 GMT"},
                {"Client_id": 8, "AmountUser": "5.25", "transactionType": "retour", "dateTime": "2024-05-10T09:30:00Z"}
            ]
        })),
    )
}

async fn daily_transactions_failed(headers: HeaderMap) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::OK, Json(json!({"message": "error"})))
}

async fn get_print_check(headers: HeaderMap, Path(merchant): Path<String>) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    if merchant == "11" {
        (
            StatusCode::OK,
            Json(json!({"success": true, "data": {"printed": true, "printedAt": "2024-05-10T21:00:00Z"}})),
        )
    } else {
        (StatusCode::OK, Json(json!({"success": false})))
    }
}

async fn post_print_check(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(merchant): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    backend.print_checks.lock().unwrap().push((merchant, body));
    (StatusCode::OK, Json(json!({"success": true})))
}

async fn slow() -> Reply {
    tokio::time::sleep(Duration::from_secs(3)).await;
    (StatusCode::OK, Json(json!({"message": "success", "data": []})))
}

async fn start_backend() -> (String, Backend) {
    let backend = Backend::default();

    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/merchants/name", get(merchant_name))
        .route("/api/issuancehistory/nfc", post(issuance_history))
        .route("/api/issuancehistory/nfc/all", post(issuance_histories))
        .route("/api/clients/{id}", get(client))
        .route("/api/merchants/user/{id}", get(merchant_id))
        .route("/api/transactionhistory", post(create_transaction))
        .route("/api/transactionhistory/daily", get(daily_transactions))
        .route("/api/transactionhistory/failed", get(daily_transactions_failed))
        .route(
            "/api/merchants/{id}/dailysalesprintcheck",
            get(get_print_check).post(post_print_check),
        )
        .route("/api/slow", get(slow))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api", addr), backend)
}

fn gateway(base_url: &str) -> Gateway<StaticToken> {
    Gateway::new(&GatewayConfig::with_base_url(base_url), StaticToken::new(TOKEN)).unwrap()
}

fn transaction(amount: Money) -> Transaction {
    Transaction {
        client_id: "7".into(),
        merchant_id: "3".into(),
        issuance_history_id: "12".into(),
        description: "Expense".into(),
        date_time: Utc.with_ymd_and_hms(2024, 5, 10, 21, 15, 0).unwrap(),
        amount,
        kind: TransactionType::Expense,
    }
}

// =====================================================================
// Login
// =====================================================================

#[tokio::test]
async fn login_resolves_merchant_name_with_new_token() {
    let (base, _) = start_backend().await;
    let gw = Gateway::new(&GatewayConfig::with_base_url(&base), StaticToken::new("stale")).unwrap();

    let session = gw.login("merchant@norsa.cw", "hunter22").await.unwrap();

    assert_eq!(session.access_token, TOKEN);
    assert_eq!(session.user_id, "3");
    assert_eq!(session.merchant_name, "Snack Punda");
    assert!(session.expires_at.is_some());
}

#[tokio::test]
async fn login_400_is_invalid_credentials() {
    let (base, _) = start_backend().await;

    let err = gateway(&base)
        .login("merchant@norsa.cw", "wrong-password")
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::InvalidCredentials));
    assert_eq!(err.user_message(), "email or password is incorrect");
}

#[tokio::test]
async fn login_other_failure_uses_server_message() {
    let (base, _) = start_backend().await;

    let err = gateway(&base).login("down@norsa.cw", "x").await.unwrap_err();
    assert_eq!(err.user_message(), "Database offline");
}

// =====================================================================
// Issuance & lookups
// =====================================================================

#[tokio::test]
async fn issuance_lookup_decodes_record() {
    let (base, _) = start_backend().await;

    let issuance = gateway(&base).get_issuance_history("NRS-42").await.unwrap();

    assert_eq!(issuance.id, "12");
    assert_eq!(issuance.client_id, "7");
    assert_eq!(issuance.balance, Money::from_cents(15000));
    assert_eq!(issuance.client_code, "C-007");
}

#[tokio::test]
async fn issuance_lookup_surfaces_error_field() {
    let (base, _) = start_backend().await;

    let err = gateway(&base).get_issuance_history("NRS-404").await.unwrap_err();
    assert_eq!(err.user_message(), "No issuance found for this card");
}

#[tokio::test]
async fn multiple_issuances() {
    let (base, _) = start_backend().await;

    let all = gateway(&base).get_issuance_histories("NRS-42").await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].balance, Money::from_cents(7550));
}

#[tokio::test]
async fn client_and_merchant_lookups() {
    let (base, _) = start_backend().await;
    let gw = gateway(&base);

    let client = gw.get_client("7").await.unwrap();
    assert_eq!(client.name, "Maria Martina");

    assert_eq!(gw.get_merchant_id("3").await.unwrap(), "11");
    assert!(matches!(
        gw.get_merchant_id("999").await,
        Err(GatewayError::NotFound(_))
    ));
}

#[tokio::test]
async fn bad_token_is_auth_failure() {
    let (base, _) = start_backend().await;
    let gw = Gateway::new(&GatewayConfig::with_base_url(&base), StaticToken::new("nope")).unwrap();

    let err = gw.get_client("7").await.unwrap_err();
    assert!(err.is_auth_failure());
}

// =====================================================================
// Transactions
// =====================================================================

#[tokio::test]
async fn create_transaction_posts_once_with_wire_names() {
    let (base, backend) = start_backend().await;

    let message = gateway(&base)
        .create_transaction(&transaction(Money::from_cents(1250)))
        .await
        .unwrap();

    assert_eq!(message, "Transaction created");
    let posted = backend.transactions.lock().unwrap().clone();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0]["Client_id"], "7");
    assert_eq!(posted[0]["Merchant_ID"], "3");
    assert_eq!(posted[0]["IssuanceHistoryId"], "12");
    assert_eq!(posted[0]["AmountUser"], 12.5);
    assert_eq!(posted[0]["transactionType"], "expense");
    assert_eq!(posted[0]["dateTime"], "Fri, 10 May 2024 21:15:00 GMT");
}

#[tokio::test]
async fn create_transaction_rejection_is_not_retried() {
    let (base, backend) = start_backend().await;

    let err = gateway(&base)
        .create_transaction(&transaction(Money::from_cents(99900)))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Insufficient balance");
    assert!(backend.transactions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn daily_transactions_decoded() {
    let (base, _) = start_backend().await;

    let daily = gateway(&base).get_daily_transactions().await.unwrap();
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[1].kind, TransactionType::Retour);
    assert_eq!(daily[1].amount, Money::from_cents(525));
}

#[tokio::test]
async fn daily_transactions_require_success_marker() {
    let (base, _) = start_backend().await;
    let mut config = GatewayConfig::with_base_url(&base);
    config.endpoints.daily_transactions = "transactionhistory/failed".to_string();
    let gw = Gateway::new(&config, StaticToken::new(TOKEN)).unwrap();

    let err = gw.get_daily_transactions().await.unwrap_err();
    assert_eq!(err.user_message(), "Something went wrong");
}

#[tokio::test]
async fn daily_print_check_round_trip() {
    let (base, backend) = start_backend().await;
    let gw = gateway(&base);

    let check = gw.get_daily_print_check("11").await.unwrap().unwrap();
    assert!(check.printed);
    assert_eq!(gw.get_daily_print_check("12").await.unwrap(), None);

    let posted = DailyPrintCheck {
        printed: true,
        printed_at: Some(Utc.with_ymd_and_hms(2024, 5, 11, 20, 0, 0).unwrap()),
    };
    assert!(gw.post_daily_print_check("11", &posted).await.unwrap());

    let recorded = backend.print_checks.lock().unwrap().clone();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, "11");
    assert_eq!(recorded[0].1["printed"], true);
}

// =====================================================================
// Transport
// =====================================================================

#[tokio::test]
async fn timeout_collapses_to_generic_message() {
    let (base, _) = start_backend().await;
    let mut config = GatewayConfig::with_base_url(&base);
    config.timeout_secs = 1;
    config.endpoints.daily_transactions = "slow".to_string();
    let gw = Gateway::new(&config, StaticToken::new(TOKEN)).unwrap();

    let err = gw.get_daily_transactions().await.unwrap_err();
    assert!(matches!(err, GatewayError::Timeout));
    assert_eq!(err.user_message(), "Something went wrong");
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway(&format!("http://{}/api", addr))
        .get_client("7")
        .await
        .unwrap_err();
    assert!(err.is_transport());
}

// =====================================================================
// Stored session token
// =====================================================================

#[tokio::test]
async fn stored_session_token_follows_login_and_logout() {
    let (base, _) = start_backend().await;
    let db = Database::new(StoreConfig::in_memory()).await.unwrap();
    let gw = Gateway::new(
        &GatewayConfig::with_base_url(&base),
        StoredSessionToken::new(db.clone()),
    )
    .unwrap();

    let err = gw.get_client("7").await.unwrap_err();
    assert!(matches!(err, GatewayError::Unauthenticated(_)));

    db.sessions()
        .save(&Session {
            access_token: TOKEN.into(),
            refresh_token: None,
            expires_at: None,
            user_id: "3".into(),
            merchant_name: "Snack Punda".into(),
        })
        .await
        .unwrap();
    assert_eq!(gw.get_client("7").await.unwrap().code, "C-007");

    db.clear_all().await.unwrap();
    assert!(gw.get_client("7").await.unwrap_err().is_auth_failure());
}
