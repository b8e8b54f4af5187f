//! # Gateway Configuration
//!
//! Where the backend lives and which paths it serves.
//!
//! ## Endpoint Templates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Endpoint Resolution                                 │
//! │                                                                         │
//! │  base_url   https://norsabackend.herokuapp.com/api/                    │
//! │      +                                                                  │
//! │  template   clients/{id}                                               │
//! │      +                                                                  │
//! │  id         "C 42"  (form-encoded → "C+42")                             │
//! │      ▼                                                                  │
//! │  https://norsabackend.herokuapp.com/api/clients/C+42                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `auth/login` is fixed by the backend; the other paths are
//! deployment defaults and can be overridden in `terminal.toml`.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{GatewayError, GatewayResult};

/// Production backend.
pub const DEFAULT_BASE_URL: &str = "https://norsabackend.herokuapp.com/api/";

/// Every request is bounded by this.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Placeholder substituted by [`Endpoints::resolve`].
const ID_PLACEHOLDER: &str = "{id}";

// =============================================================================
// Endpoints
// =============================================================================

/// Relative endpoint paths. `{id}` is replaced with an encoded identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub login: String,
    pub merchant_name: String,
    pub issuance_history: String,
    pub issuance_histories: String,
    pub client: String,
    pub merchant_id: String,
    pub create_transaction: String,
    pub daily_transactions: String,
    pub daily_print_check: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            login: "auth/login".to_string(),
            merchant_name: "merchants/name".to_string(),
            issuance_history: "issuancehistory/nfc".to_string(),
            issuance_histories: "issuancehistory/nfc/all".to_string(),
            client: "clients/{id}".to_string(),
            merchant_id: "merchants/user/{id}".to_string(),
            create_transaction: "transactionhistory".to_string(),
            daily_transactions: "transactionhistory/daily".to_string(),
            daily_print_check: "merchants/{id}/dailysalesprintcheck".to_string(),
        }
    }
}

impl Endpoints {
    /// Substitutes `{id}` in `template`.
    pub fn resolve(template: &str, id: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
        template.replace(ID_PLACEHOLDER, &encoded)
    }

    fn all(&self) -> [(&'static str, &str); 9] {
        [
            ("login", &self.login),
            ("merchant_name", &self.merchant_name),
            ("issuance_history", &self.issuance_history),
            ("issuance_histories", &self.issuance_histories),
            ("client", &self.client),
            ("merchant_id", &self.merchant_id),
            ("create_transaction", &self.create_transaction),
            ("daily_transactions", &self.daily_transactions),
            ("daily_print_check", &self.daily_print_check),
        ]
    }
}

// =============================================================================
// Gateway Configuration
// =============================================================================

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL; a trailing `/` is added if missing.
    pub base_url: String,

    /// Request timeout in seconds.
    /// Default: 15
    pub timeout_secs: u64,

    pub endpoints: Endpoints,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoints: Endpoints::default(),
        }
    }
}

impl GatewayConfig {
    /// Default settings against another backend (used by tests and staging).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        GatewayConfig {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parses the base URL, normalising it to end with `/` so relative
    /// endpoints join under it instead of replacing its last segment.
    pub fn base(&self) -> GatewayResult<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }

        let url = Url::parse(&raw).map_err(|e| GatewayError::InvalidUrl(format!("{raw}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(GatewayError::InvalidUrl(format!(
                "unsupported scheme '{other}' in {raw}"
            ))),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GatewayResult<()> {
        self.base()?;

        if self.timeout_secs == 0 {
            return Err(GatewayError::InvalidConfig(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        for (name, path) in self.endpoints.all() {
            if path.trim().is_empty() {
                return Err(GatewayError::InvalidConfig(format!(
                    "endpoint '{name}' is empty"
                )));
            }
            if path.starts_with('/') {
                return Err(GatewayError::InvalidConfig(format!(
                    "endpoint '{name}' must be relative to the base URL: {path}"
                )));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
