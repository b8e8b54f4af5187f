//! # Session Manager
//!
//! Single owner of the login state. Workflows ask it for the current
//! session instead of reading storage themselves.
//!
//! ```text
//! login(email, password)
//!      │  validate input ── ValidationFailure
//!      ▼
//! MerchantApi::login ────── AuthFailure / NetworkFailure
//!      │
//!      ▼
//! SessionRepository::save ─► current() returns it until logout or expiry
//! ```

use chrono::Utc;
use tracing::{info, warn};

use norsa_client::MerchantApi;
use norsa_core::validation::{validate_email, validate_password};
use norsa_core::Session;
use norsa_store::Database;

use crate::error::{ErrorKind, TerminalError, TerminalResult};

/// Reads and writes the persisted merchant session.
#[derive(Debug, Clone)]
pub struct SessionManager {
    db: Database,
}

impl SessionManager {
    pub fn new(db: Database) -> Self {
        SessionManager { db }
    }

    /// Validates the credentials, logs in and persists the session.
    pub async fn login<A: MerchantApi>(
        &self,
        api: &A,
        email: &str,
        password: &str,
    ) -> TerminalResult<Session> {
        let email = validate_email(email)?;
        let password = validate_password(password)?;

        let session = api.login(&email, password).await?;
        self.db.sessions().save(&session).await?;

        info!(user_id = %session.user_id, merchant = %session.merchant_name, "Merchant logged in");
        Ok(session)
    }

    /// Drops the session together with every other piece of local state.
    pub async fn logout(&self) -> TerminalResult<()> {
        self.db.clear_all().await?;
        info!("Merchant logged out");
        Ok(())
    }

    /// The logged-in session.
    ///
    /// An expired session is removed and reported as an auth failure.
    pub async fn current(&self) -> TerminalResult<Session> {
        let session = self
            .db
            .sessions()
            .get()
            .await?
            .ok_or_else(TerminalError::not_logged_in)?;

        if session.is_expired(Utc::now()) {
            warn!(user_id = %session.user_id, "Stored session expired");
            self.db.sessions().clear().await?;
            return Err(TerminalError::new(
                ErrorKind::AuthFailure,
                "Your session has expired. Please log in again",
            ));
        }

        Ok(session)
    }

    pub async fn is_logged_in(&self) -> TerminalResult<bool> {
        match self.current().await {
            Ok(_) => Ok(true),
            Err(e) if e.is_auth_failure() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
