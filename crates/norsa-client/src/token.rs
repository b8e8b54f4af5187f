//! # Token Sources
//!
//! Pluggable bearer-token provider, asked before every authenticated call.
//! Nothing caches the header: logging out or in takes effect on the very
//! next request.

use chrono::Utc;
use norsa_store::Database;
use tracing::debug;

use crate::error::{GatewayError, GatewayResult};

/// Supplies the bearer token for authenticated requests.
pub trait TokenSource {
    async fn token(&self) -> GatewayResult<String>;
}

/// A fixed token obtained elsewhere.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken(token.into())
    }
}

impl TokenSource for StaticToken {
    async fn token(&self) -> GatewayResult<String> {
        Ok(self.0.clone())
    }
}

/// Reads the persisted session on every call.
#[derive(Debug, Clone)]
pub struct StoredSessionToken {
    db: Database,
}

impl StoredSessionToken {
    pub fn new(db: Database) -> Self {
        StoredSessionToken { db }
    }
}

impl TokenSource for StoredSessionToken {
    async fn token(&self) -> GatewayResult<String> {
        let session = self
            .db
            .sessions()
            .get()
            .await?
            .ok_or_else(|| GatewayError::Unauthenticated("no session stored".to_string()))?;

        if session.is_expired(Utc::now()) {
            debug!(user_id = %session.user_id, "Stored session has expired");
            return Err(GatewayError::Unauthenticated("session expired".to_string()));
        }

        Ok(session.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use norsa_core::Session;
    use norsa_store::StoreConfig;

    fn session(expires_in: Option<Duration>) -> Session {
        Session {
            access_token: "tok-1".into(),
            refresh_token: None,
            expires_at: expires_in.map(|d| Utc::now() + d),
            user_id: "7".into(),
            merchant_name: "Snack Punda".into(),
        }
    }

    #[tokio::test]
    async fn test_static_token() {
        assert_eq!(StaticToken::new("abc").token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_stored_session_is_read_per_call() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let source = StoredSessionToken::new(db.clone());

        assert!(matches!(
            source.token().await,
            Err(GatewayError::Unauthenticated(_))
        ));

        db.sessions().save(&session(None)).await.unwrap();
        assert_eq!(source.token().await.unwrap(), "tok-1");

        db.sessions().clear().await.unwrap();
        assert!(source.token().await.is_err());
    }

    #[tokio::test]
    async fn test_expired_session_is_refused() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        db.sessions()
            .save(&session(Some(Duration::minutes(-1))))
            .await
            .unwrap();

        let err = StoredSessionToken::new(db).token().await.unwrap_err();
        assert!(err.is_auth_failure());
    }
}
