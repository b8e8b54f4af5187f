//! # Session Repository
//!
//! The logged-in merchant session, read fresh before every backend call.

use norsa_core::Session;
use tracing::{debug, warn};

use super::keys;
use super::state::LocalStateRepository;
use crate::error::{StoreError, StoreResult};

/// Repository for the persisted [`Session`].
#[derive(Debug, Clone)]
pub struct SessionRepository {
    state: LocalStateRepository,
}

impl SessionRepository {
    pub fn new(state: LocalStateRepository) -> Self {
        SessionRepository { state }
    }

    /// Returns the stored session, if any.
    ///
    /// A session that no longer decodes is treated as logged out.
    pub async fn get(&self) -> StoreResult<Option<Session>> {
        match self.state.get_json::<Session>(keys::SESSION).await {
            Ok(session) => Ok(session),
            Err(StoreError::Corrupt { reason, .. }) => {
                warn!(%reason, "Stored session is unreadable, treating as logged out");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn save(&self, session: &Session) -> StoreResult<()> {
        debug!(user_id = %session.user_id, "Persisting session");
        self.state.put_json(keys::SESSION, session).await
    }

    pub async fn clear(&self) -> StoreResult<()> {
        self.state.delete(keys::SESSION).await?;
        Ok(())
    }
}
