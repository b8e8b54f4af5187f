//! # Journal Repository
//!
//! What the terminal last printed: the daily report timestamp that drives
//! the once-per-day gate, and the raw markup of the last receipt for reprints.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::keys;
use super::state::LocalStateRepository;
use crate::error::StoreResult;

/// Repository for print history.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    state: LocalStateRepository,
}

impl JournalRepository {
    pub fn new(state: LocalStateRepository) -> Self {
        JournalRepository { state }
    }

    /// When the daily report was last printed.
    ///
    /// An unparseable timestamp reads as "never", which re-arms the gate.
    pub async fn daily_report_printed_at(&self) -> StoreResult<Option<DateTime<Utc>>> {
        let Some(raw) = self.state.get(keys::DAILY_REPORT_PRINTED_AT).await? else {
            return Ok(None);
        };

        match DateTime::parse_from_rfc3339(&raw) {
            Ok(at) => Ok(Some(at.with_timezone(&Utc))),
            Err(e) => {
                warn!(value = %raw, error = %e, "Unreadable daily report timestamp");
                Ok(None)
            }
        }
    }

    pub async fn mark_daily_report_printed(&self, at: DateTime<Utc>) -> StoreResult<()> {
        debug!(%at, "Recording daily report print");
        self.state
            .put(keys::DAILY_REPORT_PRINTED_AT, &at.to_rfc3339())
            .await
    }

    /// Markup of the most recently printed receipt.
    pub async fn last_printed_receipt(&self) -> StoreResult<Option<String>> {
        self.state.get(keys::LAST_PRINTED_RECEIPT).await
    }

    pub async fn save_last_printed_receipt(&self, markup: &str) -> StoreResult<()> {
        self.state.put(keys::LAST_PRINTED_RECEIPT, markup).await
    }
}
