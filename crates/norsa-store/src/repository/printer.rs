//! # Printer Config Repository
//!
//! Read-modify-write without locking: the operator is the only writer.

use norsa_core::PrinterConfig;
use tracing::{info, warn};

use super::keys;
use super::state::LocalStateRepository;
use crate::error::{StoreError, StoreResult};

/// Repository for the persisted [`PrinterConfig`].
#[derive(Debug, Clone)]
pub struct PrinterConfigRepository {
    state: LocalStateRepository,
}

impl PrinterConfigRepository {
    pub fn new(state: LocalStateRepository) -> Self {
        PrinterConfigRepository { state }
    }

    /// Returns the stored config, or the defaults when none is stored or the
    /// stored one cannot be decoded.
    pub async fn get(&self) -> StoreResult<PrinterConfig> {
        match self.state.get_json::<PrinterConfig>(keys::PRINTER_CONFIG).await {
            Ok(Some(config)) => Ok(config),
            Ok(None) => Ok(PrinterConfig::default()),
            Err(StoreError::Corrupt { reason, .. }) => {
                warn!(%reason, "Stored printer config is unreadable, using defaults");
                Ok(PrinterConfig::default())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn save(&self, config: &PrinterConfig) -> StoreResult<()> {
        info!(
            dpi = config.dpi,
            width_mm = config.width_mm,
            chars_per_line = config.chars_per_line,
            "Saving printer config"
        );
        self.state.put_json(keys::PRINTER_CONFIG, config).await
    }
}
