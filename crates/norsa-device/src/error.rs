//! # Device Error Types
//!
//! The `Display` text of the NFC variants is what the operator sees.

use norsa_core::TagError;
use thiserror::Error;

/// Result type alias for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    // =========================================================================
    // NFC
    // =========================================================================
    #[error("Nfc is disabled. Please enable Nfc and try again")]
    NfcDisabled,

    /// The discovery session closed before any tag was presented.
    #[error("Unable to find any Nfc Tag nearby. Please try again")]
    NoTagFound,

    #[error("No Nfc Tag was presented within {secs} seconds. Please try again")]
    ScanTimedOut { secs: u64 },

    /// A scan or write is already in progress on this reader.
    #[error("The card reader is busy")]
    AlreadyScanning,

    #[error("Scan cancelled")]
    Cancelled,

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error("Unable to write data on Nfc Tag. Please try again")]
    WriteFailed(String),

    /// Radio plugin failure not covered above.
    #[error("Something went wrong on reading Nfc Tag")]
    Radio(String),

    // =========================================================================
    // Printer
    // =========================================================================
    #[error("Printer error: {0}")]
    Printer(String),
}

impl DeviceError {
    pub fn radio(reason: impl Into<String>) -> Self {
        DeviceError::Radio(reason.into())
    }

    pub fn printer(reason: impl Into<String>) -> Self {
        DeviceError::Printer(reason.into())
    }

    /// Whether the failure came from the tag content rather than the radio.
    pub fn is_tag_failure(&self) -> bool {
        matches!(self, DeviceError::Tag(_))
    }
}

impl From<std::io::Error> for DeviceError {
    fn from(err: std::io::Error) -> Self {
        DeviceError::Printer(err.to_string())
    }
}
