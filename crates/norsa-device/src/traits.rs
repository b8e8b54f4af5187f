//! # Device Traits
//!
//! Seams for the NFC radio plugin and the receipt printer plugin.
//!
//! Native `async fn` in traits; callers are generic over the device type.

use norsa_core::ndef::NfcTag;
use norsa_core::PrinterConfig;

use crate::error::DeviceResult;

/// What a registered tag-discovery session reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NfcEvent {
    TagDiscovered(NfcTag),
    /// The platform closed the discovery session without a tag.
    SessionClosed,
}

/// NFC radio plugin.
///
/// Reading uses tag-discovery registration; writing uses a technology
/// request on the tag currently in the field.
pub trait NfcRadio {
    /// Initialises the plugin. Called once before any other method.
    async fn start(&mut self) -> DeviceResult<()>;

    async fn is_enabled(&mut self) -> DeviceResult<bool>;

    /// Opens a discovery session. Events arrive through [`NfcRadio::next_event`].
    async fn register_tag_event(&mut self) -> DeviceResult<()>;

    /// Waits for the next discovery event.
    async fn next_event(&mut self) -> DeviceResult<NfcEvent>;

    /// Closes the discovery session. Safe to call when none is open.
    async fn unregister_tag_event(&mut self) -> DeviceResult<()>;

    /// Claims NDEF access to the tag in the field and returns it.
    async fn request_ndef_technology(&mut self) -> DeviceResult<NfcTag>;

    /// Writes a raw NDEF message to the claimed tag.
    async fn write_ndef_message(&mut self, message: &[u8]) -> DeviceResult<()>;

    /// Releases the technology request. Safe to call when none is held.
    async fn cancel_technology_request(&mut self) -> DeviceResult<()>;
}

/// Receipt printer plugin.
pub trait ReceiptPrinter {
    /// Prints receipt markup with the given geometry.
    async fn print(&mut self, text: &str, config: &PrinterConfig) -> DeviceResult<()>;
}
