//! Mock NFC radio driven through a channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use norsa_core::ndef::NfcTag;
use tokio::sync::mpsc;

use crate::error::{DeviceError, DeviceResult};
use crate::traits::{NfcEvent, NfcRadio};

#[derive(Debug, Default)]
struct Shared {
    started: AtomicBool,
    disabled: AtomicBool,
    registered: AtomicBool,
    technology_requested: AtomicBool,
    fail_writes: AtomicBool,
    tag_in_field: Mutex<Option<NfcTag>>,
    written: Mutex<Vec<Vec<u8>>>,
}

/// Simulated NFC radio.
///
/// ```
/// use norsa_device::mock::MockNfcRadio;
///
/// let (radio, handle) = MockNfcRadio::new();
/// assert!(!handle.is_registered());
/// # drop(radio);
/// ```
#[derive(Debug)]
pub struct MockNfcRadio {
    events: mpsc::Receiver<NfcEvent>,
    shared: Arc<Shared>,
}

/// Controls a [`MockNfcRadio`].
#[derive(Debug, Clone)]
pub struct MockNfcHandle {
    events: mpsc::Sender<NfcEvent>,
    shared: Arc<Shared>,
}

impl MockNfcRadio {
    pub fn new() -> (Self, MockNfcHandle) {
        let (tx, rx) = mpsc::channel(16);
        let shared = Arc::new(Shared::default());

        (
            MockNfcRadio {
                events: rx,
                shared: shared.clone(),
            },
            MockNfcHandle { events: tx, shared },
        )
    }
}

impl NfcRadio for MockNfcRadio {
    async fn start(&mut self) -> DeviceResult<()> {
        self.shared.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn is_enabled(&mut self) -> DeviceResult<bool> {
        Ok(!self.shared.disabled.load(Ordering::SeqCst))
    }

    async fn register_tag_event(&mut self) -> DeviceResult<()> {
        self.shared.registered.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn next_event(&mut self) -> DeviceResult<NfcEvent> {
        self.events
            .recv()
            .await
            .ok_or_else(|| DeviceError::radio("mock event channel closed"))
    }

    async fn unregister_tag_event(&mut self) -> DeviceResult<()> {
        self.shared.registered.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn request_ndef_technology(&mut self) -> DeviceResult<NfcTag> {
        self.shared.technology_requested.store(true, Ordering::SeqCst);

        self.shared
            .tag_in_field
            .lock()
            .map_err(|_| DeviceError::radio("mock state poisoned"))?
            .clone()
            .ok_or(DeviceError::NoTagFound)
    }

    async fn write_ndef_message(&mut self, message: &[u8]) -> DeviceResult<()> {
        if self.shared.fail_writes.load(Ordering::SeqCst) {
            return Err(DeviceError::WriteFailed("tag is read-only".to_string()));
        }

        self.shared
            .written
            .lock()
            .map_err(|_| DeviceError::radio("mock state poisoned"))?
            .push(message.to_vec());
        Ok(())
    }

    async fn cancel_technology_request(&mut self) -> DeviceResult<()> {
        self.shared.technology_requested.store(false, Ordering::SeqCst);
        Ok(())
    }
}

impl MockNfcHandle {
    /// Delivers a tag to the open (or next) discovery session.
    pub async fn present_tag(&self, tag: NfcTag) {
        let _ = self.events.send(NfcEvent::TagDiscovered(tag)).await;
    }

    /// Closes the discovery session without a tag.
    pub async fn close_session(&self) {
        let _ = self.events.send(NfcEvent::SessionClosed).await;
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.shared.disabled.store(!enabled, Ordering::SeqCst);
    }

    /// Puts a tag in the field for the write path.
    pub fn place_tag(&self, tag: NfcTag) {
        if let Ok(mut slot) = self.shared.tag_in_field.lock() {
            *slot = Some(tag);
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.shared.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn is_started(&self) -> bool {
        self.shared.started.load(Ordering::SeqCst)
    }

    pub fn is_registered(&self) -> bool {
        self.shared.registered.load(Ordering::SeqCst)
    }

    pub fn has_technology_request(&self) -> bool {
        self.shared.technology_requested.load(Ordering::SeqCst)
    }

    pub fn written_messages(&self) -> Vec<Vec<u8>> {
        self.shared
            .written
            .lock()
            .map(|w| w.clone())
            .unwrap_or_default()
    }
}
