//! # Card Reader
//!
//! One NFC scan (or card write) at a time, cancellable and bounded.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            scan()                      tag decoded                      │
//! │   Idle ───────────────► Scanning ─────────────────► Success(token)     │
//! │    ▲                     │   │                                          │
//! │    │      cancel()       │   │  session closed / timeout / bad tag     │
//! │    └─────────────────────┘   └────────────────────► Failed(error)      │
//! │                                                                         │
//! │   scan() while Scanning or Writing ──► Err(AlreadyScanning)            │
//! │   Success / Failed are terminal for that scan; the next scan() starts  │
//! │   over from them exactly like from Idle.                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The discovery registration is released after the first event, whatever
//! the outcome, and on timeout or cancel.
//!
//! Every scan and write carries a generation number. A cancelled scan that
//! is still unwinding when the next scan starts cannot touch the new scan's
//! state or cancel sender, and never returns a card.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use norsa_core::ndef::{decode_tag, encode_message, NdefRecord};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::{DeviceError, DeviceResult};
use crate::traits::{NfcEvent, NfcRadio};

/// How long a scan waits for a tag unless configured otherwise.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(30);

/// Language code written into card text records.
const CARD_LANGUAGE: &str = "en";

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderState {
    Idle,
    Scanning,
    Writing,
    /// Last scan produced this card token.
    Success(String),
    /// Last scan or write failed.
    Failed(DeviceError),
}

impl ReaderState {
    pub fn is_busy(&self) -> bool {
        matches!(self, ReaderState::Scanning | ReaderState::Writing)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cancel sender of the operation that currently owns the reader.
#[derive(Debug)]
struct Pending {
    generation: u64,
    cancel: oneshot::Sender<()>,
}

#[derive(Debug)]
struct Slot {
    state: ReaderState,
    /// Generation of the most recently started operation.
    generation: u64,
    /// `None` once the operation finished or was cancelled.
    pending: Option<Pending>,
}

// =============================================================================
// Card Reader
// =============================================================================

/// Drives an [`NfcRadio`] through scans and writes.
///
/// Methods take `&self` so a scan can be cancelled from another task while
/// it is pending.
#[derive(Debug)]
pub struct CardReader<R> {
    radio: tokio::sync::Mutex<R>,
    /// Single pending-operation slot.
    slot: Mutex<Slot>,
    scan_timeout: Duration,
}

impl<R: NfcRadio> CardReader<R> {
    /// Starts the radio and returns an idle reader.
    pub async fn start(mut radio: R, scan_timeout: Duration) -> DeviceResult<Self> {
        radio.start().await?;
        info!(timeout_secs = scan_timeout.as_secs(), "Card reader started");

        Ok(CardReader {
            radio: tokio::sync::Mutex::new(radio),
            slot: Mutex::new(Slot {
                state: ReaderState::Idle,
                generation: 0,
                pending: None,
            }),
            scan_timeout,
        })
    }

    pub fn state(&self) -> ReaderState {
        lock(&self.slot).state.clone()
    }

    /// Claims the reader for one operation and arms the cancel slot.
    fn begin(&self, next: ReaderState) -> DeviceResult<(u64, oneshot::Receiver<()>)> {
        let mut slot = lock(&self.slot);
        if slot.state.is_busy() {
            return Err(DeviceError::AlreadyScanning);
        }

        let (tx, rx) = oneshot::channel();
        slot.generation += 1;
        slot.state = next;
        slot.pending = Some(Pending {
            generation: slot.generation,
            cancel: tx,
        });
        Ok((slot.generation, rx))
    }

    /// Releases the slot if `generation` still owns it.
    ///
    /// An operation that lost the slot to `cancel()` ends as `Cancelled`,
    /// whatever the radio produced, and leaves the state alone.
    fn finish<T>(
        &self,
        generation: u64,
        result: DeviceResult<T>,
        success: impl FnOnce(&T) -> ReaderState,
    ) -> DeviceResult<T> {
        let mut slot = lock(&self.slot);

        let owns_slot = matches!(&slot.pending, Some(p) if p.generation == generation);
        if !owns_slot {
            debug!(generation, current = slot.generation, "Cancelled operation unwound");
            return Err(DeviceError::Cancelled);
        }

        slot.pending = None;
        slot.state = match &result {
            Ok(value) => success(value),
            Err(DeviceError::Cancelled) => ReaderState::Idle,
            Err(e) => ReaderState::Failed(e.clone()),
        };
        result
    }

    /// Waits for one tag and returns its card token.
    pub async fn scan(&self) -> DeviceResult<String> {
        let (generation, cancelled) = self.begin(ReaderState::Scanning)?;
        debug!(generation, "Scan started");

        let result = self.run_scan(cancelled).await;
        let result = self.finish(generation, result, |token| ReaderState::Success(token.clone()));

        match &result {
            Ok(token) => info!(token = %token, "Card scanned"),
            Err(e) => warn!(error = ?e, "Scan ended without a card"),
        }
        result
    }

    async fn run_scan(&self, cancelled: oneshot::Receiver<()>) -> DeviceResult<String> {
        let mut radio = self.radio.lock().await;

        if !radio.is_enabled().await? {
            return Err(DeviceError::NfcDisabled);
        }

        radio.register_tag_event().await?;

        // Cancel wins over a tag that arrived in the same poll
        let outcome = tokio::select! {
            biased;
            _ = cancelled => Err(DeviceError::Cancelled),
            event = radio.next_event() => event,
            _ = tokio::time::sleep(self.scan_timeout) => Err(DeviceError::ScanTimedOut {
                secs: self.scan_timeout.as_secs(),
            }),
        };

        if let Err(e) = radio.unregister_tag_event().await {
            warn!(error = ?e, "Failed to release tag discovery");
        }

        match outcome? {
            NfcEvent::TagDiscovered(tag) => {
                debug!(tag_id = %tag.id_hex(), records = tag.records.len(), "Tag discovered");
                Ok(decode_tag(&tag)?)
            }
            NfcEvent::SessionClosed => Err(DeviceError::NoTagFound),
        }
    }

    /// Writes `card_number` as a text record to the tag in the field.
    pub async fn write_card(&self, card_number: &str) -> DeviceResult<()> {
        // Writes are not cancellable; the slot only marks the reader busy
        let (generation, _cancel) = self.begin(ReaderState::Writing)?;

        let result = self.run_write(card_number).await;
        let result = self.finish(generation, result, |_| ReaderState::Idle);

        match &result {
            Ok(()) => info!(card_number = %card_number, "Card written"),
            Err(e) => warn!(error = ?e, "Card write failed"),
        }
        result
    }

    async fn run_write(&self, card_number: &str) -> DeviceResult<()> {
        let mut radio = self.radio.lock().await;

        if !radio.is_enabled().await? {
            return Err(DeviceError::NfcDisabled);
        }

        let message = encode_message(&[NdefRecord::text(card_number, CARD_LANGUAGE)]);

        let result = match radio.request_ndef_technology().await {
            Ok(tag) => {
                debug!(tag_id = %tag.id_hex(), bytes = message.len(), "Writing card");
                radio.write_ndef_message(&message).await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = radio.cancel_technology_request().await {
            warn!(error = ?e, "Failed to release technology request");
        }

        result
    }

    /// Abandons a pending scan and returns to `Idle`. Idempotent.
    ///
    /// A write in progress is left to finish.
    pub fn cancel(&self) {
        let mut slot = lock(&self.slot);
        if slot.state == ReaderState::Writing {
            return;
        }

        if let Some(pending) = slot.pending.take() {
            debug!(generation = pending.generation, "Cancelling scan");
            let _ = pending.cancel.send(());
        }
        slot.state = ReaderState::Idle;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
