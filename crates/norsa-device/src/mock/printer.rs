//! Mock receipt printer that records what it was asked to print.

use std::sync::{Arc, Mutex};

use norsa_core::PrinterConfig;

use crate::error::{DeviceError, DeviceResult};
use crate::traits::ReceiptPrinter;

#[derive(Debug, Default)]
struct Shared {
    printed: Vec<(String, PrinterConfig)>,
    failures_left: usize,
}

#[derive(Debug)]
pub struct MockPrinter {
    shared: Arc<Mutex<Shared>>,
}

/// Controls a [`MockPrinter`].
#[derive(Debug, Clone)]
pub struct MockPrinterHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MockPrinter {
    pub fn new() -> (Self, MockPrinterHandle) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            MockPrinter {
                shared: shared.clone(),
            },
            MockPrinterHandle { shared },
        )
    }
}

impl ReceiptPrinter for MockPrinter {
    async fn print(&mut self, text: &str, config: &PrinterConfig) -> DeviceResult<()> {
        let mut shared = self
            .shared
            .lock()
            .map_err(|_| DeviceError::printer("mock state poisoned"))?;

        if shared.failures_left > 0 {
            shared.failures_left -= 1;
            return Err(DeviceError::printer("out of paper"));
        }

        shared.printed.push((text.to_string(), *config));
        Ok(())
    }
}

impl MockPrinterHandle {
    /// Receipts printed so far, oldest first.
    pub fn printed(&self) -> Vec<String> {
        self.shared
            .lock()
            .map(|s| s.printed.iter().map(|(text, _)| text.clone()).collect())
            .unwrap_or_default()
    }

    /// Geometry each receipt was printed with.
    pub fn configs(&self) -> Vec<PrinterConfig> {
        self.shared
            .lock()
            .map(|s| s.printed.iter().map(|(_, config)| *config).collect())
            .unwrap_or_default()
    }

    /// Makes the next `count` prints fail.
    pub fn fail_next(&self, count: usize) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.failures_left = count;
        }
    }
}
