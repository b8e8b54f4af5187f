//! # Console Printer
//!
//! Stands in for the thermal printer when running from a terminal: the
//! markup goes to any `io::Write` between two cut lines.

use std::io::Write;

use norsa_core::PrinterConfig;
use tracing::debug;

use crate::error::DeviceResult;
use crate::traits::ReceiptPrinter;

pub struct ConsolePrinter<W> {
    out: W,
}

impl ConsolePrinter<std::io::Stdout> {
    pub fn stdout() -> Self {
        ConsolePrinter::new(std::io::stdout())
    }
}

impl<W: Write> ConsolePrinter<W> {
    pub fn new(out: W) -> Self {
        ConsolePrinter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReceiptPrinter for ConsolePrinter<W> {
    async fn print(&mut self, text: &str, config: &PrinterConfig) -> DeviceResult<()> {
        debug!(bytes = text.len(), dpi = config.dpi, width_mm = config.width_mm, "Printing to console");

        let cut = "-".repeat(config.chars_per_line as usize);
        writeln!(self.out, "{cut}")?;
        writeln!(self.out, "{text}")?;
        writeln!(self.out, "{cut}")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_markup_between_cut_lines() {
        let mut printer = ConsolePrinter::new(Vec::new());
        let config = PrinterConfig {
            dpi: 150,
            width_mm: 48,
            chars_per_line: 4,
        };

        printer.print("[C]Norsa N.V.", &config).await.unwrap();

        let out = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(out, "----\n[C]Norsa N.V.\n----\n");
    }
}
