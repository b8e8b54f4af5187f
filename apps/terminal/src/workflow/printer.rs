//! # Printer Settings and Reprint

use tracing::info;

use norsa_client::MerchantApi;
use norsa_core::validation::validate_printer_config;
use norsa_core::PrinterConfig;
use norsa_device::ReceiptPrinter;

use super::{Clock, Terminal};
use crate::error::{TerminalError, TerminalResult};

impl<A, P, C> Terminal<A, P, C>
where
    A: MerchantApi,
    P: ReceiptPrinter,
    C: Clock,
{
    /// Stored printer geometry, or the default.
    pub async fn printer_config(&self) -> TerminalResult<PrinterConfig> {
        Ok(self.db.printer_config().get().await?)
    }

    /// Validates and stores new printer settings as typed by the operator.
    pub async fn update_printer_config(
        &self,
        dpi: &str,
        width_mm: &str,
        chars_per_line: &str,
    ) -> TerminalResult<PrinterConfig> {
        let config = validate_printer_config(dpi, width_mm, chars_per_line)?;
        self.db.printer_config().save(&config).await?;
        Ok(config)
    }

    /// Puts the printer settings back to their defaults.
    pub async fn reset_printer_config(&self) -> TerminalResult<PrinterConfig> {
        let config = PrinterConfig::default();
        self.db.printer_config().save(&config).await?;

        info!(
            dpi = config.dpi,
            width_mm = config.width_mm,
            chars_per_line = config.chars_per_line,
            "Printer config reset"
        );
        Ok(config)
    }

    /// Prints the calibration page with the stored settings.
    pub async fn print_test_page(&mut self) -> TerminalResult<()> {
        let config = self.printer_config().await?;
        self.print_receipt(|formatter| formatter.test_page(&config)).await
    }

    /// Prints the last receipt again, exactly as it was.
    pub async fn reprint_last(&mut self) -> TerminalResult<()> {
        let markup = self
            .db
            .journal()
            .last_printed_receipt()
            .await?
            .ok_or_else(|| TerminalError::business_rule("No receipt has been printed yet"))?;

        let config = self.printer_config().await?;
        self.printer.print(&markup, &config).await?;

        info!(bytes = markup.len(), "Last receipt reprinted");
        Ok(())
    }
}
