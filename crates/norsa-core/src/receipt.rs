//! # Receipt Formatting
//!
//! Renders receipts as thermal-printer markup.
//!
//! ## Markup
//! ```text
//! [L] [C] [R]            left / centre / right aligned column
//! <font size='big'>      double width + height
//! <font size='tall'>     double height
//! <b> <u>                bold / underline
//! ```
//!
//! ## Transaction Receipt Layout
//! ```text
//! ┌──────────────────────────────┐
//! │          Norsa N.V.          │  header: brand, number, local time
//! │       Receipt N.O: 417       │
//! │    10/05/2024 02:05:09 PM    │
//! │ ============================ │
//! │ Sale Amount :     NAFL 12.50 │  amount block
//! │ ============================ │
//! │ Merchant :                   │  identity block
//! │ Customer :                   │
//! │ Signature :                  │
//! │ ---------------------------- │
//! │ Thank you for your purchase  │  footer
//! └──────────────────────────────┘
//! ```
//!
//! Receipt number and print time are inputs, so output is deterministic.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::fmt::Write;

use crate::money::Money;
use crate::report::DailySummary;
use crate::types::{Client, PrinterConfig, TransactionType};

/// Strftime pattern for the receipt timestamp (`DD/MM/YYYY hh:mm:ss AM`).
pub const RECEIPT_TIME_FORMAT: &str = "%d/%m/%Y %I:%M:%S %p";

// =============================================================================
// Branding
// =============================================================================

/// Fixed texts printed on every receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptBranding {
    pub brand: String,
    pub currency: String,
    pub customer_service_phone: String,
}

impl Default for ReceiptBranding {
    fn default() -> Self {
        ReceiptBranding {
            brand: "Norsa N.V.".to_string(),
            currency: "NAFL".to_string(),
            customer_service_phone: "+5999 767-1563".to_string(),
        }
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Everything that varies between two transaction receipts.
#[derive(Debug, Clone)]
pub struct TransactionReceipt<'a, Tz: TimeZone> {
    pub receipt_number: u32,
    pub printed_at: DateTime<Tz>,
    pub kind: TransactionType,
    pub amount: Money,
    pub merchant_name: &'a str,
    pub client: &'a Client,
}

/// Balance enquiry receipt.
#[derive(Debug, Clone)]
pub struct BalanceReceipt<'a, Tz: TimeZone> {
    pub receipt_number: u32,
    pub printed_at: DateTime<Tz>,
    pub balance: Money,
    pub merchant_name: &'a str,
    pub client: &'a Client,
}

/// End-of-day receipt.
#[derive(Debug, Clone)]
pub struct DailyReceipt<'a, Tz: TimeZone> {
    pub receipt_number: u32,
    pub printed_at: DateTime<Tz>,
    pub merchant_name: &'a str,
    pub summary: &'a DailySummary,
}

// =============================================================================
// Formatter
// =============================================================================

/// Builds receipt markup for one printer geometry.
#[derive(Debug, Clone)]
pub struct ReceiptFormatter {
    branding: ReceiptBranding,
    rule_width: usize,
}

impl ReceiptFormatter {
    /// Rules span the printer's characters-per-line.
    pub fn new(branding: ReceiptBranding, printer: &PrinterConfig) -> Self {
        ReceiptFormatter {
            branding,
            rule_width: printer.chars_per_line.max(1) as usize,
        }
    }

    pub fn branding(&self) -> &ReceiptBranding {
        &self.branding
    }

    /// Sale or retour receipt.
    pub fn transaction<Tz: TimeZone>(&self, receipt: &TransactionReceipt<'_, Tz>) -> String
    where
        Tz::Offset: Display,
    {
        let mut out = String::new();
        self.header(&mut out, receipt.receipt_number, &receipt.printed_at);
        line(
            &mut out,
            format!(
                "[L]{} Amount :[R]{}",
                receipt.kind.receipt_label(),
                receipt.amount.with_currency(&self.branding.currency)
            ),
        );
        line(&mut out, "[L]");
        self.double_rule(&mut out);
        line(&mut out, "[L]");
        self.merchant_block(&mut out, receipt.merchant_name);
        self.customer_block(&mut out, receipt.client);
        self.signature_and_footer(&mut out);
        out
    }

    /// Balance enquiry receipt.
    pub fn balance<Tz: TimeZone>(&self, receipt: &BalanceReceipt<'_, Tz>) -> String
    where
        Tz::Offset: Display,
    {
        let mut out = String::new();
        self.header(&mut out, receipt.receipt_number, &receipt.printed_at);
        line(
            &mut out,
            format!(
                "[L]Balance :[R]{}",
                receipt.balance.with_currency(&self.branding.currency)
            ),
        );
        line(&mut out, "[L]");
        self.double_rule(&mut out);
        line(&mut out, "[L]");
        self.merchant_block(&mut out, receipt.merchant_name);
        self.customer_block(&mut out, receipt.client);
        self.signature_and_footer(&mut out);
        out
    }

    /// Daily sales receipt: one line per transaction, retours negative.
    pub fn daily<Tz: TimeZone>(&self, receipt: &DailyReceipt<'_, Tz>) -> String
    where
        Tz::Offset: Display,
    {
        let mut out = String::new();
        self.header(&mut out, receipt.receipt_number, &receipt.printed_at);

        for tx in &receipt.summary.transactions {
            let sign = match tx.kind {
                TransactionType::Expense => ' ',
                TransactionType::Retour => '-',
            };
            line(
                &mut out,
                format!(
                    "[L]{}: [R]{} {}{}",
                    tx.client_id, self.branding.currency, sign, tx.amount
                ),
            );
        }

        line(&mut out, "[L]");
        self.double_rule(&mut out);
        line(&mut out, "[L]");
        line(
            &mut out,
            format!(
                "[R]<b>Daily sales total :</b>[R]{}",
                receipt.summary.total.with_currency(&self.branding.currency)
            ),
        );
        self.merchant_block(&mut out, receipt.merchant_name);
        line(&mut out, "[L]");
        line(&mut out, "[L]");
        self.signature_and_footer(&mut out);
        out
    }

    /// Calibration page printed after changing the printer settings.
    pub fn test_page(&self, printer: &PrinterConfig) -> String {
        let mut out = String::new();
        line(
            &mut out,
            format!("[C]<u><font size='big'>{}</font></u>", self.branding.brand),
        );
        line(&mut out, "[L]");
        line(&mut out, "[C]Printer test");
        line(&mut out, format!("[L]Dpi :[R]{}", printer.dpi));
        line(&mut out, format!("[L]Width MM :[R]{}", printer.width_mm));
        line(
            &mut out,
            format!("[L]Characters per line :[R]{}", printer.chars_per_line),
        );
        self.double_rule(&mut out);

        // Column ruler: the last digit must land on the right edge
        let ruler: String = "1234567890".chars().cycle().take(self.rule_width).collect();
        line(&mut out, format!("[L]{}", ruler));
        out.push_str(&format!("[C]{}", "-".repeat(self.rule_width)));
        out
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    fn header<Tz: TimeZone>(&self, out: &mut String, number: u32, at: &DateTime<Tz>)
    where
        Tz::Offset: Display,
    {
        line(
            out,
            format!("[C]<u><font size='big'>{}</font></u>", self.branding.brand),
        );
        line(out, "[L]");
        line(out, format!("[C]Receipt N.O: {}", number));
        line(out, format!("[C]{}", at.format(RECEIPT_TIME_FORMAT)));
        line(out, "[L]");
        self.double_rule(out);
        line(out, "[L]");
    }

    fn double_rule(&self, out: &mut String) {
        line(out, format!("[C]{}", "=".repeat(self.rule_width)));
    }

    fn merchant_block(&self, out: &mut String, merchant_name: &str) {
        line(out, "[L]<font size='tall'>Merchant :</font>");
        line(out, format!("[L]{}", merchant_name));
    }

    fn customer_block(&self, out: &mut String, client: &Client) {
        line(out, "[L]<font size='tall'>Customer :</font>");
        line(out, format!("[L]{}", client.name));
        line(out, format!("[L]{}", client.code));
        line(out, "[L]");
        line(out, "[L]");
    }

    fn signature_and_footer(&self, out: &mut String) {
        line(out, "[L]<font size='tall'>Signature :</font>");
        line(out, "[L]");
        line(out, "[L]");
        line(out, format!("[C]{}", "-".repeat(self.rule_width)));
        line(out, "[L]");
        line(out, "[L]Thank you for your purchase");
        line(out, "[L]For questions or inquiries call customer service:");
        // Last line has no trailing newline
        out.push_str(&format!("[L]{}", self.branding.customer_service_phone));
    }
}

fn line(out: &mut String, text: impl AsRef<str>) {
    let _ = writeln!(out, "{}", text.as_ref());
}

// =============================================================================
// Unit Tests
// =============================================================================
