//! Mock devices for tests and for running the terminal without hardware.
//!
//! Each mock is created together with a handle: the mock goes to the code
//! under test, the handle stays with the test to drive and inspect it.

mod nfc;
mod printer;

pub use nfc::{MockNfcHandle, MockNfcRadio};
pub use printer::{MockPrinter, MockPrinterHandle};
