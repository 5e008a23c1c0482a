//! HID output sinks: USB gadget report files on Linux, or a log-only stand-in.

mod gadget;
mod layout;
mod log;
pub mod report;

pub use gadget::{GadgetHidOutput, ReportWriter};
pub use layout::us_keystroke;
pub use log::LogHidOutput;
