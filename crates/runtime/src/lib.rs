//! The keypad engine: input handling, layers, sleep/wake, and the boot
//! animation, wired to the ports in `app-core`, `actions` and `device`.

pub mod boot;
pub mod controller;
pub mod panel;
mod poll;
mod sinks;

pub use boot::{BootReport, BootSequencer, BootStep, StepOutcome};
pub use controller::{Controller, ControllerState, Outcome, DEFAULT_SLEEP_TIMEOUT};
pub use poll::run_until;
pub use sinks::LogLedSink;
