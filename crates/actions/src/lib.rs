//! Macro actions for the keypad.
//!
//! This crate defines:
//! - The action model (`MacroAction`, `ActionKind`, `CustomOp`)
//! - The HID output port (`HidOutput`) that actions are emitted through
//! - The executor that turns one action into HID calls, delays and custom
//!   controller operations

pub mod executor;
pub mod keycode;

use std::fmt;

use app_core::{Color, Delay};
use serde::{Deserialize, Serialize};

pub use executor::{Executor, Timing};
pub use keycode::{ConsumerCode, KeyCode, UnknownCode};

/// One key binding: what the key does and how it is lit while idle.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroAction {
    pub kind: ActionKind,
    pub color: Color,
}

impl MacroAction {
    pub fn new(kind: ActionKind, color: Color) -> Self {
        Self { kind, color }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// Sends a consumer-control (media) code.
    ControlCode(ConsumerCode),
    /// Types literal text.
    Text(String),
    /// Presses all keys together, then releases them.
    Combo(Vec<KeyCode>),
    /// Runs each chord in order with a settle and inter-step delay.
    Sequence(Vec<Chord>),
    /// Runs a controller operation.
    Custom(CustomOp),
    /// Opens the launcher, types the query and confirms it.
    Search(String),
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ControlCode(_) => "control_code",
            Self::Text(_) => "text",
            Self::Combo(_) => "combo",
            Self::Sequence(_) => "sequence",
            Self::Custom(_) => "custom",
            Self::Search(_) => "search",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControlCode(code) => write!(f, "control_code {code}"),
            Self::Text(text) => write!(f, "text {text:?}"),
            Self::Combo(keys) => write!(f, "combo {}", Chord(keys.clone())),
            Self::Sequence(chords) => {
                f.write_str("sequence ")?;
                for (i, chord) in chords.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{chord}")?;
                }
                Ok(())
            }
            Self::Custom(op) => write!(f, "custom {op}"),
            Self::Search(query) => write!(f, "search {query:?}"),
        }
    }
}

/// One step of a sequence: a single key or several keys held together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord(pub Vec<KeyCode>);

impl Chord {
    pub fn single(key: KeyCode) -> Self {
        Self(vec![key])
    }

    pub fn keys(&self) -> &[KeyCode] {
        &self.0
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

/// Controller operations a key can be bound to.
///
/// Resolved when the macro registry is loaded; dispatch is a plain match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomOp {
    /// Put the keypad to sleep immediately.
    StartScreensaver,
    /// Toggle "stay awake" mode.
    ToggleScreensaverDisabled,
    /// Jump to a layer (clamped to the loaded layer count).
    SwitchLayer(usize),
    /// Roll a six-sided die on the key grid.
    RollDie,
}

impl fmt::Display for CustomOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartScreensaver => f.write_str("start_screensaver"),
            Self::ToggleScreensaverDisabled => f.write_str("toggle_screensaver_disabled"),
            Self::SwitchLayer(layer) => write!(f, "switch_layer {layer}"),
            Self::RollDie => f.write_str("roll_die"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("HID device write failed")]
    Io(#[from] std::io::Error),
    #[error("character {0:?} cannot be typed with the active keyboard layout")]
    Untypeable(char),
    #[error("too many keys pressed at once ({0}, at most 6)")]
    Rollover(usize),
    #[error("HID device disconnected")]
    Disconnected,
}

#[derive(Debug, thiserror::Error)]
pub enum MacroError {
    #[error("HID output failed")]
    OutputFailed(#[from] OutputError),
}

/// HID output port: the host sees these as keyboard and consumer-control reports.
pub trait HidOutput {
    fn send_control_code(&mut self, code: ConsumerCode) -> Result<(), OutputError>;
    fn press_combo(&mut self, keys: &[KeyCode]) -> Result<(), OutputError>;
    fn release_all(&mut self) -> Result<(), OutputError>;
    fn write_text(&mut self, text: &str) -> Result<(), OutputError>;
}

impl<T: HidOutput + ?Sized> HidOutput for &mut T {
    fn send_control_code(&mut self, code: ConsumerCode) -> Result<(), OutputError> {
        (**self).send_control_code(code)
    }

    fn press_combo(&mut self, keys: &[KeyCode]) -> Result<(), OutputError> {
        (**self).press_combo(keys)
    }

    fn release_all(&mut self) -> Result<(), OutputError> {
        (**self).release_all()
    }

    fn write_text(&mut self, text: &str) -> Result<(), OutputError> {
        (**self).write_text(text)
    }
}

impl<T: HidOutput + ?Sized> HidOutput for Box<T> {
    fn send_control_code(&mut self, code: ConsumerCode) -> Result<(), OutputError> {
        (**self).send_control_code(code)
    }

    fn press_combo(&mut self, keys: &[KeyCode]) -> Result<(), OutputError> {
        (**self).press_combo(keys)
    }

    fn release_all(&mut self) -> Result<(), OutputError> {
        (**self).release_all()
    }

    fn write_text(&mut self, text: &str) -> Result<(), OutputError> {
        (**self).write_text(text)
    }
}

/// Receives `Custom` actions. Implemented by the controller.
pub trait CustomHandler {
    fn run(&mut self, op: CustomOp, delay: &mut dyn Delay) -> Result<(), MacroError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_ops_deserialize_from_macro_file_values() {
        let op: CustomOp = serde_json::from_str("\"start_screensaver\"").unwrap();
        assert_eq!(op, CustomOp::StartScreensaver);
        let op: CustomOp = serde_json::from_str("{\"switch_layer\": 2}").unwrap();
        assert_eq!(op, CustomOp::SwitchLayer(2));
        assert!(serde_json::from_str::<CustomOp>("\"reboot\"").is_err());
    }

    #[test]
    fn display_describes_the_action() {
        let seq = ActionKind::Sequence(vec![
            Chord(vec![KeyCode::LeftGui, KeyCode::X]),
            Chord::single(KeyCode::U),
        ]);
        assert_eq!(seq.to_string(), "sequence GUI+X, U");
        assert_eq!(
            ActionKind::ControlCode(ConsumerCode::Mute).to_string(),
            "control_code MUTE"
        );
    }
}
