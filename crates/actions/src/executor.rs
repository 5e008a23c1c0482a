use app_core::Delay;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{ActionKind, CustomHandler, HidOutput, KeyCode, MacroError};

/// Fixed delays used while executing multi-step actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Hold time for each sequence chord before release.
    pub sequence_settle_ms: u64,
    /// Pause after each sequence chord is released.
    pub sequence_step_ms: u64,
    /// Wait for the launcher to open before typing.
    pub search_open_ms: u64,
    /// Wait for search results before confirming.
    pub search_results_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            sequence_settle_ms: 200,
            sequence_step_ms: 500,
            search_open_ms: 200,
            search_results_ms: 1000,
        }
    }
}

/// Runs one action at a time against the HID output.
///
/// Execution blocks for the configured delays. There is no retry and no
/// cancellation: a failing step aborts the rest of the action.
#[derive(Debug, Clone)]
pub struct Executor {
    timing: Timing,
    launcher_key: KeyCode,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(Timing::default())
    }
}

impl Executor {
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            launcher_key: KeyCode::LeftGui,
        }
    }

    pub fn with_launcher_key(mut self, key: KeyCode) -> Self {
        self.launcher_key = key;
        self
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn execute(
        &self,
        action: &ActionKind,
        hid: &mut dyn HidOutput,
        delay: &mut dyn Delay,
        custom: &mut dyn CustomHandler,
    ) -> Result<(), MacroError> {
        debug!(%action, "executing macro");

        let result = self.run(action, hid, delay, custom);
        let holds_keys = matches!(
            action,
            ActionKind::Combo(_) | ActionKind::Sequence(_) | ActionKind::Search(_)
        );
        if result.is_err() && holds_keys {
            // Single attempt; the action itself is not retried.
            if let Err(e) = hid.release_all() {
                warn!(error = %e, "could not release keys after failed macro");
            }
        }
        result
    }

    fn run(
        &self,
        action: &ActionKind,
        hid: &mut dyn HidOutput,
        delay: &mut dyn Delay,
        custom: &mut dyn CustomHandler,
    ) -> Result<(), MacroError> {
        match action {
            ActionKind::ControlCode(code) => hid.send_control_code(*code)?,
            ActionKind::Text(text) => hid.write_text(text)?,
            ActionKind::Combo(keys) => {
                hid.press_combo(keys)?;
                hid.release_all()?;
            }
            ActionKind::Sequence(chords) => {
                for chord in chords {
                    hid.press_combo(chord.keys())?;
                    delay.delay_ms(self.timing.sequence_settle_ms);
                    hid.release_all()?;
                    delay.delay_ms(self.timing.sequence_step_ms);
                }
            }
            ActionKind::Custom(op) => custom.run(*op, delay)?,
            ActionKind::Search(query) => {
                hid.press_combo(&[self.launcher_key])?;
                hid.release_all()?;
                delay.delay_ms(self.timing.search_open_ms);
                hid.write_text(query)?;
                delay.delay_ms(self.timing.search_results_ms);
                hid.write_text("\n")?;
            }
        }

        Ok(())
    }
}
