use actions::{ConsumerCode, HidOutput, KeyCode, OutputError};
use tracing::info;

/// Dry-run sink: logs what would be sent and always succeeds.
#[derive(Debug, Default)]
pub struct LogHidOutput {
    held: Vec<KeyCode>,
}

impl LogHidOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently held by the last combo.
    pub fn held(&self) -> &[KeyCode] {
        &self.held
    }
}

impl HidOutput for LogHidOutput {
    fn send_control_code(&mut self, code: ConsumerCode) -> Result<(), OutputError> {
        info!(%code, "hid: control code");
        Ok(())
    }

    fn press_combo(&mut self, keys: &[KeyCode]) -> Result<(), OutputError> {
        self.held = keys.to_vec();
        let names: Vec<&str> = keys.iter().map(|k| k.name()).collect();
        info!(keys = %names.join("+"), "hid: press");
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), OutputError> {
        if !self.held.is_empty() {
            info!("hid: release all");
        }
        self.held.clear();
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), OutputError> {
        info!(text = %text.escape_debug(), "hid: type");
        Ok(())
    }
}
