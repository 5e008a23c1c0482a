use app_core::{keys, Color, LedSink};
use tracing::trace;

/// Dry-run LED output: remembers the grid and traces every change.
#[derive(Debug, Clone, Default)]
pub struct LogLedSink {
    frame: [Color; keys::KEY_COUNT as usize],
}

impl LogLedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> &[Color] {
        &self.frame
    }

    /// The grid as four rows of `r,g,b` cells.
    pub fn describe(&self) -> String {
        self.frame
            .chunks(usize::from(keys::COLUMNS))
            .map(|row| {
                row.iter()
                    .map(|c| format!("{:>11}", c.to_string()))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl LedSink for LogLedSink {
    fn set_color(&mut self, key: u8, color: Color) {
        let Some(slot) = self.frame.get_mut(usize::from(key)) else {
            return;
        };
        if *slot != color {
            trace!(key, %color, "led");
            *slot = color;
        }
    }
}
