//! Boot-protocol keyboard and consumer-control report encoding.

use actions::{ConsumerCode, KeyCode, OutputError};

/// Non-modifier keys a boot keyboard report can carry.
pub const MAX_KEYS: usize = 6;

/// `[modifiers, reserved, key1..key6]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardReport(pub [u8; 8]);

impl KeyboardReport {
    pub const EMPTY: Self = Self([0; 8]);

    pub fn new(keys: &[KeyCode]) -> Result<Self, OutputError> {
        let mut report = [0u8; 8];
        let mut slot = 2;
        for key in keys {
            if let Some(bit) = key.modifier_bit() {
                report[0] |= bit;
                continue;
            }
            let usage = key.usage();
            if report[2..slot].contains(&usage) {
                continue;
            }
            if slot == report.len() {
                let pressed = keys.iter().filter(|k| k.modifier_bit().is_none()).count();
                return Err(OutputError::Rollover(pressed));
            }
            report[slot] = usage;
            slot += 1;
        }
        Ok(Self(report))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// 16-bit usage, little endian. All zeroes releases.
pub fn consumer_report(code: Option<ConsumerCode>) -> [u8; 2] {
    code.map_or(0, ConsumerCode::usage).to_le_bytes()
}
