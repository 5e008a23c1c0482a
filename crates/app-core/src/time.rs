use serde::{Deserialize, Serialize};

/// Wall-clock time of day as reported by the device clock (no timezone applied).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeOfDay {
    pub const fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    /// Hour of day after applying a whole-hour timezone offset, in 0..24.
    pub fn local_hour(self, tz_offset_h: i8) -> u8 {
        (i16::from(self.hour) + i16::from(tz_offset_h)).rem_euclid(24) as u8
    }
}
