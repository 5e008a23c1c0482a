use app_core::{Color, LedSink, TimeOfDay};

/// Keys around the edge of the grid in clockwise order, starting at twelve o'clock.
pub const FACE: [u8; 12] = [2, 3, 7, 11, 15, 14, 13, 12, 8, 4, 0, 1];

pub const HOUR_HAND: Color = Color::RED.darken();
pub const MINUTE_HAND: Color = Color::BLUE.darken();
pub const SECOND_HAND: Color = Color::YELLOW.darken();

/// Position on the face for `value` out of `divisor` (e.g. 3 of 12 hours).
///
/// Percent-truncated first, so 59 of 60 lands on the last position rather
/// than rounding back to twelve o'clock.
pub fn face_position(value: u32, divisor: u32) -> usize {
    let divisor = divisor.max(1);
    let percent = value * 100 / divisor;
    let index = (percent * FACE.len() as u32 / 100) as usize;
    index.min(FACE.len() - 1)
}

pub fn face_key(value: u32, divisor: u32) -> u8 {
    FACE[face_position(value, divisor)]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hands {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Hands {
    pub fn at(time: TimeOfDay, tz_offset_h: i8) -> Self {
        let hour_12 = time.local_hour(tz_offset_h) % 12;
        Self {
            hour: face_key(u32::from(hour_12), 12),
            minute: face_key(u32::from(time.minute), 60),
            second: face_key(u32::from(time.second), 60),
        }
    }
}

/// Three-hand clock drawn on the outer ring.
///
/// Redraws only when the second hand moves to another key.
#[derive(Debug, Clone, Default)]
pub struct ClockFace {
    last_second: Option<u8>,
}

impl ClockFace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the next step to draw.
    pub fn invalidate(&mut self) {
        self.last_second = None;
    }

    /// Returns true when a new frame was drawn.
    pub fn step(&mut self, time: TimeOfDay, tz_offset_h: i8, leds: &mut dyn LedSink) -> bool {
        let hands = Hands::at(time, tz_offset_h);
        if self.last_second == Some(hands.second) {
            return false;
        }
        self.last_second = Some(hands.second);

        leds.fill(Color::OFF);
        leds.set_color(hands.hour, HOUR_HAND);
        leds.set_color(hands.minute, MINUTE_HAND);
        leds.set_color(hands.second, SECOND_HAND);
        true
    }
}
