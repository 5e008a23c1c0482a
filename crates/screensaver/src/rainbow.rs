use app_core::{keys, Color, LedSink};

pub const MIN: i16 = 8;
pub const MAX: i16 = 128;
pub const STEP: i16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyState {
    rgb: [i16; 3],
    dirs: [i16; 3],
}

impl KeyState {
    fn seed(key: u8) -> Self {
        let d = i16::from(key) + i16::from(key % keys::COLUMNS);
        Self {
            rgb: [d * 4, d * 8, d * 16],
            dirs: [1; 3],
        }
    }

    fn advance(&mut self) -> Color {
        for (value, dir) in self.rgb.iter_mut().zip(self.dirs.iter_mut()) {
            *value = (*value + STEP * *dir).clamp(MIN, MAX);
            if *value >= MAX {
                *dir = -1;
            } else if *value <= MIN {
                *dir = 1;
            }
        }
        let [r, g, b] = self.rgb;
        Color::new(r as u8, g as u8, b as u8)
    }
}

/// Every key cycles its channels independently between dim and mid brightness.
#[derive(Debug, Clone, Default)]
pub struct Rainbow {
    keys: [Option<KeyState>; keys::KEY_COUNT as usize],
}

impl Rainbow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&mut self, leds: &mut dyn LedSink) {
        for key in keys::all() {
            let state = self.keys[usize::from(key)].get_or_insert_with(|| KeyState::seed(key));
            leds.set_color(key, state.advance());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Frame([Color; 16]);

    impl LedSink for Frame {
        fn set_color(&mut self, key: u8, color: Color) {
            self.0[usize::from(key)] = color;
        }
    }

    #[test]
    fn seeds_from_key_index() {
        assert_eq!(KeyState::seed(0).rgb, [0, 0, 0]);
        assert_eq!(KeyState::seed(5).rgb, [24, 48, 96]);
        assert_eq!(KeyState::seed(15).rgb, [72, 144, 288]);
    }

    #[test]
    fn channels_stay_within_bounds() {
        let mut rainbow = Rainbow::new();
        let mut frame = Frame([Color::OFF; 16]);
        for _ in 0..500 {
            rainbow.step(&mut frame);
            for c in frame.0 {
                for ch in [c.r, c.g, c.b] {
                    assert!((8..=128).contains(&ch), "channel {ch} out of range");
                }
            }
        }
    }

    #[test]
    fn direction_turns_at_the_top() {
        let mut s = KeyState {
            rgb: [125, 60, 10],
            dirs: [1, 1, -1],
        };
        assert_eq!(s.advance(), Color::new(128, 65, 8));
        assert_eq!(s.dirs, [-1, 1, 1]);
        assert_eq!(s.advance(), Color::new(123, 70, 13));
    }
}
