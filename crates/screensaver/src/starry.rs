use app_core::{keys, Color, LedSink};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub const PEAK: u8 = 64;

/// A single star fades in and out, then another key takes over.
#[derive(Debug, Clone)]
pub struct StarryNight {
    key: u8,
    value: u8,
    rising: bool,
    rng: SmallRng,
}

impl Default for StarryNight {
    fn default() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }
}

impl StarryNight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            key: 0,
            value: 0,
            rising: true,
            rng,
        }
    }

    pub fn active_key(&self) -> u8 {
        self.key
    }

    pub fn brightness(&self) -> u8 {
        self.value
    }

    pub fn is_rising(&self) -> bool {
        self.rising
    }

    pub fn color_for(value: u8) -> Color {
        Color::new(value, value, value.saturating_mul(3))
    }

    pub fn step(&mut self, leds: &mut dyn LedSink) {
        self.value = if self.rising {
            self.value.saturating_add(1)
        } else {
            self.value.saturating_sub(1)
        };
        leds.set_color(self.key, Self::color_for(self.value));

        if self.value == 0 {
            let last = self.key;
            self.key = self.pick_other(last);
            self.value = 1;
            self.rising = true;
            leds.set_color(last, Color::OFF);
        } else if self.value >= PEAK {
            self.rising = false;
        }
    }

    fn pick_other(&mut self, last: u8) -> u8 {
        let n = self.rng.gen_range(0..keys::KEY_COUNT - 1);
        if n >= last {
            n + 1
        } else {
            n
        }
    }
}
