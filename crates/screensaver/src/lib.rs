//! Idle animations shown on the key grid while the keypad sleeps.
//!
//! The engine is stepped once per poll-loop tick. Every animation keeps its
//! own state between frames and between activations.

pub mod clock;
pub mod rainbow;
pub mod starry;

use app_core::{keys, Color, LedSink, TimeOfDay};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use clock::ClockFace;
pub use rainbow::Rainbow;
pub use starry::StarryNight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreensaverKind {
    /// Keys stay dark.
    None,
    /// Hour, minute and second hands around the grid edge.
    Clock,
    #[default]
    Rainbow,
    StarryNight,
    /// Only the wake key glows.
    SingleKey,
}

/// Hours during which animations are suppressed.
///
/// `start_hour` is inclusive, `end_hour` exclusive; the window wraps past
/// midnight when `start_hour > end_hour`. Equal hours mean no quiet time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            start_hour: 23,
            end_hour: 9,
        }
    }
}

impl QuietHours {
    pub fn contains(&self, hour: u8) -> bool {
        let (start, end) = (self.start_hour, self.end_hour);
        if start == end {
            false
        } else if start < end {
            (start..end).contains(&hour)
        } else {
            hour >= start || hour < end
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreensaverConfig {
    pub kind: ScreensaverKind,
    pub tz_offset_h: i8,
    pub quiet_hours: Option<QuietHours>,
}

impl Default for ScreensaverConfig {
    fn default() -> Self {
        Self {
            kind: ScreensaverKind::default(),
            tz_offset_h: 0,
            quiet_hours: Some(QuietHours::default()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Screensaver {
    config: ScreensaverConfig,
    active: bool,
    disabled: bool,
    clock_trusted: bool,
    rainbow: Rainbow,
    clock: ClockFace,
    starry: StarryNight,
}

impl Screensaver {
    pub fn new(config: ScreensaverConfig) -> Self {
        Self::with_starry_night(config, StarryNight::new())
    }

    /// Uses a caller-provided star field (e.g. seeded for reproducible frames).
    pub fn with_starry_night(config: ScreensaverConfig, starry: StarryNight) -> Self {
        Self {
            config,
            active: false,
            disabled: false,
            clock_trusted: false,
            rainbow: Rainbow::new(),
            clock: ClockFace::new(),
            starry,
        }
    }

    pub fn config(&self) -> &ScreensaverConfig {
        &self.config
    }

    /// The clock face is only drawn once the device clock has been synced.
    pub fn set_clock_trusted(&mut self, trusted: bool) {
        self.clock_trusted = trusted;
    }

    /// Clears the grid and begins animating.
    pub fn start(&mut self, leds: &mut dyn LedSink) {
        info!(kind = ?self.config.kind, "screensaver started");
        self.active = true;
        self.clock.invalidate();
        leds.fill(Color::OFF);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            debug!(active, "screensaver active changed");
        }
        self.active = active;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Flips "stay awake" mode and returns the new value. Disabling also
    /// deactivates a running screensaver.
    pub fn toggle_disabled(&mut self) -> bool {
        self.disabled = !self.disabled;
        if self.disabled {
            self.active = false;
        }
        info!(disabled = self.disabled, "screensaver disabled toggled");
        self.disabled
    }

    /// Renders one frame. Does nothing while inactive.
    pub fn step(&mut self, now: TimeOfDay, leds: &mut dyn LedSink) {
        if !self.active {
            return;
        }

        let hour = now.local_hour(self.config.tz_offset_h);
        if self.config.quiet_hours.is_some_and(|q| q.contains(hour)) {
            leds.fill(Color::OFF);
            leds.set_color(keys::WAKE_KEY, Color::SLEEPING);
            // The face is wiped every quiet tick, so redraw as soon as it ends.
            self.clock.invalidate();
            return;
        }

        match self.config.kind {
            ScreensaverKind::None => {}
            ScreensaverKind::Clock if self.clock_trusted => {
                self.clock.step(now, self.config.tz_offset_h, leds);
            }
            ScreensaverKind::Clock | ScreensaverKind::SingleKey => {
                leds.set_color(keys::WAKE_KEY, Color::SLEEPING);
            }
            ScreensaverKind::Rainbow => self.rainbow.step(leds),
            ScreensaverKind::StarryNight => self.starry.step(leds),
        }
    }
}
