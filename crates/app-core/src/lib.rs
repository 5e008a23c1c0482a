//! Shared model for the macro keypad: key grid layout, colours, and the two
//! output ports every other crate talks to (LEDs and blocking delays).

pub mod color;
pub mod keys;
pub mod time;

use std::thread;
use std::time::Duration;

pub use color::Color;
pub use time::TimeOfDay;

/// Per-key backlight output.
///
/// Fire-and-forget: the core never observes a result. Implementations should
/// ignore indices outside the grid.
pub trait LedSink {
    fn set_color(&mut self, key: u8, color: Color);

    fn fill(&mut self, color: Color) {
        for key in keys::all() {
            self.set_color(key, color);
        }
    }
}

impl<T: LedSink + ?Sized> LedSink for &mut T {
    fn set_color(&mut self, key: u8, color: Color) {
        (**self).set_color(key, color);
    }
}

/// Blocking wait used by macro sequences, confirm flashes and the boot animation.
pub trait Delay {
    fn delay_ms(&mut self, ms: u64);
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay_ms(&mut self, ms: u64) {
        (**self).delay_ms(ms);
    }
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay_ms(&mut self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}
