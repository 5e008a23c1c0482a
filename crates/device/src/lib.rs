//! Ports the controller reads from: key events, time and the network.

mod channel;
mod clock;
mod net;

use std::collections::VecDeque;
use std::time::Duration;

use app_core::TimeOfDay;
use thiserror::Error;

pub use channel::{key_channel, ChannelKeySource};
pub use clock::{ClockOffset, SystemClock};
pub use net::HttpClockSync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: u8,
    pub transition: KeyTransition,
}

impl KeyEvent {
    pub const fn pressed(key: u8) -> Self {
        Self {
            key,
            transition: KeyTransition::Pressed,
        }
    }

    pub const fn released(key: u8) -> Self {
        Self {
            key,
            transition: KeyTransition::Released,
        }
    }

    pub fn is_press(&self) -> bool {
        self.transition == KeyTransition::Pressed
    }
}

/// Non-blocking source of debounced key transitions.
pub trait KeyEventSource {
    fn poll(&mut self) -> Option<KeyEvent>;
}

impl<T: KeyEventSource + ?Sized> KeyEventSource for &mut T {
    fn poll(&mut self) -> Option<KeyEvent> {
        (**self).poll()
    }
}

/// Replays a fixed script, one event per poll.
impl KeyEventSource for VecDeque<KeyEvent> {
    fn poll(&mut self) -> Option<KeyEvent> {
        self.pop_front()
    }
}

pub trait WallClock {
    /// Monotonic time since an arbitrary origin.
    fn now(&self) -> Duration;
    /// UTC time of day. Only meaningful after a clock sync.
    fn time_of_day(&self) -> TimeOfDay;
}

impl<T: WallClock + ?Sized> WallClock for &T {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn time_of_day(&self) -> TimeOfDay {
        (**self).time_of_day()
    }
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no time server configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("response had no Date header")]
    MissingDate,
    #[error("unparseable Date header: {0:?}")]
    InvalidDate(String),
}

/// Best-effort connectivity used during boot.
pub trait NetworkSync {
    fn connect(&mut self) -> Result<(), NetworkError>;
    /// Adjusts the wall clock to network time.
    fn sync_clock(&mut self) -> Result<(), NetworkError>;
}

impl<T: NetworkSync + ?Sized> NetworkSync for &mut T {
    fn connect(&mut self) -> Result<(), NetworkError> {
        (**self).connect()
    }

    fn sync_clock(&mut self) -> Result<(), NetworkError> {
        (**self).sync_clock()
    }
}
