use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use app_core::TimeOfDay;
use chrono::{DateTime, Timelike, Utc};

use crate::WallClock;

/// Correction between the host clock and network time, shared between the
/// clock and whatever syncs it.
#[derive(Debug, Clone, Default)]
pub struct ClockOffset {
    inner: Arc<OffsetState>,
}

#[derive(Debug, Default)]
struct OffsetState {
    millis: AtomicI64,
    synced: AtomicBool,
}

impl ClockOffset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_millis(&self, millis: i64) {
        self.inner.millis.store(millis, Ordering::Relaxed);
        self.inner.synced.store(true, Ordering::Release);
    }

    pub fn millis(&self) -> i64 {
        self.inner.millis.load(Ordering::Relaxed)
    }

    pub fn is_synced(&self) -> bool {
        self.inner.synced.load(Ordering::Acquire)
    }

    /// Host time corrected by the offset.
    pub fn apply(&self, host: DateTime<Utc>) -> DateTime<Utc> {
        host + chrono::Duration::milliseconds(self.millis())
    }
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    started: Instant,
    offset: ClockOffset,
}

impl SystemClock {
    pub fn new(offset: ClockOffset) -> Self {
        Self {
            started: Instant::now(),
            offset,
        }
    }

    pub fn offset(&self) -> &ClockOffset {
        &self.offset
    }
}

impl WallClock for SystemClock {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn time_of_day(&self) -> TimeOfDay {
        let t = self.offset.apply(Utc::now());
        TimeOfDay::new(t.hour() as u8, t.minute() as u8, t.second() as u8)
    }
}
