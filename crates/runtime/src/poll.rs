use std::time::Duration;

use actions::HidOutput;
use app_core::{Delay, LedSink};
use device::{KeyEventSource, WallClock};

use crate::Controller;

/// Ticks the controller every `tick` until `keep_going` says stop.
///
/// `keep_going` runs before each tick and may act on the controller, e.g. to
/// apply a macro reload.
pub fn run_until<L, H, D>(
    controller: &mut Controller<L, H, D>,
    source: &mut dyn KeyEventSource,
    clock: &dyn WallClock,
    tick: Duration,
    mut keep_going: impl FnMut(&mut Controller<L, H, D>) -> bool,
) where
    L: LedSink,
    H: HidOutput,
    D: Delay,
{
    let tick_ms = u64::try_from(tick.as_millis()).unwrap_or(u64::MAX).max(1);
    while keep_going(controller) {
        controller.tick(source, clock);
        controller.delay_mut().delay_ms(tick_ms);
    }
}
