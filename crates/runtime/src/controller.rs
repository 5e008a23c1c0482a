use std::time::Duration;

use actions::{CustomHandler, CustomOp, Executor, HidOutput, MacroError};
use app_core::{keys, Color, Delay, LedSink};
use device::{KeyEvent, KeyEventSource, KeyTransition, WallClock};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use screensaver::Screensaver;
use storage::{LoadError, Registry};
use tracing::{debug, info, warn};

use crate::panel;

pub const DEFAULT_SLEEP_TIMEOUT: Duration = Duration::from_secs(60);

/// Snapshot of the controller for inspection and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub current_layer: usize,
    pub awake: bool,
    pub screensaver_disabled: bool,
    pub last_activity: Duration,
}

/// What a single key event led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Woke,
    LayerSelected(usize),
    /// A macro ran; carries whether it succeeded.
    Executed(bool),
    Released,
}

/// Owns every piece of runtime state and all output sinks.
///
/// Driven by [`Controller::tick`] from a single thread. Macro execution
/// blocks the tick.
pub struct Controller<L, H, D> {
    registry: Registry,
    executor: Executor,
    screensaver: Screensaver,
    leds: L,
    hid: H,
    delay: D,
    current_layer: usize,
    last_activity: Duration,
    sleep_timeout: Duration,
    rng: SmallRng,
}

impl<L: LedSink, H: HidOutput, D: Delay> Controller<L, H, D> {
    pub fn new(registry: Registry, screensaver: Screensaver, leds: L, hid: H, delay: D) -> Self {
        Self {
            registry,
            executor: Executor::default(),
            screensaver,
            leds,
            hid,
            delay,
            current_layer: 0,
            last_activity: Duration::ZERO,
            sleep_timeout: DEFAULT_SLEEP_TIMEOUT,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_sleep_timeout(mut self, timeout: Duration) -> Self {
        self.sleep_timeout = timeout;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Shows layer 0 and starts the idle timer from `now`.
    pub fn start(&mut self, now: Duration) {
        self.last_activity = now;
        self.select_layer(0);
    }

    pub fn state(&self) -> ControllerState {
        ControllerState {
            current_layer: self.current_layer,
            awake: !self.screensaver.is_active(),
            screensaver_disabled: self.screensaver.is_disabled(),
            last_activity: self.last_activity,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn screensaver(&self) -> &Screensaver {
        &self.screensaver
    }

    pub fn leds(&self) -> &L {
        &self.leds
    }

    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    /// One pass of the poll loop: drain input, check the idle timeout, draw a
    /// screensaver frame.
    pub fn tick(&mut self, source: &mut dyn KeyEventSource, clock: &dyn WallClock) {
        while let Some(event) = source.poll() {
            let outcome = self.handle_event(event, clock.now());
            if matches!(outcome, Outcome::Executed(_)) {
                self.drop_queued_presses(source, clock);
            }
        }

        self.check_idle(clock.now());

        if self.screensaver.is_active() {
            self.screensaver.step(clock.time_of_day(), &mut self.leds);
        }
    }

    /// Presses that queued up while a macro was blocking are discarded.
    /// Releases still restore key colours.
    fn drop_queued_presses(&mut self, source: &mut dyn KeyEventSource, clock: &dyn WallClock) {
        while let Some(event) = source.poll() {
            if event.is_press() {
                debug!(key = event.key, "press during macro dropped");
            } else {
                self.handle_event(event, clock.now());
            }
        }
    }

    pub fn handle_event(&mut self, event: KeyEvent, now: Duration) -> Outcome {
        if !keys::is_valid(event.key) {
            debug!(key = event.key, "event for unknown key ignored");
            return Outcome::Ignored;
        }
        match event.transition {
            KeyTransition::Pressed => self.on_press(event.key, now),
            KeyTransition::Released => self.on_release(event.key),
        }
    }

    fn on_press(&mut self, key: u8, now: Duration) -> Outcome {
        if self.screensaver.is_active() {
            if key != keys::WAKE_KEY {
                return Outcome::Ignored;
            }
            info!("woken by key press");
            self.screensaver.set_active(false);
            self.last_activity = now;
            self.select_layer(0);
            self.leds.set_color(key, Color::SELECTED_LAYER);
            panel::flash_confirm(key, &mut self.leds, &mut self.delay);
            return Outcome::Woke;
        }

        if let Some(target) = keys::nav_layer(key) {
            self.last_activity = now;
            let layer = self.select_layer(target);
            // A clamped press lights the key of the layer actually shown.
            let shown = keys::nav_key_for_layer(layer).unwrap_or(key);
            self.leds.set_color(shown, Color::SELECTED_LAYER);
            panel::flash_confirm(shown, &mut self.leds, &mut self.delay);
            return Outcome::LayerSelected(layer);
        }

        if self.registry.get_action(self.current_layer, key).is_none() {
            return Outcome::Ignored;
        }

        self.last_activity = now;
        match self.run_macro(key) {
            Ok(()) => {
                if !self.screensaver.is_active() {
                    panel::flash_confirm(key, &mut self.leds, &mut self.delay);
                }
                Outcome::Executed(true)
            }
            Err(e) => {
                warn!(key, layer = self.current_layer, error = %e, "macro failed");
                panel::flash_failure(key, &mut self.leds, &mut self.delay);
                Outcome::Executed(false)
            }
        }
    }

    fn run_macro(&mut self, key: u8) -> Result<(), MacroError> {
        let Self {
            registry,
            executor,
            screensaver,
            leds,
            hid,
            delay,
            current_layer,
            rng,
            ..
        } = self;

        let Some(action) = registry.get_action(*current_layer, key) else {
            return Ok(());
        };
        let mut ops = PanelOps {
            registry: &*registry,
            leds,
            screensaver,
            current_layer,
            rng,
        };
        executor.execute(&action.kind, hid, delay, &mut ops)
    }

    fn on_release(&mut self, key: u8) -> Outcome {
        if self.screensaver.is_active() {
            return Outcome::Ignored;
        }
        if !keys::is_nav_key(key) && self.registry.get_action(self.current_layer, key).is_none() {
            return Outcome::Ignored;
        }
        let color = panel::idle_color(&self.registry, self.current_layer, key);
        self.leds.set_color(key, color);
        Outcome::Released
    }

    /// Starts the screensaver once idle time exceeds the timeout.
    pub fn check_idle(&mut self, now: Duration) {
        if self.screensaver.is_disabled() || self.screensaver.is_active() {
            return;
        }
        if now.saturating_sub(self.last_activity) > self.sleep_timeout {
            info!(idle_s = now.saturating_sub(self.last_activity).as_secs(), "going to sleep");
            self.screensaver.start(&mut self.leds);
        }
    }

    /// Clamps, selects and renders a layer. Returns the layer actually selected.
    pub fn select_layer(&mut self, layer: usize) -> usize {
        let layer = clamp_layer(&self.registry, layer);
        select(&self.registry, &mut self.current_layer, layer, &mut self.leds);
        layer
    }

    /// Swaps in a freshly loaded registry, or keeps the old one on failure.
    /// Either way the load indicator key shows the result.
    pub fn apply_reload(&mut self, result: Result<Registry, LoadError>) {
        match result {
            Ok(registry) => {
                info!(layers = registry.layer_count(), "macros reloaded");
                self.registry = registry;
                self.current_layer = clamp_layer(&self.registry, self.current_layer);
                if !self.screensaver.is_active() {
                    panel::render_layer(&self.registry, self.current_layer, &mut self.leds);
                }
                self.leds.set_color(keys::LOAD_INDICATOR_KEY, Color::GREEN);
            }
            Err(e) => {
                warn!(error = %e, "macro reload failed; keeping previous macros");
                self.leds.set_color(keys::LOAD_INDICATOR_KEY, Color::RED);
            }
        }
    }
}

fn clamp_layer(registry: &Registry, layer: usize) -> usize {
    layer.min(registry.layer_count().saturating_sub(1))
}

fn select(registry: &Registry, current: &mut usize, layer: usize, leds: &mut dyn LedSink) {
    if *current != layer {
        info!(layer, name = registry.layer_name(layer).unwrap_or_default(), "layer selected");
    }
    *current = layer;
    panel::render_layer(registry, layer, leds);
}

/// Controller operations reachable from `custom` macros.
struct PanelOps<'a, L> {
    registry: &'a Registry,
    leds: &'a mut L,
    screensaver: &'a mut Screensaver,
    current_layer: &'a mut usize,
    rng: &'a mut SmallRng,
}

impl<L: LedSink> CustomHandler for PanelOps<'_, L> {
    fn run(&mut self, op: CustomOp, delay: &mut dyn Delay) -> Result<(), MacroError> {
        match op {
            CustomOp::StartScreensaver => self.screensaver.start(&mut *self.leds),
            CustomOp::ToggleScreensaverDisabled => {
                if self.screensaver.toggle_disabled() {
                    select(self.registry, self.current_layer, 0, &mut *self.leds);
                } else {
                    self.screensaver.start(&mut *self.leds);
                }
            }
            CustomOp::SwitchLayer(layer) => {
                let layer = clamp_layer(self.registry, layer);
                select(self.registry, self.current_layer, layer, &mut *self.leds);
            }
            CustomOp::RollDie => {
                let face = panel::roll_die(&mut *self.rng, &mut *self.leds, delay);
                debug!(face, "die rolled");
            }
        }
        Ok(())
    }
}
