#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use actions::{ConsumerCode, HidOutput, KeyCode, OutputError};
use app_core::{Color, Delay, LedSink, TimeOfDay};
use device::{KeyEvent, WallClock};
use runtime::Controller;
use screensaver::{Screensaver, ScreensaverConfig, ScreensaverKind, StarryNight};
use storage::Registry;

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Led(u8, Color),
    ControlCode(ConsumerCode),
    Press(Vec<KeyCode>),
    ReleaseAll,
    Text(String),
    Delay(u64),
}

impl Record {
    pub fn is_led(&self) -> bool {
        matches!(self, Record::Led(..))
    }

    pub fn is_hid(&self) -> bool {
        matches!(
            self,
            Record::ControlCode(_) | Record::Press(_) | Record::ReleaseAll | Record::Text(_)
        )
    }
}

pub type Log = Rc<RefCell<Vec<Record>>>;

pub struct Leds {
    log: Log,
    pub frame: [Color; 16],
}

impl LedSink for Leds {
    fn set_color(&mut self, key: u8, color: Color) {
        self.log.borrow_mut().push(Record::Led(key, color));
        self.frame[usize::from(key)] = color;
    }
}

pub struct Hid {
    log: Log,
    pub fail: Rc<Cell<bool>>,
}

impl Hid {
    fn record(&self, r: Record) -> Result<(), OutputError> {
        if self.fail.get() {
            return Err(OutputError::Disconnected);
        }
        self.log.borrow_mut().push(r);
        Ok(())
    }
}

impl HidOutput for Hid {
    fn send_control_code(&mut self, code: ConsumerCode) -> Result<(), OutputError> {
        self.record(Record::ControlCode(code))
    }

    fn press_combo(&mut self, keys: &[KeyCode]) -> Result<(), OutputError> {
        self.record(Record::Press(keys.to_vec()))
    }

    fn release_all(&mut self) -> Result<(), OutputError> {
        self.record(Record::ReleaseAll)
    }

    fn write_text(&mut self, text: &str) -> Result<(), OutputError> {
        self.record(Record::Text(text.to_string()))
    }
}

pub struct Waits {
    log: Log,
}

impl Delay for Waits {
    fn delay_ms(&mut self, ms: u64) {
        self.log.borrow_mut().push(Record::Delay(ms));
    }
}

#[derive(Default)]
pub struct Clock {
    pub now: Cell<Duration>,
    pub time: Cell<TimeOfDay>,
}

impl Clock {
    pub fn at_secs(secs: u64) -> Self {
        let clock = Self::default();
        clock.now.set(Duration::from_secs(secs));
        clock.time.set(TimeOfDay::new(12, 0, 0));
        clock
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl WallClock for Clock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn time_of_day(&self) -> TimeOfDay {
        self.time.get()
    }
}

pub const MACROS: &str = r#"{
  "layers": [
    { "name": "media",
      "keys": {
        "1": { "type": "control_code", "value": "MUTE", "color": "COLOR_RED" },
        "2": { "type": "sequence", "value": [["GUI", "X"], "U", "S"], "color": "0,0,32" },
        "3": { "type": "custom", "value": { "switch_layer": 2 }, "color": "COLOR_GREY" },
        "5": { "type": "custom", "value": "start_screensaver", "color": "COLOR_BLUE" },
        "6": { "type": "custom", "value": "toggle_screensaver_disabled", "color": [16, 16, 16] },
        "7": { "type": "text", "value": "hi", "color": "COLOR_YELLOW" }
      } },
    { "name": "apps",
      "keys": {
        "1": { "type": "combo", "value": ["CONTROL", "SHIFT", "ESCAPE"], "color": "0,32,0" },
        "6": { "type": "custom", "value": "toggle_screensaver_disabled", "color": [8, 8, 8] },
        "9": { "type": "search", "value": "steam", "color": "0,0,16" }
      } },
    { "name": "fun",
      "keys": {
        "9": { "type": "custom", "value": "roll_die", "color": "COLOR_PURPLE" }
      } }
  ]
}"#;

pub struct Rig {
    pub log: Log,
    pub fail: Rc<Cell<bool>>,
    pub clock: Clock,
    pub controller: Controller<Leds, Hid, Waits>,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_kind(ScreensaverKind::SingleKey)
    }

    pub fn with_kind(kind: ScreensaverKind) -> Self {
        let log: Log = Rc::default();
        let fail = Rc::new(Cell::new(false));
        let registry = Registry::from_json_str(MACROS).unwrap();
        let screensaver = Screensaver::with_starry_night(
            ScreensaverConfig {
                kind,
                tz_offset_h: 0,
                quiet_hours: None,
            },
            StarryNight::with_seed(5),
        );
        let controller = Controller::new(
            registry,
            screensaver,
            Leds {
                log: log.clone(),
                frame: [Color::OFF; 16],
            },
            Hid {
                log: log.clone(),
                fail: fail.clone(),
            },
            Waits { log: log.clone() },
        )
        .with_sleep_timeout(Duration::from_secs(60))
        .with_rng_seed(11);

        let clock = Clock::at_secs(100);
        let mut rig = Self {
            log,
            fail,
            clock,
            controller,
        };
        rig.controller.start(rig.clock.now());
        rig.clear();
        rig
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn records(&self) -> Vec<Record> {
        self.log.borrow().clone()
    }

    pub fn frame(&self) -> [Color; 16] {
        self.controller.leds().frame
    }

    pub fn feed(&mut self, events: &[KeyEvent]) {
        let mut source: VecDeque<KeyEvent> = events.iter().copied().collect();
        self.controller.tick(&mut source, &self.clock);
    }

    pub fn tap(&mut self, key: u8) {
        self.feed(&[KeyEvent::pressed(key)]);
        self.feed(&[KeyEvent::released(key)]);
    }

    pub fn idle_tick(&mut self) {
        self.feed(&[]);
    }
}
