use std::fmt;

use app_core::{Color, Delay, LedSink};
use device::{NetworkError, NetworkSync};
use storage::{ConfigSource, Registry};
use tracing::{info, warn};

/// Time each milestone key shows its result.
pub const STEP_MS: u64 = 250;
/// Pause after the last milestone before the first layer is drawn.
pub const SETTLE_MS: u64 = 500;
/// Extra clock-sync attempts after the first failure.
pub const CLOCK_SYNC_RETRIES: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStep {
    ConnectNetwork,
    SyncClock,
    LoadMacros,
    Ready,
}

impl BootStep {
    pub const ALL: [BootStep; 4] = [
        Self::ConnectNetwork,
        Self::SyncClock,
        Self::LoadMacros,
        Self::Ready,
    ];

    /// Milestone key lit while this step runs.
    pub fn key(self) -> u8 {
        match self {
            Self::ConnectNetwork => 0,
            Self::SyncClock => 4,
            Self::LoadMacros => 8,
            Self::Ready => 12,
        }
    }
}

impl fmt::Display for BootStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConnectNetwork => "connect network",
            Self::SyncClock => "sync clock",
            Self::LoadMacros => "load macros",
            Self::Ready => "ready",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Ok,
    Failed(String),
    Skipped,
}

impl StepOutcome {
    pub fn color(&self) -> Color {
        match self {
            Self::Ok => Color::GREEN,
            Self::Failed(_) => Color::RED,
            Self::Skipped => Color::OFF,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

#[derive(Debug)]
pub struct BootReport {
    pub steps: Vec<(BootStep, StepOutcome)>,
    /// Loaded macros, or a single empty layer when loading failed.
    pub registry: Registry,
}

impl BootReport {
    pub fn outcome(&self, step: BootStep) -> Option<&StepOutcome> {
        self.steps.iter().find(|(s, _)| *s == step).map(|(_, o)| o)
    }

    pub fn clock_synced(&self) -> bool {
        self.outcome(BootStep::SyncClock).is_some_and(StepOutcome::is_ok)
    }
}

/// Start-up animation with the real work folded into it: each milestone key
/// lights while its step runs, then shows green, red or nothing.
pub struct BootSequencer<'a> {
    network: Option<&'a mut dyn NetworkSync>,
    macros: &'a dyn ConfigSource,
}

impl<'a> BootSequencer<'a> {
    pub fn new(network: Option<&'a mut dyn NetworkSync>, macros: &'a dyn ConfigSource) -> Self {
        Self { network, macros }
    }

    pub fn run(mut self, leds: &mut dyn LedSink, delay: &mut dyn Delay) -> BootReport {
        let mut steps: Vec<(BootStep, StepOutcome)> = Vec::with_capacity(BootStep::ALL.len());
        let mut registry: Option<Registry> = None;
        let mut connected = false;

        for step in BootStep::ALL {
            let key = step.key();
            leds.set_color(key, Color::SELECTED_LAYER);

            let outcome = match step {
                BootStep::ConnectNetwork => {
                    let outcome = self.connect();
                    connected = outcome.is_ok();
                    outcome
                }
                // Clock sync needs the network.
                BootStep::SyncClock if connected => self.sync_clock(),
                BootStep::SyncClock => StepOutcome::Skipped,
                BootStep::LoadMacros => match Registry::load(self.macros) {
                    Ok(loaded) => {
                        registry = Some(loaded);
                        StepOutcome::Ok
                    }
                    Err(e) => StepOutcome::Failed(e.to_string()),
                },
                BootStep::Ready => StepOutcome::Ok,
            };

            match &outcome {
                StepOutcome::Failed(reason) => warn!(%step, %reason, "boot step failed"),
                other => info!(%step, outcome = ?other, "boot step"),
            }

            leds.set_color(key, outcome.color());
            delay.delay_ms(STEP_MS);
            leds.set_color(key, Color::UNSELECTED_LAYER);
            steps.push((step, outcome));
        }

        delay.delay_ms(SETTLE_MS);

        BootReport {
            steps,
            registry: registry.unwrap_or_else(Registry::placeholder),
        }
    }

    fn connect(&mut self) -> StepOutcome {
        let Some(net) = self.network.as_deref_mut() else {
            return StepOutcome::Skipped;
        };
        outcome_of(net.connect())
    }

    fn sync_clock(&mut self) -> StepOutcome {
        let Some(net) = self.network.as_deref_mut() else {
            return StepOutcome::Skipped;
        };

        let mut attempt = 0;
        loop {
            match net.sync_clock() {
                Ok(()) => return StepOutcome::Ok,
                Err(e) if attempt < CLOCK_SYNC_RETRIES && !matches!(e, NetworkError::NotConfigured) => {
                    attempt += 1;
                    warn!(error = %e, attempt, "clock sync failed; retrying");
                }
                Err(e) => return outcome_of(Err(e)),
            }
        }
    }
}

fn outcome_of(result: Result<(), NetworkError>) -> StepOutcome {
    match result {
        Ok(()) => StepOutcome::Ok,
        Err(NetworkError::NotConfigured) => StepOutcome::Skipped,
        Err(e) => StepOutcome::Failed(e.to_string()),
    }
}
