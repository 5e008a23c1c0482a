mod input;

use std::path::PathBuf;

use actions::HidOutput;
use app_core::ThreadDelay;
use device::{ChannelKeySource, ClockOffset, HttpClockSync, KeyEvent, NetworkSync, SystemClock, WallClock};
use input::Line;
use runtime::{BootSequencer, Controller, LogLedSink};
use screensaver::Screensaver;
use storage::{ConfigSource, JsonFile, Registry, Settings};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use transport_hid::{GadgetHidOutput, LogHidOutput};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "init" => cmd_init(&args),
        "validate" => cmd_validate(&args),
        "layers" => cmd_layers(&args),
        "run" => cmd_run(&args).await,
        other => anyhow::bail!("unknown command: {other} (run `keypad help`)"),
    }
}

fn print_help() {
    eprintln!(
        r#"keypad: 4x4 macro keypad engine

USAGE:
  keypad init [--force]
  keypad validate [macros.json]
  keypad layers [macros.json]
  keypad run [--settings <path>] [--macros <path>] [--keyboard <dev>] [--consumer <dev>] [--offline]

Without a macros path the configured file is used, falling back to the
built-in layers.

`run` reads one command per line from stdin:
  press <key> | release <key> | tap <key> | <key>
  wait <ms> | reload | show | quit
HID reports go to --keyboard/--consumer (e.g. /dev/hidg0, /dev/hidg1);
without them output is only logged. RUST_LOG controls verbosity.
"#
    );
}

fn cmd_init(args: &[String]) -> anyhow::Result<()> {
    let force = args.get(2).is_some_and(|a| a == "--force");
    let path = storage::paths::settings_path()?;
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Settings::default().save(&path)?;
    println!("wrote {}", path.display());
    Ok(())
}

fn macro_source(args: &[String]) -> anyhow::Result<Box<dyn ConfigSource + Send + Sync>> {
    match args.get(2) {
        Some(path) => Ok(Box::new(JsonFile(PathBuf::from(path)))),
        None => Ok(Settings::load_default()?.macro_source()),
    }
}

fn cmd_validate(args: &[String]) -> anyhow::Result<()> {
    let source = macro_source(args)?;
    let registry = Registry::load(source.as_ref())
        .map_err(|e| anyhow::anyhow!("{}: {e}", source.describe()))?;
    let macros: usize = registry.layers().iter().map(|l| l.actions.len()).sum();
    println!(
        "ok: {} ({} layers, {} macros)",
        source.describe(),
        registry.layer_count(),
        macros
    );
    Ok(())
}

fn cmd_layers(args: &[String]) -> anyhow::Result<()> {
    let source = macro_source(args)?;
    let registry = Registry::load(source.as_ref())?;
    for (index, layer) in registry.layers().iter().enumerate() {
        let nav = app_core::keys::nav_key_for_layer(index)
            .map(|k| format!("key {k}"))
            .unwrap_or_else(|| "switch_layer only".to_string());
        println!("{index}  {}  ({nav})", layer.name.as_deref().unwrap_or("-"));
        for (key, action) in &layer.actions {
            println!("    {key:>2}  {:<11}  {}", action.color.to_string(), action.kind);
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct RunOptions {
    settings: Option<PathBuf>,
    macros: Option<PathBuf>,
    keyboard: Option<PathBuf>,
    consumer: Option<PathBuf>,
    offline: bool,
}

impl RunOptions {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut opts = Self::default();
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            if flag == "--offline" {
                opts.offline = true;
                i += 1;
                continue;
            }
            let value = args
                .get(i + 1)
                .map(PathBuf::from)
                .ok_or_else(|| anyhow::anyhow!("{flag} requires a value"))?;
            match flag {
                "--settings" => opts.settings = Some(value),
                "--macros" => opts.macros = Some(value),
                "--keyboard" => opts.keyboard = Some(value),
                "--consumer" => opts.consumer = Some(value),
                other => anyhow::bail!("unknown flag for run: {other}"),
            }
            i += 2;
        }
        Ok(opts)
    }
}

/// Messages from the stdin reader that are not key events.
#[derive(Debug, Clone, Copy)]
enum Control {
    Reload,
    Show,
    Quit,
}

async fn cmd_run(args: &[String]) -> anyhow::Result<()> {
    let opts = RunOptions::parse(args.get(2..).unwrap_or_default())?;

    let mut settings = match &opts.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::load_default()?,
    };
    if let Some(path) = opts.macros.clone() {
        settings.macros_path = Some(path);
    }
    if opts.offline {
        settings.network = None;
    }

    let (key_tx, keys) = device::key_channel(64);
    let (control_tx, control_rx) = mpsc::unbounded_channel();
    let handle = tokio::runtime::Handle::current();

    let engine = tokio::task::spawn_blocking(move || run_engine(settings, opts, keys, control_rx, handle));

    read_stdin(key_tx, control_tx).await?;
    engine.await?
}

async fn read_stdin(
    keys: mpsc::Sender<KeyEvent>,
    control: mpsc::UnboundedSender<Control>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let parsed = match input::parse_line(&line) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(%line, error = %e, "ignoring input");
                continue;
            }
        };

        let sent = match parsed {
            Line::Key(event) => keys.send(event).await.is_ok(),
            Line::Tap(key) => {
                keys.send(KeyEvent::pressed(key)).await.is_ok()
                    && keys.send(KeyEvent::released(key)).await.is_ok()
            }
            Line::Wait(ms) => {
                tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
                true
            }
            Line::Reload => control.send(Control::Reload).is_ok(),
            Line::Show => control.send(Control::Show).is_ok(),
            Line::Quit => break,
            Line::Blank => true,
        };
        if !sent {
            // Engine has stopped.
            break;
        }
    }

    let _ = control.send(Control::Quit);
    Ok(())
}

fn open_hid(opts: &RunOptions) -> anyhow::Result<Box<dyn HidOutput + Send>> {
    if opts.keyboard.is_none() && opts.consumer.is_none() {
        info!("no HID endpoints given; dry run");
        return Ok(Box::new(LogHidOutput::new()));
    }
    let hid = GadgetHidOutput::open(opts.keyboard.as_deref(), opts.consumer.as_deref())?;
    Ok(Box::new(hid))
}

fn run_engine(
    settings: Settings,
    opts: RunOptions,
    mut keys: ChannelKeySource,
    mut control: mpsc::UnboundedReceiver<Control>,
    handle: tokio::runtime::Handle,
) -> anyhow::Result<()> {
    let hid = open_hid(&opts)?;
    let mut leds = LogLedSink::new();
    let mut delay = ThreadDelay;

    let offset = ClockOffset::new();
    let clock = SystemClock::new(offset.clone());
    let macros = settings.macro_source();

    let report = match &settings.network {
        Some(net) => {
            let mut sync = HttpClockSync::new(Some(net.time_url.clone()), offset, handle)
                .with_timeouts(net.request_timeout(), net.connect_timeout());
            BootSequencer::new(Some(&mut sync as &mut dyn NetworkSync), macros.as_ref()).run(&mut leds, &mut delay)
        }
        None => BootSequencer::new(None, macros.as_ref()).run(&mut leds, &mut delay),
    };

    let mut screensaver = Screensaver::new(settings.screensaver_config());
    screensaver.set_clock_trusted(report.clock_synced());

    let mut controller = Controller::new(report.registry, screensaver, leds, hid, delay)
        .with_executor(settings.executor()?)
        .with_sleep_timeout(settings.sleep_timeout());
    controller.start(clock.now());
    info!(layers = controller.registry().layer_count(), "keypad ready");

    let mut quitting = false;
    runtime::run_until(&mut controller, &mut keys, &clock, settings.tick(), |controller| {
        if quitting {
            return false;
        }
        while let Ok(cmd) = control.try_recv() {
            match cmd {
                Control::Reload => controller.apply_reload(Registry::load(macros.as_ref())),
                Control::Show => println!("{}\n", controller.leds().describe()),
                // One more tick drains keys sent before the quit.
                Control::Quit => quitting = true,
            }
        }
        true
    });

    info!("keypad stopped");
    Ok(())
}
