use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use actions::{Executor, KeyCode, Timing};
use screensaver::{QuietHours, ScreensaverConfig, ScreensaverKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::macros::{Builtin, ConfigSource, JsonFile};
use crate::paths;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sleep_timeout_s: u64,
    pub screensaver: ScreensaverKind,
    /// Hours added to the synced UTC clock for the face and quiet hours.
    pub tz_offset_h: i8,
    /// `null` turns quiet hours off.
    pub quiet_hours: Option<QuietHours>,
    pub macros_path: Option<PathBuf>,
    pub network: Option<NetworkSettings>,
    pub tick_ms: u64,
    /// Delays inside sequence and search macros.
    pub timing: Timing,
    /// Key tapped by `search` macros to open the launcher.
    pub launcher_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Any HTTP(S) endpoint; only its `Date` response header is used.
    pub time_url: String,
    /// Upper bound for one whole request, boot waits at most this per attempt.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_connect_timeout_ms() -> u64 {
    3000
}

impl NetworkSettings {
    pub fn new(time_url: impl Into<String>) -> Self {
        Self {
            time_url: time_url.into(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sleep_timeout_s: 60,
            screensaver: ScreensaverKind::default(),
            tz_offset_h: 0,
            quiet_hours: Some(QuietHours::default()),
            macros_path: None,
            network: None,
            tick_ms: 10,
            timing: Timing::default(),
            launcher_key: "GUI".to_string(),
        }
    }
}

impl Settings {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file; using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let settings: Self = serde_json::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads from the platform config directory.
    pub fn load_default() -> anyhow::Result<Self> {
        Self::load(&paths::settings_path()?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(self)?;
        {
            let mut f = fs::File::create(&tmp_path)?;
            f.write_all(&json)?;
            f.write_all(b"\n")?;
            f.sync_all()?;
        }

        if cfg!(windows) && path.exists() {
            let _ = fs::remove_file(path);
        }
        fs::rename(tmp_path, path)?;
        info!(path = %path.display(), "settings saved");
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.tick_ms == 0 {
            anyhow::bail!("tick_ms must be at least 1");
        }
        if !(-12..=14).contains(&self.tz_offset_h) {
            anyhow::bail!("tz_offset_h out of range: {}", self.tz_offset_h);
        }
        if let Some(net) = &self.network {
            if net.request_timeout_ms == 0 || net.connect_timeout_ms == 0 {
                anyhow::bail!("network timeouts must be at least 1 ms");
            }
        }
        self.launcher_key.parse::<KeyCode>()?;
        if let Some(q) = self.quiet_hours {
            if q.start_hour > 23 || q.end_hour > 23 {
                anyhow::bail!("quiet hours must be 0..=23");
            }
        }
        Ok(())
    }

    pub fn sleep_timeout(&self) -> Duration {
        Duration::from_secs(self.sleep_timeout_s)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Macro executor using the configured timing and launcher key.
    pub fn executor(&self) -> anyhow::Result<Executor> {
        let launcher = self.launcher_key.parse::<KeyCode>()?;
        Ok(Executor::new(self.timing).with_launcher_key(launcher))
    }

    pub fn screensaver_config(&self) -> ScreensaverConfig {
        ScreensaverConfig {
            kind: self.screensaver,
            tz_offset_h: self.tz_offset_h,
            quiet_hours: self.quiet_hours,
        }
    }

    /// Explicit `macros_path`, else `macros.json` in the config directory if
    /// present, else the built-in table.
    pub fn macro_source(&self) -> Box<dyn ConfigSource + Send + Sync> {
        if let Some(path) = &self.macros_path {
            return Box::new(JsonFile(path.clone()));
        }
        match paths::default_macros_path() {
            Ok(path) if path.exists() => Box::new(JsonFile(path)),
            _ => Box::new(Builtin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.sleep_timeout(), Duration::from_secs(60));
        assert_eq!(settings.tick(), Duration::from_millis(10));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "screensaver": "clock", "tz_offset_h": -5, "quiet_hours": null }"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.screensaver, ScreensaverKind::Clock);
        assert_eq!(settings.quiet_hours, None);
        assert_eq!(settings.sleep_timeout_s, 60);

        let config = settings.screensaver_config();
        assert_eq!(config.kind, ScreensaverKind::Clock);
        assert_eq!(config.tz_offset_h, -5);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "tick_ms": 0 }"#).unwrap();
        assert!(Settings::load(&path).is_err());
        fs::write(&path, r#"{ "quiet_hours": { "start_hour": 25, "end_hour": 1 } }"#).unwrap();
        assert!(Settings::load(&path).is_err());
        fs::write(&path, r#"{ "launcher_key": "HYPER" }"#).unwrap();
        assert!(Settings::load(&path).is_err());
        fs::write(
            &path,
            r#"{ "network": { "time_url": "http://x", "request_timeout_ms": 0 } }"#,
        )
        .unwrap();
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn network_timeouts_default_when_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "network": { "time_url": "http://time.local" } }"#).unwrap();
        let net = Settings::load(&path).unwrap().network.unwrap();
        assert_eq!(net.request_timeout(), Duration::from_secs(5));
        assert_eq!(net.connect_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn executor_takes_configured_timing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "timing": { "search_open_ms": 350 }, "launcher_key": "ALT" }"#,
        )
        .unwrap();
        let settings = Settings::load(&path).unwrap();
        let timing = settings.executor().unwrap().timing();
        assert_eq!(timing.search_open_ms, 350);
        assert_eq!(timing.search_results_ms, Timing::default().search_results_ms);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            network: Some(NetworkSettings::new("https://example.org")),
            macros_path: Some(dir.path().join("macros.json")),
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn explicit_macros_path_wins() {
        let settings = Settings {
            macros_path: Some(PathBuf::from("/tmp/mine.json")),
            ..Settings::default()
        };
        assert_eq!(settings.macro_source().describe(), "/tmp/mine.json");
    }
}
