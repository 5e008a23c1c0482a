use std::path::PathBuf;

use directories::ProjectDirs;

pub const SETTINGS_FILE: &str = "settings.json";
pub const MACROS_FILE: &str = "macros.json";

pub fn project_dirs() -> anyhow::Result<ProjectDirs> {
    ProjectDirs::from("io", "github", "keypad-macros")
        .ok_or_else(|| anyhow::anyhow!("unable to determine platform config directories"))
}

/// Directory holding `settings.json` and the user's `macros.json`.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn settings_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join(SETTINGS_FILE))
}

pub fn default_macros_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join(MACROS_FILE))
}
