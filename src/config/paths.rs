use directories::ProjectDirs;
use std::path::PathBuf;

const SETTINGS_FILE: &str = "config.json";

pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "tb2sieve").map(|d| d.config_dir().to_path_buf())
}

/// Default location of the settings file, if the platform has a config dir.
pub fn settings_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(SETTINGS_FILE))
}
