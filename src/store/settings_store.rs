use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::config::options::Settings;
use crate::config::paths;
use crate::error::{Error, Result};

/// Loads settings from `explicit`, or from the per-user config file when no
/// path is given. Only a missing per-user file falls back to defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    match explicit {
        Some(path) => read_settings(path),
        None => {
            let Some(path) = paths::settings_path() else {
                return Ok(Settings::default());
            };
            if !path.exists() {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Settings::default());
            }
            read_settings(&path)
        }
    }
}

fn read_settings(path: &Path) -> Result<Settings> {
    let data = fs::read_to_string(path).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        reason: match e.kind() {
            ErrorKind::NotFound => "file not found".to_string(),
            _ => e.to_string(),
        },
    })?;
    let settings = serde_json::from_str(&data).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}
