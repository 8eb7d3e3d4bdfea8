//! Configuration file loading.
//!
//! The file is optional. Without `--config` the daemon looks for
//! `<config dir>/validator-watch/config.json` and falls back to defaults when
//! it is absent; an explicitly named file must exist.

use std::fs;
use std::path::{Path, PathBuf};

use validator_watch_types::{ConfigError, MonitorConfig};

const CONFIG_DIR: &str = "validator-watch";
const CONFIG_FILE: &str = "config.json";

/// Platform default location, e.g. `~/.config/validator-watch/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load configuration from `path`, or from the default location when `None`.
pub fn load_config(path: Option<&Path>) -> Result<MonitorConfig, ConfigError> {
    match path {
        Some(path) => read_config_file(path),
        None => match default_config_path() {
            Some(path) if path.exists() => read_config_file(&path),
            _ => Ok(MonitorConfig::default()),
        },
    }
}

fn read_config_file(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(ConfigError::NotFound { path: shown });
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::from_io_error(&shown, &e))?;
    let config: MonitorConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))?;

    tracing::debug!("Loaded config from {}", shown);
    Ok(config)
}
