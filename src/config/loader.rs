//! Locating and reading the configuration file.

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ConfigError;

use super::types::Configuration;

/// Environment variable that overrides the asset directory.
pub const HOME_ENV_VAR: &str = "AUGUR_HOME";

/// File name of the configuration document inside the asset directory.
pub const CONFIG_FILE_NAME: &str = "ai_config.yml";

/// Directory (sibling to the config file) holding one template per task.
pub const PROMPTS_DIR_NAME: &str = "prompts";

/// Directory holding `ai_config.yml` and `prompts/`.
///
/// Resolved relative to the installed binary rather than the working
/// directory, so CI steps behave the same wherever they `cd`.
pub fn asset_dir() -> PathBuf {
    if let Ok(dir) = env::var(HOME_ENV_VAR)
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }

    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config")
}

/// Load the configuration from the default asset directory.
pub fn load() -> Configuration {
    load_from_dir(&asset_dir())
}

/// Load `ai_config.yml` from `dir`, substituting the built-in default on
/// any failure.
pub fn load_from_dir(dir: &Path) -> Configuration {
    let path = dir.join(CONFIG_FILE_NAME);

    if !path.exists() {
        debug!(path = %path.display(), "No AI config file, using built-in defaults");
        return Configuration::builtin();
    }

    match read_config(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}. Using built-in defaults", e);
            Configuration::builtin()
        }
    }
}

fn read_config(path: &Path) -> Result<Configuration, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
