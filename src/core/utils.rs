use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::core::errors::ControlError;

const DEFAULT_DIR_NAME: &str = ".spend_control";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const SNAPSHOT_FILE: &str = "snapshot.json";
const HOME_ENV: &str = "SPEND_CONTROL_HOME";

/// Resolves the on-disk layout used by the CLI.
pub struct PathResolver;

impl PathResolver {
    /// Application data directory, defaulting to `~/.spend_control`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn config_dir_in(base: &Path) -> PathBuf {
        base.join(CONFIG_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_FILE)
    }

    /// Default snapshot location when the CLI is not given `--snapshot`.
    pub fn snapshot_file_in(base: &Path) -> PathBuf {
        base.join(SNAPSHOT_FILE)
    }
}

pub fn ensure_dir(path: &Path) -> Result<(), ControlError> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Writes `data` next to `path` and renames it into place.
pub fn write_atomic(path: &Path, data: &str) -> Result<(), ControlError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
