use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::{
        errors::{ControlError, Result},
        utils::{ensure_dir, write_atomic, PathResolver},
    },
    currency::{CurrencyCode, LocaleConfig},
    domain::{period::parse_timezone, StatusThresholds},
};

const DEFAULT_TOP_N: usize = 3;

/// User preferences persisted under the application directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// Fallback IANA zone for controls and reports that carry none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    pub thresholds: StatusThresholds,
    /// How many controls the at-risk view lists.
    pub top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            timezone: None,
            thresholds: StatusThresholds::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Config {
    pub fn currency_code(&self) -> CurrencyCode {
        CurrencyCode::new(&self.currency)
    }

    pub fn locale_config(&self) -> LocaleConfig {
        LocaleConfig::for_tag(&self.locale)
    }

    /// Rejects values the services cannot work with.
    pub fn validate(&self) -> Result<()> {
        let StatusThresholds {
            warning_pct,
            danger_pct,
        } = self.thresholds;
        if !warning_pct.is_finite() || !danger_pct.is_finite() || warning_pct > danger_pct {
            return Err(ControlError::ConfigError(format!(
                "warning threshold {warning_pct} must not exceed danger threshold {danger_pct}"
            )));
        }
        if self.top_n == 0 {
            return Err(ControlError::ConfigError("top_n must be at least 1".into()));
        }
        parse_timezone(self.timezone.as_deref())
            .map_err(|err| ControlError::ConfigError(err.to_string()))?;
        Ok(())
    }

    /// Applies a `key=value` update coming from the CLI.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |what: &str| ControlError::ConfigError(format!("invalid {what}: {value}"));
        match key {
            "locale" => self.locale = value.trim().to_string(),
            "currency" => self.currency = CurrencyCode::new(value.trim()).as_str().to_string(),
            "timezone" => {
                let trimmed = value.trim();
                self.timezone = if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                };
            }
            "warning_pct" => {
                self.thresholds.warning_pct = value.parse().map_err(|_| invalid("warning_pct"))?
            }
            "danger_pct" => {
                self.thresholds.danger_pct = value.parse().map_err(|_| invalid("danger_pct"))?
            }
            "top_n" => self.top_n = value.parse().map_err(|_| invalid("top_n"))?,
            other => {
                return Err(ControlError::ConfigError(format!(
                    "unknown configuration key `{other}`"
                )))
            }
        }
        self.validate()
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    /// Stored config, or the defaults when nothing was saved yet.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)
            .map_err(|err| ControlError::ConfigError(format!("{}: {err}", self.path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), "saved configuration");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_returns_defaults_when_missing() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_then_load_keeps_changes() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set("currency", "brl").unwrap();
        config.set("timezone", "America/Sao_Paulo").unwrap();
        config.set("warning_pct", "75").unwrap();
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.currency, "BRL");
        assert_eq!(loaded.timezone.as_deref(), Some("America/Sao_Paulo"));
        assert_eq!(loaded.thresholds.warning_pct, 75.0);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"locale":"pt-BR"}"#).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.locale, "pt-BR");
        assert_eq!(loaded.top_n, DEFAULT_TOP_N);
    }

    #[test]
    fn rejects_inverted_thresholds_and_unknown_keys() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("warning_pct", "120"),
            Err(ControlError::ConfigError(_))
        ));
        assert!(config.set("theme", "dark").is_err());
        assert!(Config {
            timezone: Some("Mars/Olympus".into()),
            ..Config::default()
        }
        .validate()
        .is_err());
    }
}
