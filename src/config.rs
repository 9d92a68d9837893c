use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::acwr::AcwrConfig;
use crate::error::FatigueError;
use crate::logging::LogConfig;
use crate::rhr::RhrConfig;
use crate::srpe::SrpeConfig;
use crate::wellness::WellnessConfig;

/// Layout version written to new config files
pub const CONFIG_VERSION: u32 = 1;

/// Overrides the directory holding the config file and default database
pub const HOME_ENV_VAR: &str = "FATIGUE_GUARD_HOME";

/// Everything read from `config.toml`; every section may be omitted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub metrics: MetricsConfig,
    pub logging: LogConfig,
    pub store: StoreSettings,
    pub history: HistorySettings,
}

/// Thresholds and windows of all four metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub acwr: AcwrConfig,
    #[serde(default)]
    pub rhr: RhrConfig,
    #[serde(default)]
    pub wellness: WellnessConfig,
    #[serde(default)]
    pub srpe: SrpeConfig,
}

/// SQLite record store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Database file path
    pub database_path: PathBuf,
}

/// ACWR trend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Days shown by the history command (default: 14)
    pub default_days: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            version: CONFIG_VERSION,
            metrics: MetricsConfig::default(),
            logging: LogConfig::default(),
            store: StoreSettings::default(),
            history: HistorySettings::default(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            database_path: AppConfig::config_dir().join("records.db"),
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        HistorySettings { default_days: 14 }
    }
}

impl MetricsConfig {
    /// Reject thresholds that would make bands overlap or invert
    pub fn validate(&self) -> std::result::Result<(), FatigueError> {
        let acwr = &self.acwr;
        if acwr.acute_window_days == 0 || acwr.chronic_window_days == 0 {
            return Err(config_error("ACWR windows must be at least one day"));
        }
        if acwr.acute_window_days > acwr.chronic_window_days {
            return Err(config_error(format!(
                "ACWR acute window ({} days) is longer than the chronic window ({} days)",
                acwr.acute_window_days, acwr.chronic_window_days
            )));
        }
        if acwr.sweet_spot_min > acwr.sweet_spot_max {
            return Err(config_error(format!(
                "ACWR sweet spot floor {} is above its ceiling {}",
                acwr.sweet_spot_min, acwr.sweet_spot_max
            )));
        }
        if acwr.sweet_spot_max > acwr.high_risk_threshold || acwr.high_risk_threshold > acwr.very_high_risk_threshold {
            return Err(config_error(
                "ACWR thresholds must satisfy sweet_spot_max <= high_risk_threshold <= very_high_risk_threshold",
            ));
        }

        let rhr = &self.rhr;
        if rhr.baseline_window_days == 0 {
            return Err(config_error("RHR baseline window must be at least one day"));
        }
        if rhr.min_baseline_days > rhr.baseline_window_days {
            return Err(config_error(format!(
                "RHR needs {} baseline days but the window only spans {}",
                rhr.min_baseline_days, rhr.baseline_window_days
            )));
        }
        if !(rhr.green_max <= rhr.yellow_max && rhr.yellow_max <= rhr.orange_max) {
            return Err(config_error("RHR bands must satisfy green_max <= yellow_max <= orange_max"));
        }

        if self.wellness.yellow_min > self.wellness.green_min {
            return Err(config_error(format!(
                "Wellness yellow floor {} is above the green floor {}",
                self.wellness.yellow_min, self.wellness.green_min
            )));
        }

        if self.srpe.yellow_min > self.srpe.red_min {
            return Err(config_error(format!(
                "sRPE yellow floor {} is above the red floor {}",
                self.srpe.yellow_min, self.srpe.red_min
            )));
        }

        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> FatigueError {
    FatigueError::Configuration(message.into())
}

impl AppConfig {
    /// Parse and validate a TOML config file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

        if config.version > CONFIG_VERSION {
            bail!(
                "{} was written by a newer release (config version {}, supported {})",
                path.display(),
                config.version,
                CONFIG_VERSION
            );
        }
        config
            .metrics
            .validate()
            .with_context(|| format!("Invalid metric thresholds in {}", path.display()))?;

        Ok(config)
    }

    /// Write the config as TOML, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, content).with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Directory holding the config file and the default database
    ///
    /// `$FATIGUE_GUARD_HOME` when set, otherwise `~/.fatigue-guard`.
    pub fn config_dir() -> PathBuf {
        match std::env::var_os(HOME_ENV_VAR) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".fatigue-guard"),
        }
    }

    pub fn default_config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// The default config file, or built-in defaults if there is none
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }
}
