//! Runtime configuration for the core.
//!
//! # Responsibility
//! - Resolve database and log locations from the environment.
//! - Hold the tunable scheduling constants.
//!
//! # Invariants
//! - A constructed `SchedulerConfig` always satisfies
//!   `1 <= floor < ceiling` and `1 < hard_multiplier < easy_multiplier`.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "MEMOBOT_DB_PATH";
pub const ENV_LOG_DIR: &str = "MEMOBOT_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "MEMOBOT_LOG_LEVEL";

const DATA_DIR_NAME: &str = ".memobot";
const DB_FILE_NAME: &str = "db.sqlite";
const LOG_DIR_NAME: &str = "logs";

pub const DEFAULT_MIN_INTERVAL_DAYS: u32 = 1;
pub const DEFAULT_HARD_MULTIPLIER: f64 = 1.2;
pub const DEFAULT_EASY_MULTIPLIER: f64 = 2.5;
pub const DEFAULT_MAX_INTERVAL_DAYS: u32 = 36_500;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidScheduler(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidScheduler(details) => write!(f, "invalid scheduler config: {details}"),
        }
    }
}

impl Error for ConfigError {}

/// Tunable scheduling constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    min_interval_days: u32,
    hard_multiplier: f64,
    easy_multiplier: f64,
    max_interval_days: u32,
}

impl SchedulerConfig {
    /// Builds a validated scheduler configuration.
    ///
    /// # Errors
    /// Returns `InvalidScheduler` when the floor is zero, the ceiling does not
    /// leave room above the floor, or multipliers are not `1 < hard < easy`.
    pub fn new(
        min_interval_days: u32,
        hard_multiplier: f64,
        easy_multiplier: f64,
        max_interval_days: u32,
    ) -> Result<Self, ConfigError> {
        if min_interval_days == 0 {
            return Err(ConfigError::InvalidScheduler(
                "min_interval_days must be at least 1".to_string(),
            ));
        }
        if max_interval_days <= min_interval_days {
            return Err(ConfigError::InvalidScheduler(format!(
                "max_interval_days {max_interval_days} must exceed min_interval_days {min_interval_days}"
            )));
        }
        if !hard_multiplier.is_finite() || hard_multiplier <= 1.0 {
            return Err(ConfigError::InvalidScheduler(format!(
                "hard_multiplier {hard_multiplier} must be greater than 1"
            )));
        }
        if !easy_multiplier.is_finite() || easy_multiplier <= hard_multiplier {
            return Err(ConfigError::InvalidScheduler(format!(
                "easy_multiplier {easy_multiplier} must be greater than hard_multiplier {hard_multiplier}"
            )));
        }

        Ok(Self {
            min_interval_days,
            hard_multiplier,
            easy_multiplier,
            max_interval_days,
        })
    }

    pub fn min_interval_days(&self) -> u32 {
        self.min_interval_days
    }

    pub fn hard_multiplier(&self) -> f64 {
        self.hard_multiplier
    }

    pub fn easy_multiplier(&self) -> f64 {
        self.easy_multiplier
    }

    pub fn max_interval_days(&self) -> u32 {
        self.max_interval_days
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_interval_days: DEFAULT_MIN_INTERVAL_DAYS,
            hard_multiplier: DEFAULT_HARD_MULTIPLIER,
            easy_multiplier: DEFAULT_EASY_MULTIPLIER,
            max_interval_days: DEFAULT_MAX_INTERVAL_DAYS,
        }
    }
}

/// Process-level settings for binaries embedding the core.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub scheduler: SchedulerConfig,
}

impl CoreConfig {
    /// Resolves settings from process environment variables.
    ///
    /// Falls back to `$HOME/.memobot/db.sqlite` and `$HOME/.memobot/logs`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fetch = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_dir = fetch("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DATA_DIR_NAME);

        Self {
            db_path: fetch(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(DB_FILE_NAME)),
            log_dir: fetch(ENV_LOG_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(LOG_DIR_NAME)),
            log_level: fetch(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            scheduler: SchedulerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, SchedulerConfig, ENV_DB_PATH, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_live_under_home_data_dir() {
        let config = CoreConfig::from_lookup(lookup_from(&[("HOME", "/home/reader")]));
        assert_eq!(
            config.db_path,
            PathBuf::from("/home/reader/.memobot/db.sqlite")
        );
        assert_eq!(config.log_dir, PathBuf::from("/home/reader/.memobot/logs"));
        assert_eq!(config.scheduler, SchedulerConfig::default());
    }

    #[test]
    fn env_overrides_take_precedence_and_blank_is_ignored() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            ("HOME", "/home/reader"),
            (ENV_DB_PATH, " /tmp/review.sqlite "),
            (ENV_LOG_LEVEL, "   "),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/tmp/review.sqlite"));
        assert_eq!(config.log_level, crate::logging::default_log_level());
    }

    #[test]
    fn scheduler_config_rejects_inverted_multipliers() {
        assert!(matches!(
            SchedulerConfig::new(1, 2.5, 1.2, 100),
            Err(ConfigError::InvalidScheduler(_))
        ));
        assert!(SchedulerConfig::new(1, 1.0, 2.0, 100).is_err());
        assert!(SchedulerConfig::new(0, 1.2, 2.5, 100).is_err());
        assert!(SchedulerConfig::new(5, 1.2, 2.5, 5).is_err());
        assert!(SchedulerConfig::new(1, 1.2, f64::NAN, 100).is_err());
    }
}
