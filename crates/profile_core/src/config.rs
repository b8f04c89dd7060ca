//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Logging stays off unless `PROFILE_LOG_DIR` names an absolute path.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "PROFILE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "PROFILE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "PROFILE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "profile_core.sqlite3";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    RelativeLogDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeLogDir(value) => {
                write!(f, "{LOG_DIR_ENV} must be an absolute path, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings for `logging::init_logging`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: PathBuf,
}

/// Settings for the reference store and its callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileConfig {
    pub db_path: PathBuf,
    /// `None` disables file logging.
    pub logging: Option<LoggingConfig>,
}

impl ProfileConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which returns raw variable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let logging = match read(LOG_DIR_ENV) {
            Some(dir) => {
                let log_dir = PathBuf::from(&dir);
                if !log_dir.is_absolute() {
                    return Err(ConfigError::RelativeLogDir(dir));
                }
                Some(LoggingConfig {
                    level: read(LOG_LEVEL_ENV)
                        .unwrap_or_else(|| default_log_level().to_string()),
                    log_dir,
                })
            }
            None => None,
        };

        Ok(Self { db_path, logging })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ProfileConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let config = ProfileConfig::from_lookup(lookup(&[(DB_PATH_ENV, "  ")])).unwrap();
        assert!(config.db_path.ends_with("profile_core.sqlite3"));
        assert_eq!(config.logging, None);
    }

    #[test]
    fn explicit_values_are_used() {
        let log_dir = std::env::temp_dir().join("profile-logs");
        let log_dir_text = log_dir.to_str().unwrap().to_string();
        let config = ProfileConfig::from_lookup(lookup(&[
            (DB_PATH_ENV, "/data/profiles.sqlite3"),
            (LOG_DIR_ENV, log_dir_text.as_str()),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/data/profiles.sqlite3"));
        let logging = config.logging.unwrap();
        assert_eq!(logging.log_dir, log_dir);
        assert_eq!(logging.level, default_log_level());
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = ProfileConfig::from_lookup(lookup(&[
            (LOG_DIR_ENV, "logs"),
            (LOG_LEVEL_ENV, "warn"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::RelativeLogDir("logs".to_string()));
    }
}
