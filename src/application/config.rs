use std::path::PathBuf;

use log::LevelFilter;

use super::ApplicationError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_AUDIT_LOG: &str = "log.txt";

/// Runtime settings, read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// `PORT`
    pub port: u16,
    /// `CALC_AUDIT_LOG`: append-only file of requests and their outcomes.
    pub audit_log: PathBuf,
    /// `CALC_LOG_LEVEL`
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            audit_log: PathBuf::from(DEFAULT_AUDIT_LOG),
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ApplicationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source. Unset and empty
    /// variables fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApplicationError> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|_| ApplicationError::Config {
                key: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(path) = lookup("CALC_AUDIT_LOG") {
            config.audit_log = PathBuf::from(path);
        }
        if let Some(level) = lookup("CALC_LOG_LEVEL") {
            config.log_level = level.trim().parse().map_err(|_| ApplicationError::Config {
                key: "CALC_LOG_LEVEL",
                value: level.clone(),
            })?;
        }
        Ok(config)
    }
}
