//! Database configuration from the environment.
//!
//! Each variable falls back to the [`DbConfig`] default when unset.
//!
//! | Variable                      | Default        |
//! |-------------------------------|----------------|
//! | `MEDSTOCK_DATABASE_PATH`      | `medstock.db`  |
//! | `MEDSTOCK_MAX_CONNECTIONS`    | `5`            |
//! | `MEDSTOCK_BUSY_TIMEOUT_SECS`  | `5`            |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::pool::DbConfig;

pub const DATABASE_PATH_VAR: &str = "MEDSTOCK_DATABASE_PATH";
pub const MAX_CONNECTIONS_VAR: &str = "MEDSTOCK_MAX_CONNECTIONS";
pub const BUSY_TIMEOUT_VAR: &str = "MEDSTOCK_BUSY_TIMEOUT_SECS";

const DEFAULT_DATABASE_PATH: &str = "medstock.db";

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("{0} must be greater than zero")]
    MustBePositive(String),
}

impl DbConfig {
    /// Loads the pool configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`DbConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(DATABASE_PATH_VAR).unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());
        let mut config = DbConfig::new(path);

        if let Some(max) = parse_var::<u32>(&lookup, MAX_CONNECTIONS_VAR)? {
            if max == 0 {
                return Err(ConfigError::MustBePositive(MAX_CONNECTIONS_VAR.to_string()));
            }
            let min = config.min_connections.min(max);
            config = config.max_connections(max).min_connections(min);
        }

        if let Some(secs) = parse_var::<u64>(&lookup, BUSY_TIMEOUT_VAR)? {
            config = config.busy_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DbConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_path, PathBuf::from("medstock.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = DbConfig::from_lookup(lookup(&[
            (DATABASE_PATH_VAR, "/var/lib/medstock/stock.db"),
            (MAX_CONNECTIONS_VAR, "8"),
            (BUSY_TIMEOUT_VAR, "15"),
        ]))
        .unwrap();
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/medstock/stock.db")
        );
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.busy_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_values() {
        let err = DbConfig::from_lookup(lookup(&[(MAX_CONNECTIONS_VAR, "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v) if v == MAX_CONNECTIONS_VAR));

        let err = DbConfig::from_lookup(lookup(&[(MAX_CONNECTIONS_VAR, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::MustBePositive(_)));

        let err = DbConfig::from_lookup(lookup(&[(BUSY_TIMEOUT_VAR, "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }
}
