//! Runtime configuration for the statistics DDL pipeline.
//!
//! Values come from built-in defaults, optionally overridden by a JSON document
//! or by `STATSYNC_*` environment variables.

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const ENV_DDL_CHANNEL_CAPACITY: &str = "STATSYNC_DDL_CHANNEL_CAPACITY";
pub const ENV_DRAIN_ON_SHUTDOWN: &str = "STATSYNC_DRAIN_ON_SHUTDOWN";

const DEFAULT_DDL_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Number of DDL tasks buffered before producers are suspended
    pub ddl_channel_capacity: usize,
    /// Whether the worker applies tasks still queued when shutdown is requested
    pub drain_on_shutdown: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            ddl_channel_capacity: DEFAULT_DDL_CHANNEL_CAPACITY,
            drain_on_shutdown: true,
        }
    }
}

impl StatsConfig {
    /// Defaults overridden by whatever `STATSYNC_*` variables are set
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_json(text: &str) -> Result<Self, Error> {
        let config: StatsConfig = serde_json::from_str(text)
            .map_err(|e| Error::Config(format!("Invalid config document: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_DDL_CHANNEL_CAPACITY) {
            config.ddl_channel_capacity = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a positive integer, got '{}'", ENV_DDL_CHANNEL_CAPACITY, raw))
            })?;
        }

        if let Some(raw) = lookup(ENV_DRAIN_ON_SHUTDOWN) {
            config.drain_on_shutdown = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(Error::Config(format!(
                        "{} must be a boolean, got '{}'",
                        ENV_DRAIN_ON_SHUTDOWN, raw
                    )))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        // tokio's bounded channel panics on zero capacity
        if self.ddl_channel_capacity == 0 {
            return Err(Error::Config("ddl_channel_capacity must be greater than zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StatsConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, StatsConfig::default());
        assert_eq!(config.ddl_channel_capacity, 100);
        assert!(config.drain_on_shutdown);
    }

    #[test]
    fn test_env_overrides() {
        let config = StatsConfig::from_lookup(lookup_from(&[
            (ENV_DDL_CHANNEL_CAPACITY, " 8 "),
            (ENV_DRAIN_ON_SHUTDOWN, "off"),
        ]))
        .unwrap();
        assert_eq!(config.ddl_channel_capacity, 8);
        assert!(!config.drain_on_shutdown);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            StatsConfig::from_lookup(lookup_from(&[(ENV_DDL_CHANNEL_CAPACITY, "lots")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            StatsConfig::from_lookup(lookup_from(&[(ENV_DDL_CHANNEL_CAPACITY, "0")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            StatsConfig::from_lookup(lookup_from(&[(ENV_DRAIN_ON_SHUTDOWN, "maybe")])),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_json_partial_document() {
        let config = StatsConfig::from_json(r#"{"ddl_channel_capacity": 4}"#).unwrap();
        assert_eq!(config.ddl_channel_capacity, 4);
        assert!(config.drain_on_shutdown);

        assert!(StatsConfig::from_json("not json").is_err());
        assert!(StatsConfig::from_json(r#"{"ddl_channel_capacity": 0}"#).is_err());
    }
}
