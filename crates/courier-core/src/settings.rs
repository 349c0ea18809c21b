//! Dispatcher settings.
//!
//! Loaded from an optional TOML file, then overridden by `COURIER_*`
//! environment variables (e.g. `COURIER_ON_DUPLICATE=reject`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const ENV_PREFIX: &str = "COURIER";

/// What `register` does when the message type already has a handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Last write wins.
    #[default]
    Replace,
    /// Fail with `RegisterError::DuplicateHandler`.
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub on_duplicate: DuplicatePolicy,
}

impl DispatcherConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder.add_source(environment).build()?;
        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Environment source backed by `vars` instead of the process environment.
    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn default_policy_is_replace() {
        assert_eq!(DispatcherConfig::default().on_duplicate, DuplicatePolicy::Replace);
    }

    #[test]
    fn loads_policy_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "on_duplicate = \"reject\"").unwrap();

        let config = DispatcherConfig::load_with_env(Some(file.path()), env(&[])).unwrap();
        assert_eq!(config.on_duplicate, DuplicatePolicy::Reject);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let config = DispatcherConfig::load_with_env(Some(file.path()), env(&[])).unwrap();
        assert_eq!(config, DispatcherConfig::default());
    }

    #[test]
    fn unknown_policy_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "on_duplicate = \"merge\"").unwrap();

        assert!(DispatcherConfig::load_with_env(Some(file.path()), env(&[])).is_err());
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "on_duplicate = \"replace\"").unwrap();

        let config = DispatcherConfig::load_with_env(
            Some(file.path()),
            env(&[("COURIER_ON_DUPLICATE", "reject")]),
        )
        .unwrap();
        assert_eq!(config.on_duplicate, DuplicatePolicy::Reject);
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        let config =
            DispatcherConfig::load_with_env(None, env(&[("OTHER_ON_DUPLICATE", "reject")])).unwrap();
        assert_eq!(config, DispatcherConfig::default());
    }
}
