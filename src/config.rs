use std::{env, fs, path::PathBuf};

use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// Persistent configuration for procscope.
///
/// Stored at `~/.config/procscope/config.yaml` following the XDG Base
/// Directory Specification. Currently this holds only the last host a
/// remote snapshot was taken from, which `--host`-less invocations fall
/// back to.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProcscopeConfig {
    pub last_host: Option<String>,
}

/// Get the path to the configuration file, following the XDG Base Directory
/// Specification at
/// https://specifications.freedesktop.org/basedir-spec/basedir-spec-latest.html
fn get_configuration_file_path() -> PathBuf {
    let config_dir = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = env::var("HOME").expect("HOME env variable not set");
            PathBuf::from(home).join(".config")
        });
    config_dir.join("procscope").join("config.yaml")
}

impl ProcscopeConfig {
    /// Load the configuration. If it does not exist, return a default
    /// configuration.
    pub fn load() -> Result<Self> {
        let config_path = get_configuration_file_path();

        match fs::read(&config_path) {
            Ok(config_str) => {
                let config: ProcscopeConfig =
                    serde_yaml::from_slice(&config_str).context(format!(
                        "Failed to parse procscope config at {}",
                        config_path.display()
                    ))?;
                debug!("Config loaded from {}", config_path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Config file not found at {}", config_path.display());
                Ok(ProcscopeConfig::default())
            }
            Err(e) => bail!("Failed to load config: {e}"),
        }
    }

    /// Persist changes to the configuration
    pub fn persist(&self) -> Result<()> {
        let config_path = get_configuration_file_path();
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_str = serde_yaml::to_string(self)?;
        fs::write(&config_path, config_str)?;
        debug!("Config saved to {}", config_path.display());

        Ok(())
    }

    /// Record the host of a successful remote snapshot. Returns whether the
    /// value changed (an unchanged host needs no persist).
    pub fn record_last_host(&mut self, host: &str) -> bool {
        if self.last_host.as_deref() == Some(host) {
            return false;
        }
        self.last_host = Some(host.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_the_default() {
        let tmp_dir = tempfile::tempdir().unwrap();
        temp_env::with_var("XDG_CONFIG_HOME", Some(tmp_dir.path()), || {
            let config = ProcscopeConfig::load().unwrap();
            assert_eq!(config.last_host, None);
        });
    }

    #[test]
    fn persist_then_load_round_trips() {
        let tmp_dir = tempfile::tempdir().unwrap();
        temp_env::with_var("XDG_CONFIG_HOME", Some(tmp_dir.path()), || {
            let mut config = ProcscopeConfig::default();
            assert!(config.record_last_host("build-host"));
            config.persist().unwrap();

            let reloaded = ProcscopeConfig::load().unwrap();
            assert_eq!(reloaded.last_host.as_deref(), Some("build-host"));
        });
    }

    #[test]
    fn recording_an_unchanged_host_is_a_no_op() {
        let mut config = ProcscopeConfig::default();
        assert!(config.record_last_host("build-host"));
        assert!(!config.record_last_host("build-host"));
        assert!(config.record_last_host("other-host"));
    }

    #[test]
    fn a_corrupt_file_is_a_contextual_error() {
        let tmp_dir = tempfile::tempdir().unwrap();
        temp_env::with_var("XDG_CONFIG_HOME", Some(tmp_dir.path()), || {
            let config_dir = tmp_dir.path().join("procscope");
            fs::create_dir_all(&config_dir).unwrap();
            fs::write(config_dir.join("config.yaml"), "last-host: [unclosed").unwrap();

            let err = ProcscopeConfig::load().unwrap_err();
            assert!(err.to_string().contains("Failed to parse"));
        });
    }
}
