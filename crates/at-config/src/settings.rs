//! Process settings
//!
//! Read from an optional YAML file, then overridden from the environment:
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | `listen` | `AT_LISTEN` | `0.0.0.0:8080` |
//! | `storage_path` | `AT_STORAGE_PATH` | `config.json` |
//! | `web_root` | `AT_WEB_ROOT` | unset |
//! | `tick_interval_ms` | `AT_TICK_MS` | `100` |
//!
//! The settings file itself is found through `AT_SETTINGS`, defaulting to
//! `settings.yaml` in the working directory.

use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

pub const SETTINGS_ENV: &str = "AT_SETTINGS";
pub const DEFAULT_SETTINGS_FILE: &str = "settings.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub listen: String,
    pub storage_path: PathBuf,
    pub web_root: Option<PathBuf>,
    pub tick_interval_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
            storage_path: PathBuf::from("config.json"),
            web_root: None,
            tick_interval_ms: 100,
        }
    }
}

impl ServerSettings {
    /// Load from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the environment
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let path = lookup(SETTINGS_ENV).unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string());
        let settings = Self::load_file(Path::new(&path))?;
        settings.with_overrides(lookup)?.validated()
    }

    /// Read a settings file; a missing file yields the defaults
    pub fn load_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("Settings file not found, using defaults: {:?}", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        // An empty file is a YAML null, not a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseYaml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        if let Some(listen) = lookup("AT_LISTEN") {
            self.listen = listen;
        }
        if let Some(path) = lookup("AT_STORAGE_PATH") {
            self.storage_path = PathBuf::from(path);
        }
        if let Some(root) = lookup("AT_WEB_ROOT") {
            self.web_root = Some(PathBuf::from(root)).filter(|p| !p.as_os_str().is_empty());
        }
        if let Some(tick) = lookup("AT_TICK_MS") {
            self.tick_interval_ms = tick.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "AT_TICK_MS".to_string(),
                reason: format!("'{}' is not a whole number of milliseconds", tick),
            })?;
        }
        Ok(self)
    }

    fn validated(self) -> ConfigResult<Self> {
        self.listen_addr()?;
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tick_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(self)
    }

    /// Parsed listen address
    pub fn listen_addr(&self) -> ConfigResult<SocketAddr> {
        self.listen.parse().map_err(|_| ConfigError::InvalidValue {
            key: "listen".to_string(),
            reason: format!("'{}' is not a socket address", self.listen),
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(vars: HashMap<&'static str, String>) -> impl Fn(&str) -> Option<String> {
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yaml");
        let vars = HashMap::from([(SETTINGS_ENV, path.display().to_string())]);

        let settings = ServerSettings::resolve(lookup_from(vars)).unwrap();
        assert_eq!(settings, ServerSettings::default());
        assert_eq!(settings.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_file_then_env_overrides() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.yaml");
        fs::write(
            &path,
            "listen: \"127.0.0.1:9000\"\nweb_root: /srv/ui\ntick_interval_ms: 250\n",
        )
        .unwrap();

        let vars = HashMap::from([
            (SETTINGS_ENV, path.display().to_string()),
            ("AT_STORAGE_PATH", "/data/config.json".to_string()),
            ("AT_TICK_MS", "50".to_string()),
        ]);
        let settings = ServerSettings::resolve(lookup_from(vars)).unwrap();

        assert_eq!(settings.listen_addr().unwrap().port(), 9000);
        assert_eq!(settings.web_root, Some(PathBuf::from("/srv/ui")));
        assert_eq!(settings.storage_path, PathBuf::from("/data/config.json"));
        assert_eq!(settings.tick_interval_ms, 50);
    }

    #[test]
    fn test_zero_tick_rejected() {
        let temp = TempDir::new().unwrap();
        let vars = HashMap::from([
            (SETTINGS_ENV, temp.path().join("none.yaml").display().to_string()),
            ("AT_TICK_MS", "0".to_string()),
        ]);
        let err = ServerSettings::resolve(lookup_from(vars)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "tick_interval_ms"
        ));
    }

    #[test]
    fn test_bad_values_rejected() {
        let temp = TempDir::new().unwrap();
        let none = temp.path().join("none.yaml").display().to_string();

        let vars = HashMap::from([
            (SETTINGS_ENV, none.clone()),
            ("AT_TICK_MS", "fast".to_string()),
        ]);
        assert!(ServerSettings::resolve(lookup_from(vars)).is_err());

        let vars = HashMap::from([(SETTINGS_ENV, none), ("AT_LISTEN", "nowhere".to_string())]);
        assert!(ServerSettings::resolve(lookup_from(vars)).is_err());
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.yaml");
        fs::write(&path, "tick_interval_ms: [oops\n").unwrap();
        let err = ServerSettings::load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseYaml { .. }));
    }
}
