//! Configuration and the startup API credential.
//!
//! Preferences live in a JSON file under the user config directory and are
//! created with defaults on first run. The Gemini credential is different:
//! it is read from the environment once at startup, is never written to
//! disk, and its absence aborts initialization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Primary credential variable, with the broader Google variable accepted
/// as a fallback.
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "GOOGLE_API_KEY";

/// Env filter variable for the diagnostics log.
pub const ENV_LOG_FILTER: &str = "REMEDY_LOG";

pub fn default_log_filter() -> &'static str {
    "remedy=info"
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing API credential: set {ENV_API_KEY} or {ENV_API_KEY_FALLBACK}")]
    MissingApiKey,
    #[error("could not determine the user config directory")]
    NoConfigDir,
    #[error("could not read or write the config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// Gemini model used for all requests.
    pub model: String,
    /// Override for the Generative Language host, mainly for local stubs.
    pub api_base: Option<String>,
    /// Screen to open when no route argument is given.
    pub start_route: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self { model: "gemini-1.5-flash".to_string(), api_base: None, start_route: None }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the config file, writing the defaults on first run.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            let config = Self::new();
            config.save_to(&path)?;
            return Ok(config);
        }
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("remedy").join("config.json"))
    }
}

/// Where the diagnostics log goes. The terminal owns stderr while the
/// dashboard is up, so tracing writes here instead.
pub fn log_path() -> Result<PathBuf, ConfigError> {
    let data_dir = dirs::data_local_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(data_dir.join("remedy").join("remedy.log"))
}

/// The externally issued Gemini API key.
///
/// Only constructible from the environment outside of tests, so a running
/// application is known to have passed the startup check.
#[derive(Clone)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Read the credential at startup. Missing or empty values are the
    /// fatal configuration error, not a per-request condition.
    pub fn from_env() -> Result<Self, ConfigError> {
        for name in [ENV_API_KEY, ENV_API_KEY_FALLBACK] {
            if let Ok(value) = std::env::var(name) {
                if !value.trim().is_empty() {
                    return Ok(Self(value));
                }
            }
        }
        Err(ConfigError::MissingApiKey)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub fn for_tests(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(\"[REDACTED]\")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remedy").join("config.json");

        let config = Config {
            model: "gemini-1.5-pro".to_string(),
            api_base: Some("http://localhost:9100".to_string()),
            start_route: Some("/assistant".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.model, "gemini-1.5-pro");
        assert_eq!(loaded.api_base.as_deref(), Some("http://localhost:9100"));
        assert_eq!(loaded.start_route.as_deref(), Some("/assistant"));
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.model, "gemini-1.5-flash");
        assert!(config.api_base.is_none());
    }

    #[test]
    fn partial_config_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"start_route": "/records"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.start_route.as_deref(), Some("/records"));
    }

    // Single test so nothing else races on these process-global variables.
    #[test]
    fn credential_env_lookup_and_fallback() {
        std::env::set_var(ENV_API_KEY, "primary-key");
        std::env::set_var(ENV_API_KEY_FALLBACK, "fallback-key");
        assert_eq!(ApiCredential::from_env().unwrap().as_str(), "primary-key");

        std::env::remove_var(ENV_API_KEY);
        assert_eq!(ApiCredential::from_env().unwrap().as_str(), "fallback-key");

        std::env::set_var(ENV_API_KEY_FALLBACK, "  ");
        assert!(matches!(ApiCredential::from_env(), Err(ConfigError::MissingApiKey)));
        std::env::remove_var(ENV_API_KEY_FALLBACK);
    }

    #[test]
    fn credential_debug_never_prints_the_key() {
        let credential = ApiCredential::for_tests("super-secret");
        let printed = format!("{credential:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("REDACTED"));
    }
}
