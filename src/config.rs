//! Settings file and credential resolution
//!
//! Settings are read from an optional YAML file. Credentials can also come
//! from the command line or the environment; flags win over environment
//! variables, which win over the file.

use crate::api::DEFAULT_BASE_URL;
use crate::auth::AuthConfig;
use crate::error::{Error, Result, ResultExt};
use crate::http::DEFAULT_CACHE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the account email
pub const USERNAME_ENV: &str = "FEEDBIN_USERNAME";

/// Environment variable holding the account password
pub const PASSWORD_ENV: &str = "FEEDBIN_PASSWORD";

// ============================================================================
// Settings
// ============================================================================

/// Contents of the settings file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Account email
    #[serde(default)]
    pub username: Option<String>,

    /// Account password
    #[serde(default)]
    pub password: Option<String>,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Request throttle, unset means unthrottled
    #[serde(default)]
    pub requests_per_second: Option<u32>,

    /// Response cache settings
    #[serde(default)]
    pub cache: CacheSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            requests_per_second: None,
            cache: CacheSettings::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// In-memory response cache settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CacheSettings {
    /// Whether responses are cached for the duration of one invocation
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of cached responses
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            capacity: default_capacity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Settings {
    /// Parse settings from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                Self::from_yaml(&text).with_context(|| format!("Reading {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from an explicit path or the default location
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match default_path() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(Error::invalid_value("timeout_seconds", "must be positive"));
        }
        if self.requests_per_second == Some(0) {
            return Err(Error::invalid_value(
                "requests_per_second",
                "must be positive",
            ));
        }
        if self.cache.capacity == 0 {
            return Err(Error::invalid_value("cache.capacity", "must be positive"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        Ok(())
    }
}

/// `$HOME/.config/feedbin-tools/config.yaml`, if `HOME` is set
pub fn default_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("feedbin-tools")
            .join("config.yaml")
    })
}

// ============================================================================
// Credentials
// ============================================================================

/// Resolve credentials with an injectable environment lookup
///
/// Each half is taken from the first source that has it. Empty values count
/// as unset.
pub fn resolve_credentials_with<F>(
    user_flag: Option<&str>,
    password_flag: Option<&str>,
    settings: &Settings,
    env: F,
) -> Result<AuthConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let pick = |flag: Option<&str>, key: &str, file: Option<&String>| {
        flag.map(str::to_string)
            .filter(|v| !v.is_empty())
            .or_else(|| env(key).filter(|v| !v.is_empty()))
            .or_else(|| file.filter(|v| !v.is_empty()).cloned())
    };

    let username = pick(user_flag, USERNAME_ENV, settings.username.as_ref());
    let password = pick(password_flag, PASSWORD_ENV, settings.password.as_ref());

    match (username, password) {
        (Some(username), Some(password)) => Ok(AuthConfig::basic(username, password)),
        (None, None) => Ok(AuthConfig::None),
        (Some(_), None) => Err(Error::missing_field("password")),
        (None, Some(_)) => Err(Error::missing_field("username")),
    }
}
