//! Configuration management for Dialtone.
//!
//! Loads configuration from ${DIALTONE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::guard::Route;

/// Environment variable that overrides `api_url`.
pub const API_URL_ENV: &str = "DIALTONE_API_URL";

/// Embedded template used by `dialtone config init`.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for Dialtone configuration and data directories.
    //!
    //! DIALTONE_HOME resolution order:
    //! 1. DIALTONE_HOME environment variable (if set)
    //! 2. ~/.config/dialtone (default)
    //! 3. ./.dialtone when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the Dialtone home directory.
    pub fn dialtone_home() -> PathBuf {
        if let Ok(home) = std::env::var("DIALTONE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".dialtone"),
            |h| h.join(".config").join("dialtone"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        dialtone_home().join("config.toml")
    }

    /// Returns the path to the local key-value storage file.
    pub fn storage_path() -> PathBuf {
        dialtone_home().join("storage.json")
    }

    /// Returns the directory holding log files.
    pub fn logs_dir() -> PathBuf {
        dialtone_home().join("logs")
    }
}

/// Redirect targets used by the route guards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Entry (login) route; anonymous viewers of protected content land here.
    pub entry: String,
    /// Protected (dashboard) route; authenticated viewers of the entry route land here.
    pub protected: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            entry: Route::AUTH.to_string(),
            protected: Route::DASHBOARD.to_string(),
        }
    }
}

impl RoutesConfig {
    /// Returns the configured entry route.
    pub fn entry_route(&self) -> Route {
        Route::new(&self.entry)
    }

    /// Returns the configured protected route.
    pub fn protected_route(&self) -> Route {
        Route::new(&self.protected)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [("entry", &self.entry), ("protected", &self.protected)] {
            if !value.starts_with('/') {
                anyhow::bail!("routes.{name} must start with '/', got {value:?}");
            }
        }
        if self.entry == self.protected {
            anyhow::bail!(
                "routes.entry and routes.protected must differ (both are {:?})",
                self.entry
            );
        }
        Ok(())
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Random-user endpoint queried on login.
    pub api_url: String,

    /// Nationality code passed as `nat=`.
    pub nationality: String,

    /// Timeout for the user fetch in seconds (0 disables)
    pub request_timeout_secs: u64,

    /// Key under which the user record is stored.
    pub storage_key: String,

    /// Default tracing filter when DIALTONE_LOG is unset.
    pub log_filter: String,

    /// Route guard redirect targets.
    pub routes: RoutesConfig,
}

impl Config {
    pub const DEFAULT_API_URL: &str = "https://randomuser.me/api/";
    const DEFAULT_NATIONALITY: &str = "us";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_STORAGE_KEY: &str = "auth_user";
    const DEFAULT_LOG_FILTER: &str = "info";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, parsed or validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        } else {
            Config::default()
        };

        config
            .routes
            .validate()
            .with_context(|| format!("Invalid routes in {}", path.display()))?;
        Ok(config)
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Returns the API URL, preferring the DIALTONE_API_URL env var.
    ///
    /// # Errors
    /// Returns an error if the resolved URL is not a valid absolute URL.
    pub fn effective_api_url(&self) -> Result<url::Url> {
        let env_url = std::env::var(API_URL_ENV).ok();
        let raw = env_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| Some(self.api_url.trim()).filter(|s| !s.is_empty()))
            .unwrap_or(Self::DEFAULT_API_URL);

        url::Url::parse(raw).with_context(|| format!("Invalid random-user API URL: {raw}"))
    }

    /// Returns the fetch timeout, or None when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            nationality: Self::DEFAULT_NATIONALITY.to_string(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            storage_key: Self::DEFAULT_STORAGE_KEY.to_string(),
            log_filter: Self::DEFAULT_LOG_FILTER.to_string(),
            routes: RoutesConfig::default(),
        }
    }
}
