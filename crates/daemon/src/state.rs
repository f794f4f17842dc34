//! Application directory and configuration.
//!
//! Everything lives in one directory (by default the platform config dir,
//! e.g. `~/.config/issuefs`), currently just `config.toml`:
//!
//! ```toml
//! url = "https://jira.example.com/rest/api/2"
//! username = "alice"
//! password = "secret"
//! log_level = "info"
//!
//! [cache]
//! max_size_mb = 100
//! ttl_secs = 60
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use jira::{ApiError, JiraClient};

pub const APP_NAME: &str = "issuefs";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not determine a configuration directory; pass --config-dir")]
    NoConfigDir,
    #[error("not initialized: {0} does not exist (run `issuefs init`)")]
    NotInitialized(PathBuf),
    #[error("already initialized: {0} exists")]
    AlreadyInitialized(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root of the Jira REST API, e.g. `https://jira.example.com/rest/api/2`
    pub url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Attribute and content cache of a mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u32,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u32,
}

fn default_max_size_mb() -> u32 {
    100
}

fn default_ttl_secs() -> u32 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_mb: default_max_size_mb(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl AppConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            username: None,
            password: None,
            log_level: default_log_level(),
            cache: CacheConfig::default(),
        }
    }

    /// Client for the configured API, authenticating if a username is set.
    pub fn client(&self) -> Result<JiraClient, ApiError> {
        let client = JiraClient::new(&self.url)?;
        Ok(match &self.username {
            Some(username) => {
                client.with_basic_auth(username, self.password.clone().unwrap_or_default())
            }
            None => client,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub app_dir: PathBuf,
    pub config_path: PathBuf,
    pub config: AppConfig,
}

impl AppState {
    /// The application directory: `custom` if given, else the platform
    /// default.
    pub fn app_dir(custom: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(dir) = custom {
            return Ok(dir);
        }
        directories::ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(StateError::NoConfigDir)
    }

    /// Create the application directory and write `config`. Refuses to
    /// overwrite an existing config.
    pub fn init(custom: Option<PathBuf>, config: AppConfig) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom)?;
        let config_path = app_dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Err(StateError::AlreadyInitialized(config_path));
        }

        std::fs::create_dir_all(&app_dir)?;
        std::fs::write(&config_path, toml::to_string_pretty(&config)?)?;
        restrict_permissions(&config_path)?;

        Ok(Self {
            app_dir,
            config_path,
            config,
        })
    }

    pub fn load(custom: Option<PathBuf>) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom)?;
        let config_path = app_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(StateError::NotInitialized(config_path));
        }

        let raw = std::fs::read_to_string(&config_path)?;
        let config = toml::from_str(&raw)?;

        Ok(Self {
            app_dir,
            config_path,
            config,
        })
    }
}

/// The config may hold a password; keep it private to the owner.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), StateError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), StateError> {
    Ok(())
}
