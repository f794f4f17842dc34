use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;
use url::Url;

use issuefs_daemon::state::{AppConfig, AppState, CacheConfig, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Root of the Jira REST API, e.g. https://jira.example.com/rest/api/2
    #[arg(long)]
    pub url: Url,

    /// Username for basic authentication
    #[arg(long)]
    pub username: Option<String>,

    /// Password or API token for basic authentication
    #[arg(long, env = "ISSUEFS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Maximum cached file content for mounts, in megabytes
    #[arg(long, default_value = "100")]
    pub cache_size_mb: u32,

    /// How long mounts trust cached attributes and content, in seconds
    #[arg(long, default_value = "60")]
    pub cache_ttl_secs: u32,
}

#[derive(Debug)]
pub struct InitOutput {
    pub app_dir: PathBuf,
    pub config_path: PathBuf,
    pub url: Url,
    pub username: Option<String>,
    pub cache: CacheConfig,
}

impl fmt::Display for InitOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} issuefs at {}",
            "Initialized".green().bold(),
            self.app_dir.display().to_string().bold()
        )?;
        writeln!(f, "  {} {}", "Config:".dimmed(), self.config_path.display())?;
        writeln!(f, "  {} {}", "Jira:".dimmed(), self.url)?;
        let user = match &self.username {
            Some(username) => username.clone(),
            None => "anonymous".to_string(),
        };
        writeln!(f, "  {} {}", "User:".dimmed(), user)?;
        write!(
            f,
            "  {} {} MB, {}s TTL",
            "Cache:".dimmed(),
            self.cache.max_size_mb,
            self.cache.ttl_secs
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),

    #[error("--password requires --username")]
    PasswordWithoutUser,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = InitOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        if self.password.is_some() && self.username.is_none() {
            return Err(InitError::PasswordWithoutUser);
        }

        let config = AppConfig {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            log_level: self.log_level.clone(),
            cache: CacheConfig {
                max_size_mb: self.cache_size_mb,
                ttl_secs: self.cache_ttl_secs,
            },
        };

        let state = AppState::init(ctx.config_dir.clone(), config)?;

        Ok(InitOutput {
            app_dir: state.app_dir,
            config_path: state.config_path,
            url: state.config.url,
            username: state.config.username,
            cache: state.config.cache,
        })
    }
}
