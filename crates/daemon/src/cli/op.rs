use std::path::PathBuf;

use common::IssueFs;
use jira::{ApiError, JiraClient};

use issuefs_daemon::state::{AppState, StateError};

/// Shared inputs of every command.
#[derive(Debug, Clone)]
pub struct OpContext {
    /// Overrides the platform config directory
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to create client: {0}")]
    Api(#[from] ApiError),
}

impl OpContext {
    pub fn new(config_dir: Option<PathBuf>) -> Self {
        Self { config_dir }
    }

    pub fn state(&self) -> Result<AppState, StateError> {
        AppState::load(self.config_dir.clone())
    }

    /// Filesystem over the configured Jira instance.
    pub fn connect(&self) -> Result<IssueFs<JiraClient>, ConnectError> {
        let state = self.state()?;
        Ok(issuefs_daemon::connect(&state.config)?)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;
    type Output: std::fmt::Display + std::fmt::Debug;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

/// Declare a `Command` subcommand enum over op types, with matching
/// `OpOutput` and `OpError` enums, and an `Op` impl dispatching to each.
#[macro_export]
macro_rules! command_enum {
    ($($(#[$meta:meta])* ($variant:ident, $ty:ty)),* $(,)?) => {
        #[derive(clap::Subcommand, Debug, Clone)]
        pub enum Command {
            $($(#[$meta])* $variant($ty),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($(#[$meta])* $variant(<$ty as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $($(#[$meta])* #[error(transparent)] $variant(<$ty as $crate::cli::op::Op>::Error),)*
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($(#[$meta])* OpOutput::$variant(output) => write!(f, "{}", output),)*
                }
            }
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Error = OpError;
            type Output = OpOutput;

            async fn execute(
                &self,
                ctx: &$crate::cli::op::OpContext,
            ) -> Result<Self::Output, Self::Error> {
                match self {
                    $($(#[$meta])* Command::$variant(op) => op
                        .execute(ctx)
                        .await
                        .map(OpOutput::$variant)
                        .map_err(OpError::$variant),)*
                }
            }
        }
    };
}
