use clap::Parser;
use owo_colors::OwoColorize;

mod cli;

use cli::op::{Op, OpContext};
use cli::ops::{Cat, Export, Init, Ls, Search, Stat, Version};
#[cfg(feature = "fuse")]
use cli::ops::Mount;

use issuefs_daemon::{logging, AppState};

crate::command_enum! {
    (Init, Init),
    (Ls, Ls),
    (Cat, Cat),
    (Stat, Stat),
    (Search, Search),
    (Export, Export),
    #[cfg(feature = "fuse")]
    (Mount, Mount),
    (Version, Version),
}

#[derive(Parser, Debug)]
#[command(name = "issuefs", about = "Browse a Jira instance as a read-only filesystem")]
struct Cli {
    /// Configuration directory (defaults to the platform config dir)
    #[arg(long, global = true, env = "ISSUEFS_DIR")]
    config_dir: Option<std::path::PathBuf>,

    /// Log level; overrides the configured one (RUST_LOG wins over both)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

async fn run(command: Command, ctx: OpContext) -> anyhow::Result<OpOutput> {
    Ok(command.execute(&ctx).await?)
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let level = args.log_level.clone().unwrap_or_else(|| {
        AppState::load(args.config_dir.clone())
            .map(|state| state.config.log_level)
            .unwrap_or_else(|_| "warn".to_string())
    });
    let guard = logging::init(&level);

    let ctx = OpContext::new(args.config_dir);
    match run(args.command, ctx).await {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            drop(guard);
            std::process::exit(1);
        }
    }
}
