use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod dashboard;
mod models;
mod probe;
mod session;
mod utils;
mod watch;

use cli::{Cli, Commands};
use config::Config;

const LOG_ENV: &str = "ARBORIST_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    let command = cli.command.unwrap_or(Commands::Dashboard(Default::default()));
    let _guard = match &command {
        Commands::Dashboard(_) => Some(init_file_logging(&config)?),
        Commands::Status(_) => {
            init_stderr_logging();
            None
        }
    };

    match command {
        Commands::Dashboard(args) => commands::dashboard::execute(args, cli.repo, config).await,
        Commands::Status(args) => commands::status::execute(args, cli.repo, config).await,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The dashboard owns the terminal, so its logs go to a daily file instead.
fn init_file_logging(config: &Config) -> Result<WorkerGuard> {
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", log_dir))?;

    let appender = tracing_appender::rolling::daily(&log_dir, "arborist.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}
