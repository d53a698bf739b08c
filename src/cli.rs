use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{dashboard, status};

#[derive(Parser)]
#[command(name = "arborist")]
#[command(about = "Arborist - live dashboard over a repository's git worktrees and their agents")]
#[command(version)]
pub struct Cli {
    /// Repository to inspect (defaults to the one containing the current directory)
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    /// Custom config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive dashboard (default)
    Dashboard(dashboard::Args),

    /// Print one snapshot of the worktree table and exit
    Status(status::Args),
}
