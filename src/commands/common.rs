use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::session::resolve_repo_root;

/// The repository root to work on: `--repo` when given, else the top level of
/// the repository containing the current directory. Failure here is fatal.
pub async fn resolve_repo(repo: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    let start = match repo {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    resolve_repo_root(&start, config.timeouts.git())
        .await
        .with_context(|| format!("{} is not inside a git repository", start.display()))
}
