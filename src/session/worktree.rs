use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

use crate::models::{WorkingTree, DETACHED_BRANCH_LABEL};
use crate::utils::{run_checked, CommandError};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot list worktrees of {root}: {source}")]
    Git {
        root: PathBuf,
        #[source]
        source: CommandError,
    },
}

#[derive(Debug, Error)]
pub enum RemovalError {
    #[error("cannot remove worktree {path}: {source}")]
    Git {
        path: PathBuf,
        #[source]
        source: CommandError,
    },
}

/// Lists the working trees of a repository.
#[async_trait::async_trait]
pub trait Discovery: Send + Sync {
    async fn discover(&self, repo_root: &Path) -> Result<Vec<WorkingTree>, DiscoveryError>;
}

/// Deletes a linked working tree.
#[async_trait::async_trait]
pub trait WorktreeRemover: Send + Sync {
    async fn remove(&self, path: &Path) -> Result<(), RemovalError>;
}

/// Discovery and removal backed by the `git worktree` subcommands.
#[derive(Clone)]
pub struct GitWorktrees {
    repo_root: PathBuf,
    timeout: Duration,
}

impl GitWorktrees {
    pub fn new(repo_root: PathBuf, timeout: Duration) -> Self {
        Self { repo_root, timeout }
    }
}

#[async_trait::async_trait]
impl Discovery for GitWorktrees {
    async fn discover(&self, repo_root: &Path) -> Result<Vec<WorkingTree>, DiscoveryError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(repo_root)
            .args(["worktree", "list", "--porcelain"]);

        let output = run_checked(cmd, self.timeout)
            .await
            .map_err(|source| DiscoveryError::Git {
                root: repo_root.to_path_buf(),
                source,
            })?;

        Ok(parse_porcelain(&output))
    }
}

#[async_trait::async_trait]
impl WorktreeRemover for GitWorktrees {
    async fn remove(&self, path: &Path) -> Result<(), RemovalError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(&self.repo_root)
            .args(["worktree", "remove"])
            .arg(path);

        run_checked(cmd, self.timeout)
            .await
            .map_err(|source| RemovalError::Git {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!("Removed worktree {}", path.display());
        Ok(())
    }
}

/// Resolve the top level of the repository containing `cwd`.
pub async fn resolve_repo_root(cwd: &Path, timeout: Duration) -> Result<PathBuf, CommandError> {
    let mut cmd = Command::new("git");
    cmd.arg("-C")
        .arg(cwd)
        .args(["rev-parse", "--show-toplevel"]);
    let out = run_checked(cmd, timeout).await?;
    Ok(PathBuf::from(out.trim()))
}

#[derive(Default)]
struct PendingEntry {
    path: Option<PathBuf>,
    branch: Option<String>,
    detached: bool,
    bare: bool,
}

impl PendingEntry {
    fn finish(self) -> Option<WorkingTree> {
        let path = self.path?;
        if self.bare {
            return None;
        }
        let branch = match self.branch {
            Some(branch) => branch,
            None if self.detached => DETACHED_BRANCH_LABEL.to_string(),
            None => String::new(),
        };
        Some(WorkingTree::new(path, branch))
    }
}

/// Parse `git worktree list --porcelain`, keeping git's order.
pub fn parse_porcelain(output: &str) -> Vec<WorkingTree> {
    let mut worktrees = Vec::new();
    let mut current = PendingEntry::default();

    for line in output.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            worktrees.extend(std::mem::take(&mut current).finish());
            continue;
        }

        if let Some(path) = line.strip_prefix("worktree ") {
            // A new record without a separating blank line still starts fresh.
            worktrees.extend(std::mem::take(&mut current).finish());
            current.path = Some(PathBuf::from(path));
        } else if let Some(branch) = line.strip_prefix("branch ") {
            current.branch = Some(
                branch
                    .strip_prefix("refs/heads/")
                    .unwrap_or(branch)
                    .to_string(),
            );
        } else if line == "detached" {
            current.detached = true;
        } else if line == "bare" {
            current.bare = true;
        }
    }
    worktrees.extend(current.finish());

    worktrees
}
