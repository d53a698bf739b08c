use std::path::Path;
use std::time::Duration;

use tokio::process::Command;

use crate::models::VcsStatus;
use crate::utils::{run_checked, CommandError};

/// Computes the working-copy status of one working tree.
#[async_trait::async_trait]
pub trait StatusProbe: Send + Sync {
    /// Never fails: any internal error yields `VcsStatus::default()`.
    async fn compute(&self, path: &Path) -> VcsStatus;

    /// Human-readable short status for the detail view.
    async fn short_status(&self, path: &Path) -> Result<String, CommandError>;
}

#[derive(Clone)]
pub struct GitStatusProbe {
    timeout: Duration,
}

impl GitStatusProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn git(path: &Path) -> Command {
        let mut cmd = Command::new("git");
        // Probing must not refresh the index, or it would re-trigger its own watch.
        cmd.arg("--no-optional-locks").arg("-C").arg(path);
        cmd
    }
}

#[async_trait::async_trait]
impl StatusProbe for GitStatusProbe {
    async fn compute(&self, path: &Path) -> VcsStatus {
        let mut status_cmd = Self::git(path);
        status_cmd.args(["status", "--porcelain"]);

        let status = match run_checked(status_cmd, self.timeout).await {
            Ok(out) => VcsStatus::from_porcelain(&out),
            Err(e) => {
                tracing::warn!("git status failed for {}: {}", path.display(), e);
                return VcsStatus::default();
            }
        };

        let mut counts_cmd = Self::git(path);
        counts_cmd.args(["rev-list", "--left-right", "--count", "@{upstream}...HEAD"]);

        match run_checked(counts_cmd, self.timeout).await {
            Ok(out) => status.with_ahead_behind(&out),
            Err(e) => {
                // Branches without an upstream land here routinely.
                tracing::debug!("ahead/behind unavailable for {}: {}", path.display(), e);
                status
            }
        }
    }

    async fn short_status(&self, path: &Path) -> Result<String, CommandError> {
        let mut cmd = Self::git(path);
        cmd.args(["status", "--short"]);
        run_checked(cmd, self.timeout).await
    }
}
