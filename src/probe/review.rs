use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

use crate::models::ReviewRequest;
use crate::utils::{run_checked, CommandError};

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("cannot open review for {path}: {source}")]
    Gh {
        path: PathBuf,
        #[source]
        source: CommandError,
    },
}

/// Looks up and opens the pull request of a working tree's branch.
#[async_trait::async_trait]
pub trait ReviewClient: Send + Sync {
    async fn fetch(&self, path: &Path) -> Option<ReviewRequest>;

    async fn open(&self, path: &Path) -> Result<(), OpenError>;
}

/// ReviewClient backed by the GitHub CLI.
#[derive(Clone)]
pub struct GhReviewClient {
    timeout: Duration,
    enabled: bool,
}

impl GhReviewClient {
    pub fn new(timeout: Duration, enabled: bool) -> Self {
        Self { timeout, enabled }
    }
}

#[async_trait::async_trait]
impl ReviewClient for GhReviewClient {
    async fn fetch(&self, path: &Path) -> Option<ReviewRequest> {
        if !self.enabled {
            return None;
        }

        let mut cmd = Command::new("gh");
        cmd.args(["pr", "view", "--json", "number,state,title,isDraft"])
            .current_dir(path);

        let out = match run_checked(cmd, self.timeout).await {
            Ok(out) => out,
            Err(e) => {
                // "no pull requests found" is the common case.
                tracing::debug!("no review for {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&out) {
            Ok(review) => Some(review),
            Err(e) => {
                tracing::warn!("unexpected gh output for {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn open(&self, path: &Path) -> Result<(), OpenError> {
        let mut cmd = Command::new("gh");
        cmd.args(["pr", "view", "--web"]).current_dir(path);
        run_checked(cmd, self.timeout)
            .await
            .map(|_| ())
            .map_err(|source| OpenError::Gh {
                path: path.to_path_buf(),
                source,
            })
    }
}
