use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::probe::{
    AgentStateReader, GhReviewClient, GitStatusProbe, ReviewClient, SidecarReader, StatusProbe,
};
use crate::session::{Discovery, GitWorktrees, TmuxManager, WindowController, WorktreeRemover};

/// The external systems a dashboard talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub discovery: Arc<dyn Discovery>,
    pub status: Arc<dyn StatusProbe>,
    pub agents: Arc<dyn AgentStateReader>,
    pub reviews: Arc<dyn ReviewClient>,
    pub windows: Arc<dyn WindowController>,
    pub remover: Arc<dyn WorktreeRemover>,
}

impl Collaborators {
    pub fn from_config(repo_root: &Path, config: &Config) -> Self {
        let worktrees = Arc::new(GitWorktrees::new(
            repo_root.to_path_buf(),
            config.timeouts.git(),
        ));

        Self {
            discovery: worktrees.clone(),
            status: Arc::new(GitStatusProbe::new(config.timeouts.git())),
            agents: Arc::new(SidecarReader),
            reviews: Arc::new(GhReviewClient::new(
                config.timeouts.gh(),
                config.fetch_reviews,
            )),
            windows: Arc::new(TmuxManager::new(config.timeouts.tmux())),
            remover: worktrees,
        }
    }
}
