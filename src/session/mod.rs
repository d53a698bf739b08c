mod tmux;
mod worktree;

pub use tmux::{FocusError, TmuxManager, WindowController};
pub use worktree::{
    resolve_repo_root, Discovery, DiscoveryError, GitWorktrees, RemovalError, WorktreeRemover,
};
