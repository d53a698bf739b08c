use std::path::PathBuf;

/// Label used for worktrees whose HEAD is not on a branch.
pub const DETACHED_BRANCH_LABEL: &str = "(detached)";

/// One checked-out working tree of the repository, as reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingTree {
    pub path: PathBuf,
    pub branch_name: String,
}

impl WorkingTree {
    pub fn new(path: impl Into<PathBuf>, branch_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            branch_name: branch_name.into(),
        }
    }

    pub fn is_detached(&self) -> bool {
        self.branch_name == DETACHED_BRANCH_LABEL
    }

    /// Branch name when there is one, otherwise the directory name.
    pub fn display_name(&self) -> String {
        if !self.branch_name.is_empty() && !self.is_detached() {
            return self.branch_name.clone();
        }
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}
