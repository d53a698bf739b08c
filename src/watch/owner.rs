//! Maps a changed filesystem path to the working tree it belongs to.
//!
//! Everything here works on the path string alone. By the time a change is
//! processed the working tree may already be gone, so the filesystem is never
//! consulted.

use std::path::{Component, Path, PathBuf};

use crate::models::AGENT_STATE_FILE_NAME;

/// Directory names that only ever occur inside git metadata.
pub const VCS_INTERNAL_DIRS: &[&str] = &[".git", "refs", "heads", "remotes", "worktrees"];

const GIT_DIR: &str = ".git";
const LINKED_WORKTREES_DIR: &str = "worktrees";

/// Which part of a row a change concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Agent,
    VersionControl,
    /// The change could not be attributed; both local sources are re-read.
    Unknown,
}

/// A request to recompute part of one row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invalidation {
    pub path: PathBuf,
    pub domain: Domain,
}

impl Invalidation {
    pub fn new(path: impl Into<PathBuf>, domain: Domain) -> Self {
        Self {
            path: path.into(),
            domain,
        }
    }
}

pub fn classify(changed: &Path) -> Domain {
    match changed.file_name() {
        Some(name) if name == AGENT_STATE_FILE_NAME => Domain::Agent,
        Some(_) => Domain::VersionControl,
        None => Domain::Unknown,
    }
}

/// The working tree (or linked-worktree metadata directory) owning `changed`.
pub fn derive_owner(changed: &Path, domain: Domain) -> Option<PathBuf> {
    match domain {
        // <worktree>/.sideby/agent/state.json
        Domain::Agent => Some(changed.parent()?.parent()?.parent()?.to_path_buf()),
        Domain::VersionControl | Domain::Unknown => derive_vcs_owner(changed),
    }
}

fn is_internal(name: &std::ffi::OsStr) -> bool {
    VCS_INTERNAL_DIRS.iter().any(|n| name == *n)
}

fn derive_vcs_owner(changed: &Path) -> Option<PathBuf> {
    let dir = changed.parent()?;

    // Anything below a `.git` directory belongs to the directory holding it,
    // however deep the ref namespace goes. The one exception is a linked
    // worktree's private metadata, `<.git>/worktrees/<name>`, which is returned
    // as-is for the caller to map back to its working tree.
    let components: Vec<Component> = dir.components().collect();
    if let Some(git_idx) = components.iter().position(|c| c.as_os_str() == GIT_DIR) {
        let inside = &components[git_idx + 1..];
        if inside.len() >= 2 && inside[0].as_os_str() == LINKED_WORKTREES_DIR {
            return Some(components[..git_idx + 3].iter().collect());
        }
        return Some(components[..git_idx].iter().collect());
    }

    // Metadata stored outside a `.git` directory (e.g. a separate git dir):
    // climb past internal directory names.
    let mut dir = dir;
    while let Some(name) = dir.file_name() {
        if !is_internal(name) {
            break;
        }
        dir = dir.parent()?;
    }
    Some(dir.to_path_buf())
}
