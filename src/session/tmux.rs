use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

use crate::utils::{run_checked, CommandError};

#[derive(Debug, Error)]
pub enum FocusError {
    #[error("no tmux window found for path {}", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Transport(#[from] CommandError),
}

/// Moves tmux focus to (or closes) the window an agent lives in.
#[async_trait::async_trait]
pub trait WindowController: Send + Sync {
    async fn focus_by_ref(&self, session: &str, window: u32) -> Result<(), FocusError>;

    async fn focus_by_path(&self, path: &Path) -> Result<(), FocusError>;

    async fn close_by_ref(&self, session: &str, window: u32) -> Result<(), FocusError>;

    async fn close_by_path(&self, path: &Path) -> Result<(), FocusError>;
}

#[derive(Clone)]
pub struct TmuxManager {
    timeout: Duration,
}

impl TmuxManager {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn tmux(&self, args: &[&str]) -> Result<String, CommandError> {
        let mut cmd = Command::new("tmux");
        cmd.args(args);
        run_checked(cmd, self.timeout).await
    }

    async fn select_window(&self, target: &str) -> Result<(), FocusError> {
        self.tmux(&["select-window", "-t", target]).await?;

        // Only meaningful when the dashboard runs in a different session;
        // outside tmux there is no client to switch.
        let session = target.split(':').next().unwrap_or(target);
        if let Err(e) = self.tmux(&["switch-client", "-t", session]).await {
            tracing::debug!("switch-client to {} skipped: {}", session, e);
        }
        Ok(())
    }

    async fn find_window_by_path(&self, path: &Path) -> Result<String, FocusError> {
        let listing = self
            .tmux(&[
                "list-windows",
                "-a",
                "-F",
                "#{session_name}:#{window_index} #{pane_current_path}",
            ])
            .await?;

        find_target_for_path(&listing, path).ok_or_else(|| FocusError::NotFound(path.to_path_buf()))
    }
}

#[async_trait::async_trait]
impl WindowController for TmuxManager {
    async fn focus_by_ref(&self, session: &str, window: u32) -> Result<(), FocusError> {
        self.select_window(&format!("{}:{}", session, window)).await
    }

    async fn focus_by_path(&self, path: &Path) -> Result<(), FocusError> {
        let target = self.find_window_by_path(path).await?;
        self.select_window(&target).await
    }

    async fn close_by_ref(&self, session: &str, window: u32) -> Result<(), FocusError> {
        self.tmux(&["kill-window", "-t", &format!("{}:{}", session, window)])
            .await?;
        Ok(())
    }

    async fn close_by_path(&self, path: &Path) -> Result<(), FocusError> {
        let target = self.find_window_by_path(path).await?;
        self.tmux(&["kill-window", "-t", &target]).await?;
        Ok(())
    }
}

/// Pick the `session:window` target whose pane path equals `path` from
/// `list-windows -F "#{session_name}:#{window_index} #{pane_current_path}"` output.
fn find_target_for_path(listing: &str, path: &Path) -> Option<String> {
    listing.lines().find_map(|line| {
        let (target, pane_path) = line.split_once(' ')?;
        (Path::new(pane_path.trim_end()) == path).then(|| target.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
main:0 /home/me/r
main:1 /home/me/r-featA
agents:2 /home/me/r-featB
agents:3 /home/me/dir with spaces
";

    #[test]
    fn find_target_for_path_matches_exact_pane_path() {
        assert_eq!(
            find_target_for_path(LISTING, Path::new("/home/me/r-featB")),
            Some("agents:2".to_string()),
            "find_target_for_path: should return the matching session:window"
        );
    }

    #[test]
    fn find_target_for_path_does_not_prefix_match() {
        assert_eq!(
            find_target_for_path(LISTING, Path::new("/home/me/r-feat")),
            None,
            "find_target_for_path: prefixes must not match"
        );
    }

    #[test]
    fn find_target_for_path_handles_spaces_in_path() {
        assert_eq!(
            find_target_for_path(LISTING, Path::new("/home/me/dir with spaces")),
            Some("agents:3".to_string())
        );
    }

    #[test]
    fn find_target_for_path_first_match_wins() {
        let listing = "a:0 /x\nb:4 /x\n";
        assert_eq!(
            find_target_for_path(listing, Path::new("/x")),
            Some("a:0".to_string())
        );
    }

    #[test]
    fn focus_error_not_found_is_distinguishable() {
        let err = FocusError::NotFound(PathBuf::from("/r-featA"));
        assert!(matches!(err, FocusError::NotFound(_)));
        assert_eq!(err.to_string(), "no tmux window found for path /r-featA");
    }
}
