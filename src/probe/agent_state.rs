use std::path::Path;

use crate::models::{AgentState, AGENT_STATE_FILE};

/// Reads the agent sidecar of a working tree.
#[async_trait::async_trait]
pub trait AgentStateReader: Send + Sync {
    /// `None` when no agent has written a sidecar, or it cannot be parsed yet.
    async fn read(&self, path: &Path) -> Option<AgentState>;
}

#[derive(Clone, Default)]
pub struct SidecarReader;

#[async_trait::async_trait]
impl AgentStateReader for SidecarReader {
    async fn read(&self, path: &Path) -> Option<AgentState> {
        let file = path.join(AGENT_STATE_FILE);
        let content = match tokio::fs::read_to_string(&file).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::debug!("cannot read {}: {}", file.display(), e);
                return None;
            }
        };

        match AgentState::from_json(&content) {
            Ok(state) => Some(state),
            Err(e) => {
                // The agent may be half-way through rewriting the file.
                tracing::debug!("ignoring unparsable {}: {}", file.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgentStatus;

    fn write_sidecar(root: &Path, content: &str) {
        let file = root.join(AGENT_STATE_FILE);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(file, content).unwrap();
    }

    #[tokio::test]
    async fn read_returns_none_without_sidecar() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(SidecarReader.read(tmp.path()).await.is_none());
    }

    #[tokio::test]
    async fn read_parses_sidecar() {
        let tmp = tempfile::tempdir().unwrap();
        write_sidecar(tmp.path(), r#"{"agent":"claude","state":"running","detail":"tests"}"#);

        let state = SidecarReader.read(tmp.path()).await.unwrap();
        assert_eq!(state.status, AgentStatus::Running);
        assert_eq!(state.detail, "tests");
    }

    #[tokio::test]
    async fn read_treats_partial_write_as_absent() {
        let tmp = tempfile::tempdir().unwrap();
        write_sidecar(tmp.path(), r#"{"agent":"claude","sta"#);
        assert!(
            SidecarReader.read(tmp.path()).await.is_none(),
            "read: truncated sidecar should be reported as absent"
        );
    }
}
