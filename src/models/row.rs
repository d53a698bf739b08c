use super::{AgentState, ReviewRequest, VcsStatus, WorkingTree};

/// The dashboard's composite view of one working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub working_tree: WorkingTree,
    pub vcs_status: VcsStatus,
    pub review: Option<ReviewRequest>,
    pub agent: Option<AgentState>,
}

impl Row {
    pub fn new(working_tree: WorkingTree) -> Self {
        Self {
            working_tree,
            vcs_status: VcsStatus::default(),
            review: None,
            agent: None,
        }
    }

    /// Agent name and status, or a dash when no agent reported.
    pub fn agent_summary(&self) -> String {
        match &self.agent {
            Some(agent) if agent.agent_name.is_empty() => agent.status.to_string(),
            Some(agent) => format!("{} {}", agent.agent_name, agent.status),
            None => ABSENT.to_string(),
        }
    }

    pub fn review_summary(&self) -> String {
        self.review
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| ABSENT.to_string())
    }
}

/// Placeholder for a field no collaborator could fill.
pub const ABSENT: &str = "—";
