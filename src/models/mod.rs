mod agent;
mod review;
mod row;
mod vcs_status;
mod worktree;

pub use agent::{
    AgentState, AgentStatus, MultiplexerRef, AGENT_STATE_DIR, AGENT_STATE_FILE,
    AGENT_STATE_FILE_NAME,
};
pub use review::ReviewRequest;
pub use row::{Row, ABSENT};
pub use vcs_status::VcsStatus;
pub use worktree::{WorkingTree, DETACHED_BRANCH_LABEL};
