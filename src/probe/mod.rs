mod agent_state;
mod git_status;
mod review;

pub use agent_state::{AgentStateReader, SidecarReader};
pub use git_status::{GitStatusProbe, StatusProbe};
pub use review::{GhReviewClient, OpenError, ReviewClient};
