use chrono::{DateTime, Utc};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sidecar file written by the agent, relative to the working tree root.
pub const AGENT_STATE_FILE: &str = ".sideby/agent/state.json";

/// Directory holding the sidecar file, relative to the working tree root.
pub const AGENT_STATE_DIR: &str = ".sideby/agent";

/// File name that marks a change as belonging to the agent domain.
pub const AGENT_STATE_FILE_NAME: &str = "state.json";

/// Agent lifecycle as reported in the sidecar. Values this build does not
/// know are carried through verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentStatus {
    Starting,
    Running,
    AwaitingInput,
    Idle,
    Error,
    Stopped,
    Other(String),
}

impl AgentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AgentStatus::Starting => "starting",
            AgentStatus::Running => "running",
            AgentStatus::AwaitingInput => "awaiting_input",
            AgentStatus::Idle => "idle",
            AgentStatus::Error => "error",
            AgentStatus::Stopped => "stopped",
            AgentStatus::Other(raw) => raw,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AgentStatus::Starting => "◌",
            AgentStatus::Running => "●",
            AgentStatus::AwaitingInput => "◐",
            AgentStatus::Idle => "○",
            AgentStatus::Error => "✗",
            AgentStatus::Stopped => "■",
            AgentStatus::Other(_) => "?",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            AgentStatus::Starting => Color::Cyan,
            AgentStatus::Running => Color::Green,
            AgentStatus::AwaitingInput => Color::Yellow,
            AgentStatus::Idle => Color::Gray,
            AgentStatus::Error => Color::Red,
            AgentStatus::Stopped => Color::DarkGray,
            AgentStatus::Other(_) => Color::Magenta,
        }
    }
}

impl Default for AgentStatus {
    fn default() -> Self {
        AgentStatus::Other(String::new())
    }
}

impl From<String> for AgentStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "starting" => AgentStatus::Starting,
            "running" => AgentStatus::Running,
            "awaiting_input" => AgentStatus::AwaitingInput,
            "idle" => AgentStatus::Idle,
            "error" => AgentStatus::Error,
            "stopped" => AgentStatus::Stopped,
            _ => AgentStatus::Other(raw),
        }
    }
}

impl From<AgentStatus> for String {
    fn from(status: AgentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the agent runs inside tmux.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplexerRef {
    #[serde(default)]
    pub session: String,
    #[serde(default)]
    pub window: u32,
    #[serde(default)]
    pub pane: u32,
}

/// Contents of the agent sidecar file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    #[serde(default, rename = "agent")]
    pub agent_name: String,
    #[serde(default, rename = "state")]
    pub status: AgentStatus,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "tmux")]
    pub multiplexer: Option<MultiplexerRef>,
}

impl AgentState {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// The tmux location, if the agent reported one with a session name.
    pub fn multiplexer_ref(&self) -> Option<&MultiplexerRef> {
        self.multiplexer.as_ref().filter(|m| !m.session.is_empty())
    }
}
