//! In-memory collaborators shared by the dashboard tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::sources::Collaborators;
use crate::models::{AgentState, AgentStatus, MultiplexerRef, ReviewRequest, VcsStatus, WorkingTree};
use crate::probe::{AgentStateReader, OpenError, ReviewClient, StatusProbe};
use crate::session::{
    Discovery, DiscoveryError, FocusError, RemovalError, WindowController, WorktreeRemover,
};
use crate::utils::CommandError;

pub const ROOT: &str = "/r";

fn failed(program: &str, stderr: &str) -> CommandError {
    use std::os::unix::process::ExitStatusExt;
    CommandError::Failed {
        program: program.to_string(),
        status: std::process::ExitStatus::from_raw(1 << 8),
        stderr: stderr.to_string(),
    }
}

#[derive(Default)]
struct WorldState {
    worktrees: Vec<WorkingTree>,
    statuses: HashMap<PathBuf, VcsStatus>,
    agents: HashMap<PathBuf, AgentState>,
    reviews: HashMap<PathBuf, ReviewRequest>,
    windows_by_path: HashMap<PathBuf, String>,
    failing_status: Vec<PathBuf>,
    fail_discovery: bool,
    fail_removal: bool,
    fail_close: bool,
    fail_open: bool,
    fail_tmux: bool,
    probe_delay: Duration,
    calls: Vec<String>,
}

/// A fake repository, tmux server and GitHub, all in one.
#[derive(Clone)]
pub struct FakeWorld {
    state: Arc<Mutex<WorldState>>,
    in_flight_probes: Arc<AtomicUsize>,
    pub peak_concurrent_probes: Arc<AtomicUsize>,
}

impl FakeWorld {
    /// Worktrees at `paths`, the first being the primary one. Branches are
    /// named after the directory with the `/r-` prefix removed.
    pub fn new(paths: &[&str]) -> Self {
        let worktrees = paths
            .iter()
            .map(|p| {
                let branch = p.strip_prefix("/r-").unwrap_or("main");
                WorkingTree::new(*p, branch)
            })
            .collect();

        Self {
            state: Arc::new(Mutex::new(WorldState {
                worktrees,
                ..WorldState::default()
            })),
            in_flight_probes: Arc::new(AtomicUsize::new(0)),
            peak_concurrent_probes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        let fake = Arc::new(self.clone());
        Collaborators {
            discovery: fake.clone(),
            status: fake.clone(),
            agents: fake.clone(),
            reviews: fake.clone(),
            windows: fake.clone(),
            remover: fake,
        }
    }

    pub fn set_status(&self, path: &str, status: VcsStatus) {
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(PathBuf::from(path), status);
    }

    pub fn fail_status(&self, path: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_status
            .push(PathBuf::from(path));
    }

    pub fn set_agent(&self, path: &str, status: &str) {
        let mut state = self.state.lock().unwrap();
        let entry = state.agents.entry(PathBuf::from(path)).or_default();
        entry.agent_name = "claude".to_string();
        entry.status = AgentStatus::from(status.to_string());
    }

    pub fn set_agent_window(&self, path: &str, session: &str, window: u32) {
        let mut state = self.state.lock().unwrap();
        let entry = state.agents.entry(PathBuf::from(path)).or_default();
        entry.multiplexer = Some(MultiplexerRef {
            session: session.to_string(),
            window,
            pane: 0,
        });
    }

    pub fn remove_agent(&self, path: &str) {
        self.state.lock().unwrap().agents.remove(Path::new(path));
    }

    pub fn set_review(&self, path: &str, number: u64) {
        self.state.lock().unwrap().reviews.insert(
            PathBuf::from(path),
            ReviewRequest {
                number,
                state: "OPEN".to_string(),
                title: format!("change {number}"),
                is_draft: false,
            },
        );
    }

    /// Make `path` findable by a pane-path search as `target`.
    pub fn set_window(&self, path: &str, target: &str) {
        self.state
            .lock()
            .unwrap()
            .windows_by_path
            .insert(PathBuf::from(path), target.to_string());
    }

    pub fn fail_discovery(&self) {
        self.state.lock().unwrap().fail_discovery = true;
    }

    pub fn fail_removal(&self) {
        self.state.lock().unwrap().fail_removal = true;
    }

    pub fn fail_close(&self) {
        self.state.lock().unwrap().fail_close = true;
    }

    pub fn fail_open(&self) {
        self.state.lock().unwrap().fail_open = true;
    }

    /// Every focus attempt fails as if the tmux server were unreachable.
    pub fn fail_tmux(&self) {
        self.state.lock().unwrap().fail_tmux = true;
    }

    pub fn set_probe_delay_ms(&self, ms: u64) {
        self.state.lock().unwrap().probe_delay = Duration::from_millis(ms);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than the read-only probes, in order.
    pub fn actions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| {
                !(c.starts_with("status ")
                    || c.starts_with("agent ")
                    || c.starts_with("review ")
                    || c == "discover")
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait::async_trait]
impl Discovery for FakeWorld {
    async fn discover(&self, repo_root: &Path) -> Result<Vec<WorkingTree>, DiscoveryError> {
        self.record("discover".to_string());
        let state = self.state.lock().unwrap();
        if state.fail_discovery {
            return Err(DiscoveryError::Git {
                root: repo_root.to_path_buf(),
                source: failed("git", "not a git repository"),
            });
        }
        Ok(state.worktrees.clone())
    }
}

#[async_trait::async_trait]
impl StatusProbe for FakeWorld {
    async fn compute(&self, path: &Path) -> VcsStatus {
        self.record(format!("status {}", path.display()));

        let now = self.in_flight_probes.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_concurrent_probes.fetch_max(now, Ordering::SeqCst);
        let delay = self.state.lock().unwrap().probe_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight_probes.fetch_sub(1, Ordering::SeqCst);

        let state = self.state.lock().unwrap();
        if state.failing_status.iter().any(|p| p == path) {
            return VcsStatus::default();
        }
        state.statuses.get(path).copied().unwrap_or_default()
    }

    async fn short_status(&self, path: &Path) -> Result<String, CommandError> {
        self.record(format!("short_status {}", path.display()));
        if self.state.lock().unwrap().failing_status.iter().any(|p| p == path) {
            return Err(failed("git", "fatal: not a git repository"));
        }
        Ok(" M src/main.rs\n".to_string())
    }
}

#[async_trait::async_trait]
impl AgentStateReader for FakeWorld {
    async fn read(&self, path: &Path) -> Option<AgentState> {
        self.record(format!("agent {}", path.display()));
        self.state.lock().unwrap().agents.get(path).cloned()
    }
}

#[async_trait::async_trait]
impl ReviewClient for FakeWorld {
    async fn fetch(&self, path: &Path) -> Option<ReviewRequest> {
        self.record(format!("review {}", path.display()));
        self.state.lock().unwrap().reviews.get(path).cloned()
    }

    async fn open(&self, path: &Path) -> Result<(), OpenError> {
        self.record(format!("open {}", path.display()));
        if self.state.lock().unwrap().fail_open {
            return Err(OpenError::Gh {
                path: path.to_path_buf(),
                source: failed("gh", "no pull requests found"),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl WindowController for FakeWorld {
    async fn focus_by_ref(&self, session: &str, window: u32) -> Result<(), FocusError> {
        self.record(format!("focus_ref {session}:{window}"));
        if self.state.lock().unwrap().fail_tmux {
            return Err(FocusError::Transport(failed("tmux", "no server running")));
        }
        Ok(())
    }

    async fn focus_by_path(&self, path: &Path) -> Result<(), FocusError> {
        self.record(format!("focus_path {}", path.display()));
        let state = self.state.lock().unwrap();
        if state.fail_tmux {
            return Err(FocusError::Transport(failed("tmux", "no server running")));
        }
        match state.windows_by_path.get(path) {
            Some(_) => Ok(()),
            None => Err(FocusError::NotFound(path.to_path_buf())),
        }
    }

    async fn close_by_ref(&self, session: &str, window: u32) -> Result<(), FocusError> {
        self.record(format!("close_ref {session}:{window}"));
        if self.state.lock().unwrap().fail_close {
            return Err(FocusError::Transport(failed("tmux", "no server running")));
        }
        Ok(())
    }

    async fn close_by_path(&self, path: &Path) -> Result<(), FocusError> {
        self.record(format!("close_path {}", path.display()));
        let state = self.state.lock().unwrap();
        if state.fail_close {
            return Err(FocusError::Transport(failed("tmux", "no server running")));
        }
        match state.windows_by_path.get(path) {
            Some(_) => Ok(()),
            None => Err(FocusError::NotFound(path.to_path_buf())),
        }
    }
}

#[async_trait::async_trait]
impl WorktreeRemover for FakeWorld {
    async fn remove(&self, path: &Path) -> Result<(), RemovalError> {
        self.record(format!("remove {}", path.display()));
        let mut state = self.state.lock().unwrap();
        if state.fail_removal {
            return Err(RemovalError::Git {
                path: path.to_path_buf(),
                source: failed("git", "contains modified or untracked files"),
            });
        }
        state.worktrees.retain(|w| w.path != path);
        Ok(())
    }
}

/// A watcher that does nothing, for tests that don't inspect subscriptions.
#[derive(Default)]
pub struct NoWatch;

impl crate::watch::WatchControl for NoWatch {
    fn resubscribe(&mut self, _worktrees: &[PathBuf]) {}

    fn teardown(&mut self) {}
}
