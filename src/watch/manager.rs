use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::owner::{classify, derive_owner, Invalidation};
use crate::dashboard::AppEvent;
use crate::models::AGENT_STATE_DIR;

/// What the interaction engine needs from a watcher.
pub trait WatchControl {
    /// Replace every active subscription with ones for `worktrees`.
    fn resubscribe(&mut self, worktrees: &[PathBuf]);

    /// Release all subscriptions. Safe to call repeatedly.
    fn teardown(&mut self);
}

/// Directories to watch for a set of working trees, plus the table that maps
/// linked-worktree metadata directories back to their working tree.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SubscriptionPlan {
    pub dirs: Vec<PathBuf>,
    pub redirects: HashMap<PathBuf, PathBuf>,
}

impl SubscriptionPlan {
    pub fn for_worktrees(worktrees: &[PathBuf]) -> Self {
        let mut plan = Self::default();
        for worktree in worktrees {
            plan.add_worktree(worktree);
        }
        plan
    }

    fn push_dir(&mut self, dir: PathBuf) {
        if !self.dirs.contains(&dir) {
            self.dirs.push(dir);
        }
    }

    fn add_worktree(&mut self, worktree: &Path) {
        let agent_dir = worktree.join(AGENT_STATE_DIR);
        if agent_dir.is_dir() {
            self.push_dir(agent_dir);
        }

        let dot_git = worktree.join(".git");
        match std::fs::metadata(&dot_git) {
            Ok(meta) if meta.is_dir() => {
                self.push_dir(dot_git.clone());
                let refs = dot_git.join("refs");
                if refs.is_dir() {
                    self.push_dir(refs.clone());
                    let heads = refs.join("heads");
                    if heads.is_dir() {
                        self.push_dir(heads);
                    }
                }
            }
            Ok(_) => match resolve_gitdir_file(&dot_git, worktree) {
                Some(gitdir) => {
                    self.push_dir(gitdir.clone());
                    self.redirects.insert(gitdir, worktree.to_path_buf());
                }
                None => debug!("no usable gitdir pointer in {}", dot_git.display()),
            },
            Err(e) => debug!("no git metadata at {}: {}", dot_git.display(), e),
        }
    }
}

/// Extract the target of a `gitdir: <path>` redirect file.
pub fn parse_gitdir_pointer(content: &str) -> Option<&str> {
    let target = content.lines().next()?.strip_prefix("gitdir:")?.trim();
    (!target.is_empty()).then_some(target)
}

fn resolve_gitdir_file(dot_git: &Path, worktree: &Path) -> Option<PathBuf> {
    let content = std::fs::read_to_string(dot_git).ok()?;
    let target = Path::new(parse_gitdir_pointer(&content)?);
    let joined = if target.is_absolute() {
        target.to_path_buf()
    } else {
        worktree.join(target)
    };
    Some(std::fs::canonicalize(&joined).unwrap_or(joined))
}

/// Turn one raw notification into row invalidations.
pub fn translate(event: &Event, redirects: &HashMap<PathBuf, PathBuf>) -> Vec<Invalidation> {
    match event.kind {
        EventKind::Create(_) | EventKind::Remove(_) => {}
        EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
        EventKind::Modify(_) => {}
        EventKind::Access(_) | EventKind::Any | EventKind::Other => return Vec::new(),
    }

    event
        .paths
        .iter()
        .filter_map(|changed| {
            let domain = classify(changed);
            let owner = derive_owner(changed, domain)?;
            let path = redirects.get(&owner).cloned().unwrap_or(owner);
            Some(Invalidation::new(path, domain))
        })
        .collect()
}

struct ActiveWatch {
    _watcher: RecommendedWatcher,
    observer: JoinHandle<()>,
    subscriptions: BTreeSet<PathBuf>,
    worktrees: BTreeSet<PathBuf>,
}

/// Owns the filesystem subscriptions for the current set of working trees.
pub struct WatchManager {
    events: UnboundedSender<AppEvent>,
    debounce: Duration,
    active: Option<ActiveWatch>,
}

impl WatchManager {
    pub fn new(events: UnboundedSender<AppEvent>, debounce: Duration) -> Self {
        Self {
            events,
            debounce,
            active: None,
        }
    }

    /// Directories currently subscribed.
    #[cfg(test)]
    pub fn subscriptions(&self) -> impl Iterator<Item = &Path> {
        self.active
            .iter()
            .flat_map(|a| a.subscriptions.iter().map(PathBuf::as_path))
    }

    /// Working trees the current subscription set was built for.
    #[cfg(test)]
    pub fn watched_worktrees(&self) -> BTreeSet<PathBuf> {
        self.active
            .as_ref()
            .map(|a| a.worktrees.clone())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl WatchControl for WatchManager {
    fn resubscribe(&mut self, worktrees: &[PathBuf]) {
        self.teardown();

        let plan = SubscriptionPlan::for_worktrees(worktrees);
        let (raw_tx, raw_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

        let mut watcher = match notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    let _ = raw_tx.send(event);
                }
                Err(e) => warn!("watch error: {}", e),
            }
        }) {
            Ok(watcher) => watcher,
            Err(e) => {
                warn!("file watching unavailable, manual refresh only: {}", e);
                return;
            }
        };

        let mut subscriptions = BTreeSet::new();
        for dir in &plan.dirs {
            match watcher.watch(dir, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    subscriptions.insert(dir.clone());
                }
                Err(e) => debug!("cannot watch {}: {}", dir.display(), e),
            }
        }

        let observer = tokio::spawn(observe(
            raw_rx,
            Arc::new(plan.redirects),
            self.events.clone(),
            self.debounce,
        ));

        info!(
            "Watching {} directories for {} worktrees",
            subscriptions.len(),
            worktrees.len()
        );

        self.active = Some(ActiveWatch {
            _watcher: watcher,
            observer,
            subscriptions,
            worktrees: worktrees.iter().cloned().collect(),
        });
    }

    fn teardown(&mut self) {
        if let Some(active) = self.active.take() {
            active.observer.abort();
            debug!(
                "Released {} watch subscriptions for {} worktrees",
                active.subscriptions.len(),
                active.worktrees.len()
            );
        }
    }
}

impl Drop for WatchManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Forward translated notifications to the engine, coalescing repeats of the
/// same invalidation that arrive within `debounce` of the first one.
async fn observe(
    mut raw: UnboundedReceiver<Event>,
    redirects: Arc<HashMap<PathBuf, PathBuf>>,
    events: UnboundedSender<AppEvent>,
    debounce: Duration,
) {
    let mut pending: Vec<Invalidation> = Vec::new();
    let mut deadline: Option<Instant> = None;

    loop {
        let flush_at = deadline.unwrap_or_else(Instant::now);
        tokio::select! {
            received = raw.recv() => {
                let Some(event) = received else { break };
                for invalidation in translate(&event, &redirects) {
                    if !pending.contains(&invalidation) {
                        pending.push(invalidation);
                    }
                }
                if !pending.is_empty() && deadline.is_none() {
                    deadline = Some(Instant::now() + debounce);
                }
            }
            _ = tokio::time::sleep_until(flush_at), if deadline.is_some() => {
                deadline = None;
                for invalidation in pending.drain(..) {
                    if events.send(AppEvent::Invalidate(invalidation)).is_err() {
                        return;
                    }
                }
            }
        }
    }
}
