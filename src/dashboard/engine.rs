use std::path::{Path, PathBuf};

use crossterm::event::{KeyEvent, KeyEventKind};
use tracing::{debug, info, warn};

use super::aggregator::Aggregator;
use super::event::{AppEvent, RefreshOrigin};
use super::keymap::{is_confirm_key, is_interrupt, Command};
use super::row_table::RowTable;
use super::sources::Collaborators;
use crate::watch::{WatchControl, WatchManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    ConfirmingRemoval,
}

/// Text shown in the popup opened by the detailed-status command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub title: String,
    pub body: String,
}

/// Single-threaded owner of the row table. Consumes events one at a time,
/// mutating the table and issuing side effects through the collaborators.
pub struct InteractionEngine<W: WatchControl = WatchManager> {
    repo_root: PathBuf,
    table: RowTable,
    aggregator: Aggregator,
    sources: Collaborators,
    watch: W,
    detail: Option<DetailView>,
    dimensions: (u16, u16),
    running: bool,
}

impl<W: WatchControl> InteractionEngine<W> {
    pub fn new(repo_root: PathBuf, sources: Collaborators, concurrency: usize, watch: W) -> Self {
        Self {
            repo_root,
            table: RowTable::default(),
            aggregator: Aggregator::new(sources.clone(), concurrency),
            sources,
            watch,
            detail: None,
            dimensions: (0, 0),
            running: true,
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn table(&self) -> &RowTable {
        &self.table
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    pub fn dimensions(&self) -> (u16, u16) {
        self.dimensions
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn mode(&self) -> Mode {
        if self.table.pending_removal() {
            Mode::ConfirmingRemoval
        } else {
            Mode::Normal
        }
    }

    /// Whether handling `event` will run a full rebuild, so the caller can
    /// draw a busy indicator first.
    pub fn will_rebuild(&self, event: &AppEvent) -> bool {
        match event {
            AppEvent::Refresh(RefreshOrigin::Periodic) => self.mode() == Mode::Normal,
            AppEvent::Refresh(RefreshOrigin::Startup) => true,
            AppEvent::Key(key) if key.kind == KeyEventKind::Press && self.detail.is_none() => {
                match self.mode() {
                    Mode::ConfirmingRemoval => is_confirm_key(key),
                    Mode::Normal => Command::from_key(key) == Some(Command::Refresh),
                }
            }
            _ => false,
        }
    }

    pub async fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Resize { width, height } => {
                self.dimensions = (width, height);
            }
            AppEvent::Key(key) => self.handle_key(key).await,
            AppEvent::Refresh(RefreshOrigin::Periodic) if self.mode() == Mode::ConfirmingRemoval => {
                debug!("Skipping periodic refresh while a removal awaits confirmation");
            }
            AppEvent::Refresh(origin) => {
                debug!("Refresh requested ({:?})", origin);
                self.refresh().await;
            }
            AppEvent::Invalidate(invalidation) => {
                let table = std::mem::take(&mut self.table);
                self.table = self
                    .aggregator
                    .incremental_recompute(table, &invalidation.path, invalidation.domain)
                    .await;
            }
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        debug!("Key pressed: {:?}", key.code);

        if is_interrupt(&key) {
            self.quit();
            return;
        }

        if self.detail.take().is_some() {
            return;
        }

        if self.mode() == Mode::ConfirmingRemoval {
            if is_confirm_key(&key) {
                self.confirm_removal().await;
            } else {
                self.table.cancel_removal_confirmation();
            }
            return;
        }

        self.table.clear_status_message();
        if let Some(command) = Command::from_key(&key) {
            self.dispatch(command).await;
        }
    }

    async fn dispatch(&mut self, command: Command) {
        match command {
            Command::MoveUp => self.table.move_cursor(-1),
            Command::MoveDown => self.table.move_cursor(1),
            Command::Refresh => {
                self.refresh().await;
            }
            Command::FocusWindow => self.focus_window().await,
            Command::OpenReview => self.open_review().await,
            Command::ShowDetail => self.show_detail().await,
            Command::Delete => self.request_removal(),
            Command::Quit => self.quit(),
        }
    }

    /// Rebuild every row, then point the watcher at the new set of working trees.
    /// On discovery failure the previous table stays on screen and `false` is
    /// returned.
    async fn refresh(&mut self) -> bool {
        match self
            .aggregator
            .full_rebuild(&self.repo_root, &self.table)
            .await
        {
            Ok(table) => {
                self.table = table;
                self.watch.resubscribe(&self.table.paths());
                true
            }
            Err(e) => {
                warn!("Refresh failed: {}", e);
                self.table.set_status_message(format!("Discovery error: {e}"));
                false
            }
        }
    }

    async fn focus_window(&mut self) {
        let Some(row) = self.table.selected() else {
            return;
        };
        let path = row.working_tree.path.clone();
        let target = row
            .agent
            .as_ref()
            .and_then(|a| a.multiplexer_ref())
            .cloned();

        let windows = &self.sources.windows;
        let result = match &target {
            Some(mux) => windows.focus_by_ref(&mux.session, mux.window).await,
            None => windows.focus_by_path(&path).await,
        };

        if let Err(e) = result {
            debug!("Focus failed for {}: {}", path.display(), e);
            let text = match target {
                Some(_) => format!("tmux jump failed: {e}"),
                None => format!("tmux: {e}"),
            };
            self.table.set_status_message(text);
        }
    }

    async fn open_review(&mut self) {
        let Some(row) = self.table.selected() else {
            return;
        };
        if row.review.is_none() {
            self.table.set_status_message("No review for this row");
            return;
        }
        let path = row.working_tree.path.clone();
        if let Err(e) = self.sources.reviews.open(&path).await {
            self.table.set_status_message(format!("Open review failed: {e}"));
        }
    }

    async fn show_detail(&mut self) {
        let Some(row) = self.table.selected() else {
            return;
        };
        let title = row.working_tree.display_name();
        let path = row.working_tree.path.clone();

        match self.sources.status.short_status(&path).await {
            Ok(body) => self.detail = Some(DetailView { title, body }),
            Err(e) => self.table.set_status_message(format!("git status failed: {e}")),
        }
    }

    fn request_removal(&mut self) {
        let Some(row) = self.table.selected() else {
            return;
        };
        if self.table.cursor() == 0 {
            self.table
                .set_status_message("Cannot delete the primary working tree");
            return;
        }

        let text = format!(
            "Delete worktree '{}'? Press d to confirm, any other key to cancel",
            row.working_tree.branch_name
        );
        self.table.set_status_message(text);
        self.table.begin_removal_confirmation();
    }

    async fn confirm_removal(&mut self) {
        self.table.finish_removal_confirmation();
        let Some(row) = self.table.selected() else {
            return;
        };
        let path = row.working_tree.path.clone();
        let branch = row.working_tree.branch_name.clone();
        let target = row
            .agent
            .as_ref()
            .and_then(|a| a.multiplexer_ref())
            .cloned();

        let windows = &self.sources.windows;
        let closed = match &target {
            Some(mux) => windows.close_by_ref(&mux.session, mux.window).await,
            None => windows.close_by_path(&path).await,
        };
        if let Err(e) = closed {
            debug!("No window closed for {}: {}", path.display(), e);
        }

        match self.sources.remover.remove(&path).await {
            Ok(()) => {
                info!("Deleted worktree {}", path.display());
                if self.refresh().await {
                    self.table
                        .set_status_message(format!("Deleted worktree '{branch}'"));
                }
            }
            Err(e) => {
                warn!("Delete failed: {}", e);
                self.table.set_status_message(format!("Delete failed: {e}"));
            }
        }
    }

    fn quit(&mut self) {
        self.watch.teardown();
        self.running = false;
    }
}
