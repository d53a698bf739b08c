use std::path::Path;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use super::row_table::RowTable;
use super::sources::Collaborators;
use crate::models::{Row, WorkingTree};
use crate::session::DiscoveryError;
use crate::watch::Domain;

/// Builds rows from the collaborators, either all at once or one field at a time.
pub struct Aggregator {
    sources: Collaborators,
    concurrency: usize,
}

impl Aggregator {
    pub fn new(sources: Collaborators, concurrency: usize) -> Self {
        Self {
            sources,
            concurrency: concurrency.max(1),
        }
    }

    /// Rediscover every working tree and rebuild its row.
    ///
    /// Rows keep discovery's order. At most `concurrency` rows are probed at
    /// once. The cursor and status line of `previous` carry over.
    pub async fn full_rebuild(
        &self,
        repo_root: &Path,
        previous: &RowTable,
    ) -> Result<RowTable, DiscoveryError> {
        let worktrees = self.sources.discovery.discover(repo_root).await?;
        debug!("Discovered {} worktrees", worktrees.len());

        let rows: Vec<Row> = stream::iter(worktrees)
            .map(|worktree| self.build_row(worktree))
            .buffered(self.concurrency)
            .collect()
            .await;

        info!("Rebuilt {} rows", rows.len());
        Ok(previous.rebuilt(rows))
    }

    async fn build_row(&self, working_tree: WorkingTree) -> Row {
        let path = working_tree.path.as_path();
        let (vcs_status, review, agent) = tokio::join!(
            self.sources.status.compute(path),
            self.sources.reviews.fetch(path),
            self.sources.agents.read(path),
        );

        Row {
            working_tree,
            vcs_status,
            review,
            agent,
        }
    }

    /// Refresh only the part of the row for `path` that `domain` covers.
    /// Unknown paths leave the table untouched; review requests are never
    /// refreshed here.
    pub async fn incremental_recompute(
        &self,
        mut table: RowTable,
        path: &Path,
        domain: Domain,
    ) -> RowTable {
        let Some(index) = table.position_of(path) else {
            debug!("Ignoring change for unknown worktree {}", path.display());
            return table;
        };

        match domain {
            Domain::Agent => {
                let agent = self.sources.agents.read(path).await;
                if let Some(row) = table.row_mut(index) {
                    row.agent = agent;
                }
            }
            Domain::VersionControl => {
                let status = self.sources.status.compute(path).await;
                if let Some(row) = table.row_mut(index) {
                    row.vcs_status = status;
                }
            }
            Domain::Unknown => {
                let (status, agent) = tokio::join!(
                    self.sources.status.compute(path),
                    self.sources.agents.read(path),
                );
                if let Some(row) = table.row_mut(index) {
                    row.vcs_status = status;
                    row.agent = agent;
                }
            }
        }

        table
    }
}
