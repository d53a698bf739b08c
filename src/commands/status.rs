use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

use crate::commands::common;
use crate::config::Config;
use crate::dashboard::{Aggregator, Collaborators, RowTable};

#[derive(ClapArgs, Default)]
pub struct Args {
    /// Skip pull request lookups
    #[arg(long)]
    pub no_reviews: bool,
}

pub async fn execute(args: Args, repo: Option<PathBuf>, config: Config) -> Result<()> {
    let config = if args.no_reviews {
        config.with_fetch_reviews(false)
    } else {
        config
    };
    let repo_root = common::resolve_repo(repo, &config).await?;

    let aggregator = Aggregator::new(
        Collaborators::from_config(&repo_root, &config),
        config.concurrency,
    );
    let table = aggregator
        .full_rebuild(&repo_root, &RowTable::default())
        .await
        .with_context(|| format!("Failed to list worktrees of {}", repo_root.display()))?;

    println!("Repository: {}", repo_root.display());
    println!();
    print!("{}", format_table(&table));

    Ok(())
}

const HEADERS: [&str; 4] = ["BRANCH", "AGENT", "REVIEW", "GIT"];

/// Plain-text rendering of the table with columns padded to their widest cell.
fn format_table(table: &RowTable) -> String {
    let cells: Vec<[String; 4]> = table
        .rows()
        .iter()
        .map(|row| {
            [
                row.working_tree.display_name(),
                row.agent_summary(),
                row.review_summary(),
                row.vcs_status.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.width());
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.width());
        }
    }

    let mut out = String::new();
    let header = HEADERS.map(|h| h.to_string());
    for line in std::iter::once(&header).chain(cells.iter()) {
        let mut text = String::new();
        for (i, cell) in line.iter().enumerate() {
            text.push_str(cell);
            if i + 1 < line.len() {
                let pad = widths[i] - cell.width() + 2;
                text.push_str(&" ".repeat(pad));
            }
        }
        out.push_str(text.trim_end());
        out.push('\n');
    }

    if cells.is_empty() {
        out.push_str("(no worktrees)\n");
    }
    out
}
