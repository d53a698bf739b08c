use anyhow::Result;
use clap::Args as ClapArgs;
use std::path::PathBuf;

use crate::commands::common;
use crate::config::Config;
use crate::dashboard;

#[derive(ClapArgs, Default)]
pub struct Args {
    /// Skip pull request lookups
    #[arg(long)]
    pub no_reviews: bool,

    /// Seconds between automatic full refreshes (0 disables)
    #[arg(long)]
    pub refresh_interval: Option<u64>,
}

impl Args {
    pub fn apply(&self, mut config: Config) -> Config {
        if self.no_reviews {
            config = config.with_fetch_reviews(false);
        }
        if let Some(secs) = self.refresh_interval {
            config = config.with_refresh_interval(secs);
        }
        config
    }
}

pub async fn execute(args: Args, repo: Option<PathBuf>, config: Config) -> Result<()> {
    let config = args.apply(config);
    let repo_root = common::resolve_repo(repo, &config).await?;

    dashboard::run(repo_root, &config).await
}
