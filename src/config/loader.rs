use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Per-tool subprocess deadlines, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub git_secs: u64,
    pub gh_secs: u64,
    pub tmux_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            git_secs: 10,
            gh_secs: 15,
            tmux_secs: 5,
        }
    }
}

impl TimeoutConfig {
    pub fn git(&self) -> Duration {
        Duration::from_secs(self.git_secs)
    }

    pub fn gh(&self) -> Duration {
        Duration::from_secs(self.gh_secs)
    }

    pub fn tmux(&self) -> Duration {
        Duration::from_secs(self.tmux_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ceiling on rows probed at the same time during a full rebuild.
    pub concurrency: usize,
    pub fetch_reviews: bool,
    /// Seconds between periodic full refreshes; 0 disables them.
    pub refresh_interval_secs: u64,
    pub watch_debounce_ms: u64,
    pub timeouts: TimeoutConfig,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: 8,
            fetch_reviews: true,
            refresh_interval_secs: 0,
            watch_debounce_ms: 150,
            timeouts: TimeoutConfig::default(),
            log_dir: None,
        }
    }
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let path = config_path.unwrap_or_else(Self::default_config_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn default_config_path() -> PathBuf {
        if let Some(config_path) = std::env::var_os("ARBORIST_CONFIG") {
            PathBuf::from(config_path)
        } else {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("arborist")
                .join("config.yaml")
        }
    }

    pub fn with_fetch_reviews(mut self, fetch_reviews: bool) -> Self {
        self.fetch_reviews = fetch_reviews;
        self
    }

    pub fn with_refresh_interval(mut self, secs: u64) -> Self {
        self.refresh_interval_secs = secs;
        self
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    pub fn watch_debounce(&self) -> Duration {
        Duration::from_millis(self.watch_debounce_ms)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .unwrap_or_else(std::env::temp_dir)
                .join("arborist")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_default_values() {
        let config = Config::default();
        assert_eq!(config.concurrency, 8);
        assert!(config.fetch_reviews);
        assert_eq!(config.refresh_interval(), None);
        assert_eq!(config.watch_debounce(), Duration::from_millis(150));
        assert_eq!(config.timeouts.git(), Duration::from_secs(10));
        assert_eq!(config.timeouts.gh(), Duration::from_secs(15));
        assert_eq!(config.timeouts.tmux(), Duration::from_secs(5));
    }

    #[test]
    fn config_loads_from_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml = r#"
concurrency: 2
fetch_reviews: false
refresh_interval_secs: 60
timeouts:
  gh_secs: 30
log_dir: /tmp/arborist-logs
"#;
        std::fs::write(&config_path, yaml).unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.concurrency, 2);
        assert!(!config.fetch_reviews);
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(60)));
        assert_eq!(config.timeouts.gh_secs, 30);
        assert_eq!(
            config.timeouts.git_secs, 10,
            "load: unspecified timeouts should keep their defaults"
        );
        assert_eq!(config.watch_debounce_ms, 150);
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/arborist-logs"));
    }

    #[test]
    fn config_load_returns_default_when_file_missing() {
        let config = Config::load(Some(PathBuf::from("/nonexistent/config.yaml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn config_load_rejects_malformed_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "concurrency: [not a number").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(
            err.to_string().contains("Failed to parse config file"),
            "load: error should name the failing step, got {err}"
        );
    }

    #[test]
    fn config_cli_overrides() {
        let config = Config::default()
            .with_fetch_reviews(false)
            .with_refresh_interval(5);
        assert!(!config.fetch_reviews);
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(5)));

        let disabled = config.with_refresh_interval(0);
        assert_eq!(disabled.refresh_interval(), None);
    }

    #[test]
    fn config_default_log_dir_ends_with_app_name() {
        let config = Config::default();
        assert!(config.log_dir().ends_with("arborist"));
    }

    #[test]
    fn config_serializes_to_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(yaml.contains("concurrency: 8"));
        assert!(yaml.contains("fetch_reviews: true"));
        assert!(yaml.contains("git_secs: 10"));
    }
}
