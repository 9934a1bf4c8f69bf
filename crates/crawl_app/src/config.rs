use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crawl_client::ClientSettings;
use crawl_core::{StageSchedule, DEFAULT_PAGE_SIZE};
use crawl_logging::{LogDestination, DEFAULT_LOG_FILE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "./crawl.ron";
pub const TOKEN_ENV: &str = "CRAWL_API_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Stage delays in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageDelays {
    pub enqueue_ms: u64,
    pub running_ms: u64,
    pub result_ms: u64,
    pub resume_running_ms: u64,
    pub resume_result_ms: u64,
}

impl Default for StageDelays {
    fn default() -> Self {
        let schedule = StageSchedule::default();
        Self {
            enqueue_ms: millis(schedule.enqueue),
            running_ms: millis(schedule.set_running),
            result_ms: millis(schedule.fetch_result),
            resume_running_ms: millis(schedule.resume_running),
            resume_result_ms: millis(schedule.resume_result),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub stages: StageDelays,
    pub items_per_page: usize,
    pub log: LogDestination,
    pub log_file: PathBuf,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            base_url: client.base_url,
            token: None,
            connect_timeout_ms: millis(client.connect_timeout),
            request_timeout_ms: millis(client.request_timeout),
            stages: StageDelays::default(),
            items_per_page: DEFAULT_PAGE_SIZE,
            log: LogDestination::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            debug: false,
        }
    }
}

impl AppConfig {
    /// Reads `path`, or `./crawl.ron` if it exists, or falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// A non-empty token from the environment replaces the configured one.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(TOKEN_ENV).filter(|token| !token.trim().is_empty()) {
            self.token = Some(token);
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn stage_schedule(&self) -> StageSchedule {
        StageSchedule {
            enqueue: Duration::from_millis(self.stages.enqueue_ms),
            set_running: Duration::from_millis(self.stages.running_ms),
            fetch_result: Duration::from_millis(self.stages.result_ms),
            resume_running: Duration::from_millis(self.stages.resume_running_ms),
            resume_result: Duration::from_millis(self.stages.resume_result_ms),
        }
    }

    /// How long the session may sit without any message before it gives up.
    pub fn idle_timeout(&self) -> Duration {
        let longest_stage = self
            .stages
            .result_ms
            .max(self.stages.resume_result_ms)
            .max(self.stages.running_ms);
        Duration::from_millis(self.request_timeout_ms + longest_stage) + Duration::from_secs(5)
    }
}
