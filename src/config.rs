use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration, loadable from a TOML file. Every field has
/// a default so a missing or partial file still yields a working setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// HTTP base URL of the automation backend
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// WebSocket base URL; derived from `base_url` when unset
    #[serde(default)]
    pub ws_url: Option<String>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: None,
        }
    }
}

impl BackendConfig {
    /// WebSocket base for the push channel: the explicit `ws_url` when
    /// configured, otherwise `base_url` with its scheme swapped
    /// (`http -> ws`, `https -> wss`).
    pub fn ws_base(&self) -> String {
        if let Some(ws_url) = &self.ws_url {
            return ws_url.trim_end_matches('/').to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Estimated number of steps a run takes (default: 10). An estimate
    /// for the percentage display, not a hard bound.
    #[serde(default = "default_expected_steps")]
    pub expected_steps: usize,
}

fn default_expected_steps() -> usize {
    10
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            expected_steps: default_expected_steps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Capacity of the per-channel event queue (default: 256)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    256
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level when RUST_LOG is unset (default: "info")
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Write logs to a file instead of stderr (default: false)
    #[serde(default)]
    pub to_file: bool,
    /// Directory for log files (default: ".courier/logs")
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_logs_dir() -> String {
    ".courier/logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: false,
            logs_dir: default_logs_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
