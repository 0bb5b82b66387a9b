//! Configuration loading and management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Listener and storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the JSON task file.
    #[serde(default = "default_tasks_path")]
    pub tasks_path: PathBuf,

    /// Cap on concurrent client connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tasks_path: default_tasks_path(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_tasks_path() -> PathBuf {
    PathBuf::from("tasks.json")
}

fn default_max_connections() -> usize {
    256
}

/// Reminder scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between due-task scans.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,

    /// Upper bound on one notifier call; a timeout is retried next tick.
    #[serde(default = "default_notify_timeout_seconds")]
    pub notify_timeout_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_seconds: default_tick_seconds(),
            notify_timeout_seconds: default_notify_timeout_seconds(),
        }
    }
}

impl SchedulerConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_seconds)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_seconds)
    }
}

fn default_tick_seconds() -> u64 {
    30
}

fn default_notify_timeout_seconds() -> u64 {
    60
}

/// Outbound notification settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// External command to run per reminder; target and message are appended
    /// as the final two arguments. When unset, reminders are only logged.
    #[serde(default)]
    pub command: Option<String>,

    /// Fixed arguments placed before target and message.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default location or return defaults with
    /// environment-variable overrides.
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::load("lembrete.yaml") {
            return config;
        }

        let mut config = Self::default();

        if let Ok(host) = std::env::var("LEMBRETE_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = std::env::var("LEMBRETE_PORT") {
            if let Ok(port) = port.parse() {
                config.server.port = port;
            }
        }

        if let Ok(path) = std::env::var("LEMBRETE_TASKS_PATH") {
            config.server.tasks_path = PathBuf::from(path);
        }

        if let Ok(tick) = std::env::var("LEMBRETE_TICK_SECONDS") {
            if let Ok(tick) = tick.parse() {
                config.scheduler.tick_seconds = tick;
            }
        }

        config
    }

    /// The `host:port` pair handed to the TCP listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
