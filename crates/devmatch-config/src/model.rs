// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level devmatch configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DevmatchConfig {
    /// HTTP listener and logging settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Embedding job pipeline settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Recommendation trigger pipeline settings.
    #[serde(default)]
    pub recommendation: RecommendationConfig,

    /// Websocket chat hub settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Reminder scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbound SMTP settings.
    #[serde(default)]
    pub email: EmailConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the HTTP/websocket listener to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Embedding hub configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Capacity of the bounded job queue. Producers block when it is full.
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// Number of workers, each with its own RPC connection.
    #[serde(default = "default_embedding_workers")]
    pub workers: usize,

    /// Endpoint of the embedding service.
    #[serde(default = "default_embedding_rpc_address")]
    pub rpc_address: String,

    /// Per-call deadline in seconds.
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,

    /// Linear backoff step: retry `n` waits `n * backoff_step_secs`.
    #[serde(default = "default_backoff_step_secs")]
    pub backoff_step_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            queue_size: default_queue_size(),
            workers: default_embedding_workers(),
            rpc_address: default_embedding_rpc_address(),
            rpc_timeout_secs: default_rpc_timeout_secs(),
            backoff_step_secs: default_backoff_step_secs(),
        }
    }
}

fn default_queue_size() -> usize {
    100
}

fn default_embedding_workers() -> usize {
    4
}

fn default_embedding_rpc_address() -> String {
    "http://127.0.0.1:50051".to_string()
}

fn default_rpc_timeout_secs() -> u64 {
    30
}

fn default_backoff_step_secs() -> u64 {
    3
}

/// Recommendation hub configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendationConfig {
    /// Capacity of the bounded job queue.
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// Number of workers.
    #[serde(default = "default_recommendation_workers")]
    pub workers: usize,

    /// Endpoint of the recommendation service.
    #[serde(default = "default_recommendation_rpc_address")]
    pub rpc_address: String,

    /// Per-call deadline in seconds.
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,

    /// Linear backoff step in seconds.
    #[serde(default = "default_backoff_step_secs")]
    pub backoff_step_secs: u64,

    /// Attempt bound for every recommendation job, first try included.
    #[serde(default = "default_recommendation_max_attempts")]
    pub max_attempts: u32,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            queue_size: default_queue_size(),
            workers: default_recommendation_workers(),
            rpc_address: default_recommendation_rpc_address(),
            rpc_timeout_secs: default_rpc_timeout_secs(),
            backoff_step_secs: default_backoff_step_secs(),
            max_attempts: default_recommendation_max_attempts(),
        }
    }
}

fn default_recommendation_workers() -> usize {
    2
}

fn default_recommendation_rpc_address() -> String {
    "http://127.0.0.1:50052".to_string()
}

fn default_recommendation_max_attempts() -> u32 {
    3
}

/// Chat hub configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Buffer size of the broadcast intake channel.
    #[serde(default = "default_broadcast_buffer")]
    pub broadcast_buffer: usize,

    /// Outbound buffer size per client. A client whose buffer is full when a
    /// broadcast arrives is evicted.
    #[serde(default = "default_client_buffer")]
    pub client_buffer: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            broadcast_buffer: default_broadcast_buffer(),
            client_buffer: default_client_buffer(),
        }
    }
}

fn default_broadcast_buffer() -> usize {
    256
}

fn default_client_buffer() -> usize {
    256
}

/// Timezone used to evaluate cron expressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CronTimezone {
    /// Server-local time.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
}

/// Reminder scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Cron expression for the trial-ending reminder sweep.
    #[serde(default = "default_trial_cron")]
    pub trial_cron: String,

    /// Width of the look-ahead window in hours.
    #[serde(default = "default_reminder_window_hours")]
    pub reminder_window_hours: u32,

    /// Timezone the cron expression is evaluated in.
    #[serde(default)]
    pub timezone: CronTimezone,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            trial_cron: default_trial_cron(),
            reminder_window_hours: default_reminder_window_hours(),
            timezone: CronTimezone::default(),
        }
    }
}

fn default_trial_cron() -> String {
    "0 9 * * *".to_string()
}

fn default_reminder_window_hours() -> u32 {
    48
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("devmatch").join("devmatch.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("devmatch.db"))
        .to_string_lossy()
        .into_owned()
}

/// Outbound SMTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmailConfig {
    /// Deliver email. When disabled, notices are logged and discarded.
    #[serde(default)]
    pub enabled: bool,

    /// SMTP relay host.
    #[serde(default)]
    pub smtp_host: Option<String>,

    /// SMTP relay port (STARTTLS).
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username.
    #[serde(default)]
    pub smtp_username: Option<String>,

    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,

    /// Sender address, e.g. `Devmatch <noreply@devmatch.dev>`.
    #[serde(default)]
    pub from_address: Option<String>,

    /// Capacity of the outbound email queue.
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            from_address: None,
            queue_size: default_queue_size(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}
