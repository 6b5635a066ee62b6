// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the devmatch core.

use thiserror::Error;

use crate::types::RpcService;

/// The primary error type used across all devmatch adapter traits and core operations.
#[derive(Debug, Error)]
pub enum DevmatchError {
    /// Configuration errors (invalid TOML, bad cron expression, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote procedure call failures (transport, status, connect).
    #[error("{service} rpc error: {message}")]
    Rpc {
        service: RpcService,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Email queue errors (queue full, transport failure, bad address).
    #[error("email error: {message}")]
    Email {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Job scheduler registration errors.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// A hub queue was closed because the hub has shut down.
    #[error("{0} queue is closed")]
    QueueClosed(&'static str),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
