// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding job pipeline.
//!
//! HTTP handlers call one of the eight `queue_*` operations on
//! [`EmbeddingHub`] after committing a user or project mutation. The hub
//! places a job on a bounded queue and returns; a pool of workers, each with
//! its own connection to the embedding service, drains the queue and retries
//! failed calls with linear backoff.

pub mod hub;
pub mod job;
pub mod rpc;
mod worker;

pub use hub::{EmbeddingHub, EmbeddingHubConfig};
pub use job::{EmbeddingEvent, EmbeddingJob, EmbeddingKind};
pub use rpc::GrpcEmbeddingConnector;
