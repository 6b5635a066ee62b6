// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recommendation recompute pipeline.
//!
//! Same topology as the embedding hub: one bounded queue, a worker pool with
//! a connection per worker, linear backoff on failure. Jobs carry only the
//! id of the user or project whose recommendations must be recomputed.

pub mod hub;
pub mod job;
pub mod rpc;
mod worker;

pub use hub::{RecommendationHub, RecommendationHubConfig};
pub use job::{RecommendationJob, RecommendationKind};
pub use rpc::GrpcRecommendationConnector;
