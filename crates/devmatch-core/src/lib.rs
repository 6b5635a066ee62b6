// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the devmatch asynchronous effects core.
//!
//! This crate provides the error type, the domain facets shared by the hubs,
//! and the adapter traits placed at every external seam: the embedding and
//! recommendation RPC services, the reminder store, the email queue, and the
//! job scheduler.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::DevmatchError;
pub use types::{HealthStatus, ProjectFacet, RpcService, TrialEndingNotice, TrialUser, UserFacet};

pub use traits::{
    EmailQueue, EmbeddingConnector, EmbeddingRequest, EmbeddingService, JobScheduler,
    RecommendationConnector, RecommendationRequest, RecommendationService, ReminderStore,
    ScheduledTask,
};
