// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators of the core.
//!
//! All async traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod email;
pub mod embedding;
pub mod recommendation;
pub mod scheduler;
pub mod storage;

pub use email::EmailQueue;
pub use embedding::{EmbeddingConnector, EmbeddingRequest, EmbeddingService};
pub use recommendation::{RecommendationConnector, RecommendationRequest, RecommendationService};
pub use scheduler::{JobScheduler, ScheduledTask};
pub use storage::ReminderStore;
