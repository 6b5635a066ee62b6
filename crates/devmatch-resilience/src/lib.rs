// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry primitives shared by the embedding and recommendation hubs.
//!
//! - [`RetryPolicy`]: linear backoff and the attempt bound decision.
//! - [`RetryQueue`]: a delay queue that feeds failed jobs back into a hub's
//!   bounded queue once their backoff has elapsed.

pub mod policy;
pub mod retry_queue;

pub use policy::{RetryDecision, RetryPolicy};
pub use retry_queue::RetryQueue;
