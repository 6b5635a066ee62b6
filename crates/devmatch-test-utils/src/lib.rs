// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for devmatch.
//!
//! Provides mock collaborators for fast, deterministic tests without
//! external services.
//!
//! # Components
//!
//! - [`MockRpc`] - Scripted embedding/recommendation service with a call log
//! - [`MemoryReminderStore`] - In-memory users table for the reminder sweep
//! - [`CapturingEmailQueue`] - Email queue that records every notice
//! - [`ManualScheduler`] - Job scheduler fired by hand

pub mod mock_rpc;
pub mod mock_scheduler;
pub mod mock_store;

pub use mock_rpc::{MockEmbeddingService, MockRecommendationService, MockRpc, RecordedCall};
pub use mock_scheduler::ManualScheduler;
pub use mock_store::{CapturingEmailQueue, MemoryReminderStore};
