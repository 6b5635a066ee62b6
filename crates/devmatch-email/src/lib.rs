// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound email.
//!
//! [`SmtpEmailQueue`] implements [`EmailQueue`](devmatch_core::EmailQueue):
//! enqueueing never waits, and a background task delivers queued notices
//! through an SMTP relay. With delivery disabled the task only logs them.

pub mod queue;
pub mod template;

pub use queue::{EmailSettings, SmtpEmailQueue};
