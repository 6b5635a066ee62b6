// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email queue consumed by the reminder sweep.

use crate::error::DevmatchError;
use crate::types::TrialEndingNotice;

/// An asynchronous outbound email queue.
///
/// Enqueue operations must not block: implementations hand the notice to a
/// background sender and return immediately, failing only when the notice
/// cannot be accepted at all.
pub trait EmailQueue: Send + Sync + 'static {
    /// Enqueues a "your free trial is ending" notification.
    fn queue_notify_free_trial_ending(&self, notice: TrialEndingNotice)
    -> Result<(), DevmatchError>;
}
