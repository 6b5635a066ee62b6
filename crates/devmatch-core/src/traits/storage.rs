// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage queries consumed by the reminder sweep.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DevmatchError;
use crate::types::TrialUser;

/// Database collaborator for the trial-ending reminder sweep.
#[async_trait]
pub trait ReminderStore: Send + Sync + 'static {
    /// Returns users whose free trial ends inside `[window_start, window_end]`
    /// and who have not been sent a reminder yet.
    async fn fetch_trial_ending_users(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<TrialUser>, DevmatchError>;

    /// Marks every listed user as reminded in a single transaction.
    async fn update_sent_reminder(&self, user_ids: &[String]) -> Result<(), DevmatchError>;
}
