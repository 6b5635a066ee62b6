// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reminder sweep and its installer.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use futures::FutureExt;
use tracing::{error, info, warn};

use devmatch_core::{
    DevmatchError, EmailQueue, JobScheduler, ReminderStore, ScheduledTask, TrialEndingNotice,
};

use crate::format;

/// Daily at 09:00.
pub const DEFAULT_TRIAL_CRON: &str = "0 9 * * *";

/// Name the sweep is registered under.
pub const TRIAL_ENDING_JOB: &str = "trial_ending_reminders";

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Users in the window who had not been reminded.
    pub found: usize,
    pub queued: usize,
    /// Users whose email could not be queued. They are flagged anyway.
    pub failed: usize,
}

pub struct ReminderScheduler {
    store: Arc<dyn ReminderStore>,
    email: Arc<dyn EmailQueue>,
    window: TimeDelta,
}

impl ReminderScheduler {
    pub fn new(store: Arc<dyn ReminderStore>, email: Arc<dyn EmailQueue>, window: TimeDelta) -> Self {
        Self {
            store,
            email,
            window,
        }
    }

    /// Reminds every user whose trial ends in `[now, now + window]`.
    ///
    /// A store error aborts the sweep before anything is sent or flagged.
    /// Email failures are logged per user and do not stop the batch.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepSummary, DevmatchError> {
        let window_end = now + self.window;
        let users = self
            .store
            .fetch_trial_ending_users(now, window_end)
            .await?;

        let mut summary = SweepSummary {
            found: users.len(),
            ..SweepSummary::default()
        };
        if users.is_empty() {
            return Ok(summary);
        }

        for user in &users {
            let notice = TrialEndingNotice {
                username: user.username.clone(),
                trial_end: format::trial_end_date(user.free_trial),
                time_left: format::time_left(user.free_trial - now),
                email: user.email.clone(),
            };
            match self.email.queue_notify_free_trial_ending(notice) {
                Ok(()) => summary.queued += 1,
                Err(e) => {
                    summary.failed += 1;
                    warn!(user_id = %user.id, error = %e, "failed to queue trial reminder");
                }
            }
        }

        let ids: Vec<String> = users.into_iter().map(|u| u.id).collect();
        self.store.update_sent_reminder(&ids).await?;
        Ok(summary)
    }

    /// One scheduled run at the current time. Errors are logged.
    pub async fn tick(&self) {
        match self.sweep(Utc::now()).await {
            Ok(summary) if summary.found == 0 => {
                info!("trial reminder sweep found no users");
            }
            Ok(summary) => {
                info!(
                    found = summary.found,
                    queued = summary.queued,
                    failed = summary.failed,
                    "trial reminder sweep complete"
                );
            }
            Err(e) => error!(error = %e, "trial reminder sweep aborted"),
        }
    }
}

/// Registers the daily sweep with `scheduler`.
///
/// Only registration errors are returned; sweep failures are logged when the
/// job runs.
pub fn trial_ending_reminders(
    scheduler: &dyn JobScheduler,
    cron_expr: &str,
    reminder: Arc<ReminderScheduler>,
) -> Result<(), DevmatchError> {
    let task: ScheduledTask = Arc::new(move || {
        let reminder = Arc::clone(&reminder);
        async move { reminder.tick().await }.boxed()
    });
    scheduler.schedule(TRIAL_ENDING_JOB, cron_expr, task)?;
    info!(cron = cron_expr, "trial ending reminders scheduled");
    Ok(())
}
