// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Free-trial ending reminders.
//!
//! [`ReminderScheduler::sweep`] finds users whose trial ends within the
//! reminder window, queues one email each and flags them as reminded.
//! [`trial_ending_reminders`] registers the sweep with a [`JobScheduler`];
//! [`CronScheduler`] is the production scheduler.
//!
//! [`JobScheduler`]: devmatch_core::JobScheduler

pub mod cron;
pub mod format;
pub mod sweep;

pub use cron::{CronScheduler, CronZone};
pub use sweep::{
    DEFAULT_TRIAL_CRON, ReminderScheduler, SweepSummary, TRIAL_ENDING_JOB, trial_ending_reminders,
};
