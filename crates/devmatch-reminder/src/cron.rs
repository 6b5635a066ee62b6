// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A tokio-driven cron scheduler.
//!
//! Each registered job gets its own task that sleeps until the next
//! occurrence of its expression, runs the job to completion, and repeats.
//! Runs of one job never overlap.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use croner::Cron;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use devmatch_core::{DevmatchError, JobScheduler, ScheduledTask};

/// Time zone cron expressions are evaluated in.
///
/// Mirrors `CronTimezone` from `devmatch-config`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CronZone {
    #[default]
    Local,
    Utc,
}

pub struct CronScheduler {
    zone: CronZone,
    cancel: CancellationToken,
    jobs: Mutex<Vec<JoinHandle<()>>>,
}

impl CronScheduler {
    pub fn new(zone: CronZone, cancel: CancellationToken) -> Self {
        Self {
            zone,
            cancel,
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Stops all jobs and waits for their tasks. A running job is allowed
    /// to finish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let jobs = std::mem::take(&mut *self.jobs.lock().unwrap_or_else(|p| p.into_inner()));
        for job in jobs {
            if let Err(e) = job.await {
                warn!(error = %e, "cron job task ended abnormally");
            }
        }
    }
}

impl JobScheduler for CronScheduler {
    fn schedule(
        &self,
        name: &str,
        cron_expr: &str,
        task: ScheduledTask,
    ) -> Result<(), DevmatchError> {
        if self.cancel.is_cancelled() {
            return Err(DevmatchError::Scheduler(format!(
                "cannot schedule `{name}`: scheduler stopped"
            )));
        }
        let cron: Cron = cron_expr.parse().map_err(|e| {
            DevmatchError::Scheduler(format!("invalid cron expression `{cron_expr}` for `{name}`: {e}"))
        })?;
        // Reject expressions that can never fire.
        delay_until_next(&cron, self.zone)?;

        let handle = tokio::spawn(run_job(
            name.to_string(),
            cron,
            self.zone,
            task,
            self.cancel.clone(),
        ));
        self.jobs
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(handle);
        info!(job = name, cron = cron_expr, zone = ?self.zone, "cron job registered");
        Ok(())
    }
}

async fn run_job(
    name: String,
    cron: Cron,
    zone: CronZone,
    task: ScheduledTask,
    cancel: CancellationToken,
) {
    loop {
        let delay = match delay_until_next(&cron, zone) {
            Ok(delay) => delay,
            Err(e) => {
                error!(job = %name, error = %e, "cron job has no next occurrence");
                break;
            }
        };
        debug!(job = %name, in_secs = delay.as_secs(), "cron job sleeping");

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        debug!(job = %name, "cron job firing");
        task().await;
    }
    debug!(job = %name, "cron job stopped");
}

fn delay_until_next(cron: &Cron, zone: CronZone) -> Result<Duration, DevmatchError> {
    match zone {
        CronZone::Local => delay_from(cron, Local::now()),
        CronZone::Utc => delay_from(cron, Utc::now()),
    }
}

fn delay_from<Tz: TimeZone>(cron: &Cron, now: DateTime<Tz>) -> Result<Duration, DevmatchError> {
    let next = cron
        .find_next_occurrence(&now, false)
        .map_err(|e| DevmatchError::Scheduler(format!("cannot compute next occurrence: {e}")))?;
    Ok((next - now).to_std().unwrap_or(Duration::ZERO))
}
