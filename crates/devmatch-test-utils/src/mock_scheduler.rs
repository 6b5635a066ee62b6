// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A job scheduler that only fires when told to.

use std::sync::{Arc, Mutex};

use devmatch_core::{DevmatchError, JobScheduler, ScheduledTask};

#[derive(Clone)]
struct Registration {
    name: String,
    cron_expr: String,
    task: ScheduledTask,
}

/// Records registrations; tests trigger them with [`fire`](Self::fire).
#[derive(Clone, Default)]
pub struct ManualScheduler {
    registrations: Arc<Mutex<Vec<Registration>>>,
    reject: bool,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scheduler that refuses every registration.
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    /// Names and cron expressions registered so far.
    pub fn registered(&self) -> Vec<(String, String)> {
        self.registrations
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .map(|r| (r.name.clone(), r.cron_expr.clone()))
            .collect()
    }

    /// Runs the task registered under `name` once. Returns `false` if none is.
    pub async fn fire(&self, name: &str) -> bool {
        let task = self
            .registrations
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.task.clone());
        match task {
            Some(task) => {
                task().await;
                true
            }
            None => false,
        }
    }
}

impl JobScheduler for ManualScheduler {
    fn schedule(
        &self,
        name: &str,
        cron_expr: &str,
        task: ScheduledTask,
    ) -> Result<(), DevmatchError> {
        if self.reject {
            return Err(DevmatchError::Scheduler(format!(
                "registration of `{name}` refused"
            )));
        }
        self.registrations
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(Registration {
                name: name.to_string(),
                cron_expr: cron_expr.to_string(),
                task,
            });
        Ok(())
    }
}
