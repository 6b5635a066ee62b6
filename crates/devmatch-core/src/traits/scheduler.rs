// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic job scheduling primitive.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::DevmatchError;

/// A task fired by the scheduler. Called once per trigger.
pub type ScheduledTask = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Registers tasks against cron expressions.
pub trait JobScheduler: Send + Sync {
    /// Registers `task` to run whenever `cron_expr` fires.
    ///
    /// Fails if the expression does not parse or the scheduler has stopped.
    fn schedule(
        &self,
        name: &str,
        cron_expr: &str,
        task: ScheduledTask,
    ) -> Result<(), DevmatchError>;
}
