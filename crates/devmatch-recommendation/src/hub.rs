// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The recommendation hub.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use devmatch_core::{HealthStatus, RecommendationConnector};
use devmatch_resilience::{RetryPolicy, RetryQueue};

use crate::job::{DEFAULT_MAX_ATTEMPTS, RecommendationJob, RecommendationKind};
use crate::worker::Worker;

/// Mirrors `RecommendationConfig` from `devmatch-config`.
#[derive(Debug, Clone)]
pub struct RecommendationHubConfig {
    pub queue_size: usize,
    pub workers: usize,
    pub rpc_timeout: Duration,
    pub retry: RetryPolicy,
    /// Attempt bound stamped on every job.
    pub max_attempts: u32,
}

impl Default for RecommendationHubConfig {
    fn default() -> Self {
        Self {
            queue_size: 100,
            workers: 2,
            rpc_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Asks the recommendation service to recompute results for users and projects.
#[derive(Clone)]
pub struct RecommendationHub {
    tx: mpsc::Sender<RecommendationJob>,
    capacity: usize,
    max_attempts: u32,
    cancel: CancellationToken,
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl RecommendationHub {
    pub fn start(
        config: RecommendationHubConfig,
        connector: Arc<dyn RecommendationConnector>,
    ) -> Self {
        let capacity = config.queue_size.max(1);
        let workers = config.workers.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let queue = Arc::new(Mutex::new(rx));
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();

        let (retry, retry_task) = RetryQueue::spawn("recommendation", tx.clone(), cancel.clone());
        tasks.spawn(async move {
            if let Err(e) = retry_task.await {
                warn!(error = %e, "recommendation retry queue task failed");
            }
        });

        for id in 0..workers {
            tasks.spawn(
                Worker {
                    id,
                    queue: Arc::clone(&queue),
                    connector: Arc::clone(&connector),
                    retry: retry.clone(),
                    policy: config.retry,
                    rpc_timeout: config.rpc_timeout,
                    cancel: cancel.clone(),
                }
                .run(),
            );
        }

        info!(workers, queue_size = capacity, "recommendation hub started");

        Self {
            tx,
            capacity,
            max_attempts: config.max_attempts,
            cancel,
            tasks: Arc::new(Mutex::new(tasks)),
        }
    }

    pub async fn queue_user_recommendation(&self, id: impl Into<String>) {
        self.enqueue(RecommendationKind::UserRec, id.into()).await;
    }

    pub async fn queue_project_recommendation(&self, id: impl Into<String>) {
        self.enqueue(RecommendationKind::ProjectRec, id.into()).await;
    }

    async fn enqueue(&self, kind: RecommendationKind, id: String) {
        let job = RecommendationJob::new(kind, id, self.max_attempts);
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!(%kind, "recommendation hub is shut down, dropping job");
            }
            sent = self.tx.send(job) => {
                if sent.is_err() {
                    warn!(%kind, "recommendation queue closed, dropping job");
                }
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.capacity - self.tx.capacity()
    }

    /// Bound of the job queue.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn health(&self) -> HealthStatus {
        if self.cancel.is_cancelled() {
            HealthStatus::Unhealthy("shut down".to_string())
        } else if self.pending() == self.capacity {
            HealthStatus::Degraded("queue full".to_string())
        } else {
            HealthStatus::Healthy
        }
    }

    /// Stops the workers after their in-flight calls and waits for them.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let mut tasks = self.tasks.lock().await;
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "recommendation task ended abnormally");
            }
        }
        info!("recommendation hub stopped");
    }
}
