// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The embedding hub: a bounded job queue drained by a worker pool.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use devmatch_core::{EmbeddingConnector, HealthStatus, ProjectFacet, UserFacet};
use devmatch_resilience::{RetryPolicy, RetryQueue};

use crate::job::{EmbeddingEvent, EmbeddingJob};
use crate::worker::Worker;

/// Embedding hub construction parameters.
///
/// Mirrors `EmbeddingConfig` from `devmatch-config` so this crate does not
/// depend on the config crate.
#[derive(Debug, Clone)]
pub struct EmbeddingHubConfig {
    /// Bound on queued jobs. Producers block while the queue is full.
    pub queue_size: usize,
    /// Worker pool size.
    pub workers: usize,
    /// Deadline for a single call, connection included.
    pub rpc_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for EmbeddingHubConfig {
    fn default() -> Self {
        Self {
            queue_size: 100,
            workers: 4,
            rpc_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Fans user and project mutations out to the embedding service.
///
/// Cloning the hub is cheap; all clones feed the same queue.
#[derive(Clone)]
pub struct EmbeddingHub {
    tx: mpsc::Sender<EmbeddingJob>,
    capacity: usize,
    cancel: CancellationToken,
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl EmbeddingHub {
    /// Starts the worker pool and the retry queue.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: EmbeddingHubConfig, connector: Arc<dyn EmbeddingConnector>) -> Self {
        let capacity = config.queue_size.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let queue = Arc::new(Mutex::new(rx));
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();

        let (retry, retry_task) = RetryQueue::spawn("embedding", tx.clone(), cancel.clone());
        tasks.spawn(async move {
            if let Err(e) = retry_task.await {
                warn!(error = %e, "embedding retry queue task failed");
            }
        });

        for id in 0..config.workers.max(1) {
            let worker = Worker {
                id,
                queue: Arc::clone(&queue),
                connector: Arc::clone(&connector),
                retry: retry.clone(),
                policy: config.retry,
                rpc_timeout: config.rpc_timeout,
                cancel: cancel.clone(),
            };
            tasks.spawn(worker.run());
        }

        info!(
            workers = config.workers.max(1),
            queue_size = capacity,
            "embedding hub started"
        );

        Self {
            tx,
            capacity,
            cancel,
            tasks: Arc::new(Mutex::new(tasks)),
        }
    }

    pub async fn queue_user_create(&self, user: UserFacet) {
        self.enqueue(EmbeddingEvent::UserCreate(user)).await;
    }

    pub async fn queue_user_update(&self, user: UserFacet) {
        self.enqueue(EmbeddingEvent::UserUpdate(user)).await;
    }

    pub async fn queue_user_update_status(&self, id: impl Into<String>, status: bool) {
        self.enqueue(EmbeddingEvent::UserStatus {
            id: id.into(),
            status,
        })
        .await;
    }

    pub async fn queue_user_delete(&self, id: impl Into<String>) {
        self.enqueue(EmbeddingEvent::UserDelete { id: id.into() })
            .await;
    }

    pub async fn queue_project_create(&self, project: ProjectFacet) {
        self.enqueue(EmbeddingEvent::ProjectCreate(project)).await;
    }

    pub async fn queue_project_update(&self, project: ProjectFacet) {
        self.enqueue(EmbeddingEvent::ProjectUpdate(project)).await;
    }

    pub async fn queue_project_update_status(&self, id: impl Into<String>, status: bool) {
        self.enqueue(EmbeddingEvent::ProjectStatus {
            id: id.into(),
            status,
        })
        .await;
    }

    pub async fn queue_project_delete(&self, id: impl Into<String>) {
        self.enqueue(EmbeddingEvent::ProjectDelete { id: id.into() })
            .await;
    }

    /// Offers a job to the queue, waiting while it is full.
    ///
    /// Never fails: after shutdown the job is logged and dropped.
    pub async fn enqueue_job(&self, job: EmbeddingJob) {
        let kind = job.kind();
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!(%kind, "embedding hub is shut down, dropping job");
            }
            sent = self.tx.send(job) => {
                if sent.is_err() {
                    warn!(%kind, "embedding queue closed, dropping job");
                }
            }
        }
    }

    async fn enqueue(&self, event: EmbeddingEvent) {
        self.enqueue_job(EmbeddingJob::new(event)).await;
    }

    /// Jobs waiting in the queue.
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

    /// Stops the hub.
    ///
    /// Workers finish their in-flight call and exit; queued jobs and pending
    /// retries are abandoned. Returns once every task has stopped.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let mut tasks = self.tasks.lock().await;
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "embedding task ended abnormally");
            }
        }
        info!("embedding hub stopped");
    }
}
