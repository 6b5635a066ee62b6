// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding worker loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use devmatch_core::{DevmatchError, EmbeddingConnector, EmbeddingService};
use devmatch_resilience::{RetryDecision, RetryPolicy, RetryQueue};

use crate::job::EmbeddingJob;

pub(crate) type SharedQueue = Arc<Mutex<mpsc::Receiver<EmbeddingJob>>>;

pub(crate) struct Worker {
    pub id: usize,
    pub queue: SharedQueue,
    pub connector: Arc<dyn EmbeddingConnector>,
    pub retry: RetryQueue<EmbeddingJob>,
    pub policy: RetryPolicy,
    pub rpc_timeout: Duration,
    pub cancel: CancellationToken,
}

impl Worker {
    pub async fn run(self) {
        let Worker {
            id,
            queue,
            connector,
            retry,
            policy,
            rpc_timeout,
            cancel,
        } = self;

        // Dedicated connection, opened eagerly and re-opened lazily after errors.
        let mut service = match connector.connect().await {
            Ok(service) => Some(service),
            Err(e) => {
                warn!(worker = id, error = %e, "embedding service unreachable at startup");
                None
            }
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                job = async { queue.lock().await.recv().await } => job,
            };
            let Some(mut job) = next else { break };

            let attempt = dispatch(&mut service, connector.as_ref(), &job);
            let result = match tokio::time::timeout(rpc_timeout, attempt).await {
                Ok(result) => result,
                Err(_) => Err(DevmatchError::Timeout {
                    duration: rpc_timeout,
                }),
            };

            let Err(e) = result else {
                debug!(worker = id, kind = %job.kind(), id = job.event.subject_id(), "embedding call succeeded");
                continue;
            };

            // Reconnect on the next job.
            service = None;
            job.attempts += 1;
            match policy.decide(job.attempts, job.max_attempts) {
                RetryDecision::Retry(delay) => {
                    warn!(
                        worker = id,
                        kind = %job.kind(),
                        id = job.event.subject_id(),
                        attempts = job.attempts,
                        max_attempts = job.max_attempts,
                        retry_in = ?delay,
                        error = %e,
                        "embedding call failed, retrying"
                    );
                    let (kind, subject) = (job.kind(), job.event.subject_id().to_string());
                    if !retry.schedule(job, delay) {
                        warn!(worker = id, %kind, id = subject, "retry queue closed, dropping embedding job");
                    }
                }
                RetryDecision::GiveUp => {
                    error!(
                        worker = id,
                        kind = %job.kind(),
                        id = job.event.subject_id(),
                        attempts = job.attempts,
                        error = %e,
                        "embedding job dropped after exhausting retries"
                    );
                }
            }
        }

        info!(worker = id, "embedding worker stopped");
    }
}

async fn dispatch(
    slot: &mut Option<Box<dyn EmbeddingService>>,
    connector: &dyn EmbeddingConnector,
    job: &EmbeddingJob,
) -> Result<(), DevmatchError> {
    let service = match slot.take() {
        Some(service) => slot.insert(service),
        None => slot.insert(connector.connect().await?),
    };
    service.call(job.request()).await
}
