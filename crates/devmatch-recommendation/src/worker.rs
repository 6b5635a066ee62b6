// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use devmatch_core::{DevmatchError, RecommendationConnector, RecommendationService};
use devmatch_resilience::{RetryDecision, RetryPolicy, RetryQueue};

use crate::job::RecommendationJob;

pub(crate) type SharedQueue = Arc<Mutex<mpsc::Receiver<RecommendationJob>>>;

pub(crate) struct Worker {
    pub id: usize,
    pub queue: SharedQueue,
    pub connector: Arc<dyn RecommendationConnector>,
    pub retry: RetryQueue<RecommendationJob>,
    pub policy: RetryPolicy,
    pub rpc_timeout: Duration,
    pub cancel: CancellationToken,
}

impl Worker {
    pub async fn run(self) {
        let mut service = match self.connector.connect().await {
            Ok(service) => Some(service),
            Err(e) => {
                warn!(worker = self.id, error = %e, "recommendation service unreachable at startup");
                None
            }
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                job = async { self.queue.lock().await.recv().await } => job,
            };
            let Some(job) = next else { break };
            self.process(&mut service, job).await;
        }

        info!(worker = self.id, "recommendation worker stopped");
    }

    async fn process(
        &self,
        service: &mut Option<Box<dyn RecommendationService>>,
        mut job: RecommendationJob,
    ) {
        let attempt = dispatch(service, self.connector.as_ref(), &job);
        let result = tokio::time::timeout(self.rpc_timeout, attempt)
            .await
            .unwrap_or(Err(DevmatchError::Timeout {
                duration: self.rpc_timeout,
            }));

        let Err(e) = result else {
            debug!(worker = self.id, kind = %job.kind, id = %job.id, "recommendation call succeeded");
            return;
        };

        *service = None;
        job.attempts += 1;
        match self.policy.decide(job.attempts, job.max_attempts) {
            RetryDecision::Retry(delay) => {
                warn!(
                    worker = self.id,
                    kind = %job.kind,
                    id = %job.id,
                    attempts = job.attempts,
                    retry_in = ?delay,
                    error = %e,
                    "recommendation call failed, retrying"
                );
                let (kind, id) = (job.kind, job.id.clone());
                if !self.retry.schedule(job, delay) {
                    warn!(worker = self.id, %kind, %id, "retry queue closed, dropping recommendation job");
                }
            }
            RetryDecision::GiveUp => {
                error!(
                    worker = self.id,
                    kind = %job.kind,
                    id = %job.id,
                    attempts = job.attempts,
                    error = %e,
                    "recommendation job dropped after exhausting retries"
                );
            }
        }
    }
}

async fn dispatch(
    slot: &mut Option<Box<dyn RecommendationService>>,
    connector: &dyn RecommendationConnector,
    job: &RecommendationJob,
) -> Result<(), DevmatchError> {
    let service = match slot.take() {
        Some(service) => slot.insert(service),
        None => slot.insert(connector.connect().await?),
    };
    service.call(job.request()).await
}
