// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delayed re-enqueue of failed jobs.
//!
//! Workers hand a failed job to the [`RetryQueue`] and go straight back to
//! the hub queue. A single background task owns a [`DelayQueue`] keyed by
//! ready time and pushes each job into the hub's bounded queue when its
//! backoff expires. Cancelling the hub's token stops the task and abandons
//! any jobs still waiting.

use std::future::poll_fn;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::time::DelayQueue;
use tracing::debug;

/// Handle for scheduling delayed re-enqueues. Cheap to clone.
#[derive(Debug)]
pub struct RetryQueue<J> {
    tx: mpsc::UnboundedSender<(J, Duration)>,
}

impl<J> Clone for RetryQueue<J> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<J: Send + 'static> RetryQueue<J> {
    /// Spawns the delay task feeding `target` and returns its handle.
    ///
    /// `name` labels log lines, e.g. `"embedding"`.
    pub fn spawn(
        name: &'static str,
        target: mpsc::Sender<J>,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(name, rx, target, cancel));
        (Self { tx }, handle)
    }

    /// Re-enqueues `job` after `delay`. Never blocks.
    ///
    /// Returns `false` if the delay task has stopped; the job is dropped.
    pub fn schedule(&self, job: J, delay: Duration) -> bool {
        self.tx.send((job, delay)).is_ok()
    }
}

async fn run<J>(
    name: &'static str,
    mut rx: mpsc::UnboundedReceiver<(J, Duration)>,
    target: mpsc::Sender<J>,
    cancel: CancellationToken,
) {
    let mut delays: DelayQueue<J> = DelayQueue::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            Some((job, delay)) = rx.recv() => {
                delays.insert(job, delay);
            }
            Some(expired) = poll_fn(|cx| delays.poll_expired(cx)), if !delays.is_empty() => {
                // Blocks on a full hub queue like any other producer.
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    sent = target.send(expired.into_inner()) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
            else => break,
        }
    }

    if !delays.is_empty() {
        debug!(queue = name, abandoned = delays.len(), "retry queue stopped with pending jobs");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn job_reappears_after_delay() {
        let (tx, mut rx) = mpsc::channel::<u32>(4);
        let cancel = CancellationToken::new();
        let (retry, _handle) = RetryQueue::spawn("test", tx, cancel.clone());

        let start = tokio::time::Instant::now();
        assert!(retry.schedule(7, Duration::from_secs(3)));

        assert_eq!(rx.recv().await, Some(7));
        assert!(start.elapsed() >= Duration::from_secs(3));
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn jobs_come_back_in_ready_time_order() {
        let (tx, mut rx) = mpsc::channel::<&'static str>(4);
        let cancel = CancellationToken::new();
        let (retry, _handle) = RetryQueue::spawn("test", tx, cancel.clone());

        retry.schedule("slow", Duration::from_secs(9));
        retry.schedule("fast", Duration::from_secs(3));

        assert_eq!(rx.recv().await, Some("fast"));
        assert_eq!(rx.recv().await, Some("slow"));
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_abandons_pending_jobs() {
        let (tx, mut rx) = mpsc::channel::<u32>(4);
        let cancel = CancellationToken::new();
        let (retry, handle) = RetryQueue::spawn("test", tx, cancel.clone());

        retry.schedule(1, Duration::from_secs(60));
        tokio::task::yield_now().await;
        cancel.cancel();
        handle.await.unwrap();

        assert!(!retry.schedule(2, Duration::from_secs(1)));
        assert!(rx.try_recv().is_err());
    }
}
