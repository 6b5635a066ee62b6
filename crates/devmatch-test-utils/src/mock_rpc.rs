// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted RPC service for hub tests.
//!
//! `MockRpc` acts as both the connector and every connection it hands out,
//! so all workers share one call log. Failures, connect errors and blocking
//! can be scripted ahead of time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify, Semaphore};
use tokio::time::Instant;

use devmatch_core::{
    DevmatchError, EmbeddingConnector, EmbeddingRequest, EmbeddingService,
    RecommendationConnector, RecommendationRequest, RecommendationService, RpcService,
};

/// Mock embedding service.
pub type MockEmbeddingService = MockRpc<EmbeddingRequest>;

/// Mock recommendation service.
pub type MockRecommendationService = MockRpc<RecommendationRequest>;

/// One call as seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedCall<R> {
    /// When the call started, on the tokio clock.
    pub at: Instant,
    pub request: R,
}

struct Inner<R> {
    calls: Mutex<Vec<RecordedCall<R>>>,
    started: AtomicUsize,
    completed: AtomicUsize,
    connects: AtomicUsize,
    fail_calls: AtomicUsize,
    fail_connects: AtomicUsize,
    fail_always: AtomicBool,
    gate: Option<Semaphore>,
    notify: Notify,
}

/// A scripted RPC service.
pub struct MockRpc<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for MockRpc<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Clone + Send + 'static> MockRpc<R> {
    /// A service that acknowledges every call immediately.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A service whose calls block until [`release`](Self::release) is called.
    pub fn gated() -> Self {
        Self::build(Some(Semaphore::new(0)))
    }

    fn build(gate: Option<Semaphore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                calls: Mutex::new(Vec::new()),
                started: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
                connects: AtomicUsize::new(0),
                fail_calls: AtomicUsize::new(0),
                fail_connects: AtomicUsize::new(0),
                fail_always: AtomicBool::new(false),
                gate,
                notify: Notify::new(),
            }),
        }
    }

    /// The next `n` calls fail.
    pub fn fail_next(&self, n: usize) {
        self.inner.fail_calls.store(n, Ordering::SeqCst);
    }

    /// Every call fails until further notice.
    pub fn fail_always(&self, on: bool) {
        self.inner.fail_always.store(on, Ordering::SeqCst);
    }

    /// The next `n` connection attempts fail.
    pub fn fail_next_connects(&self, n: usize) {
        self.inner.fail_connects.store(n, Ordering::SeqCst);
    }

    /// Lets `n` blocked (or future) calls through a gated service.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.inner.gate {
            gate.add_permits(n);
        }
    }

    /// Every call made so far, in start order.
    pub async fn calls(&self) -> Vec<RecordedCall<R>> {
        self.inner.calls.lock().await.clone()
    }

    /// Requests made so far, in start order.
    pub async fn requests(&self) -> Vec<R> {
        self.calls().await.into_iter().map(|c| c.request).collect()
    }

    /// Calls that have started.
    pub fn call_count(&self) -> usize {
        self.inner.started.load(Ordering::SeqCst)
    }

    /// Calls that have returned, successfully or not.
    pub fn completed_count(&self) -> usize {
        self.inner.completed.load(Ordering::SeqCst)
    }

    /// Connection attempts, failed ones included.
    pub fn connect_count(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    /// Waits until at least `n` calls have started.
    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.inner.notify.notified();
            if self.call_count() >= n {
                return;
            }
            notified.await;
        }
    }

    /// Waits until at least `n` calls have returned.
    pub async fn wait_for_completed(&self, n: usize) {
        loop {
            let notified = self.inner.notify.notified();
            if self.completed_count() >= n {
                return;
            }
            notified.await;
        }
    }

    fn connect_outcome(&self, service: RpcService) -> Result<(), DevmatchError> {
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        if take_one(&self.inner.fail_connects) {
            return Err(DevmatchError::Rpc {
                service,
                message: "mock connect refused".to_string(),
                source: None,
            });
        }
        Ok(())
    }

    async fn handle(&self, service: RpcService, request: R) -> Result<(), DevmatchError> {
        self.inner.calls.lock().await.push(RecordedCall {
            at: Instant::now(),
            request,
        });
        self.inner.started.fetch_add(1, Ordering::SeqCst);
        self.inner.notify.notify_waiters();

        if let Some(gate) = &self.inner.gate
            && let Ok(permit) = gate.acquire().await
        {
            permit.forget();
        }

        let fail = take_one(&self.inner.fail_calls) || self.inner.fail_always.load(Ordering::SeqCst);

        self.inner.completed.fetch_add(1, Ordering::SeqCst);
        self.inner.notify.notify_waiters();

        if fail {
            Err(DevmatchError::Rpc {
                service,
                message: "mock unavailable".to_string(),
                source: None,
            })
        } else {
            Ok(())
        }
    }
}

impl<R: Clone + Send + 'static> Default for MockRpc<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements `counter` if it is positive. Returns whether it did.
fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl EmbeddingService for MockRpc<EmbeddingRequest> {
    async fn call(&mut self, request: EmbeddingRequest) -> Result<(), DevmatchError> {
        self.handle(RpcService::Embedding, request).await
    }
}

#[async_trait]
impl EmbeddingConnector for MockRpc<EmbeddingRequest> {
    async fn connect(&self) -> Result<Box<dyn EmbeddingService>, DevmatchError> {
        self.connect_outcome(RpcService::Embedding)?;
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl RecommendationService for MockRpc<RecommendationRequest> {
    async fn call(&mut self, request: RecommendationRequest) -> Result<(), DevmatchError> {
        self.handle(RpcService::Recommendation, request).await
    }
}

#[async_trait]
impl RecommendationConnector for MockRpc<RecommendationRequest> {
    async fn connect(&self) -> Result<Box<dyn RecommendationService>, DevmatchError> {
        self.connect_outcome(RpcService::Recommendation)?;
        Ok(Box::new(self.clone()))
    }
}
