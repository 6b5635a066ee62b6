// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the embedding hub against a scripted service.
//!
//! All tests run on a paused clock, so backoff and deadlines elapse
//! instantly once every task is idle.

use std::sync::Arc;
use std::time::Duration;

use devmatch_core::{EmbeddingRequest, HealthStatus, UserFacet};
use devmatch_embedding::{EmbeddingHub, EmbeddingHubConfig};
use devmatch_resilience::RetryPolicy;
use devmatch_test_utils::MockEmbeddingService;
use tokio::time::Instant;

fn config(workers: usize, queue_size: usize) -> EmbeddingHubConfig {
    EmbeddingHubConfig {
        queue_size,
        workers,
        rpc_timeout: Duration::from_secs(30),
        retry: RetryPolicy::linear(Duration::from_secs(3)),
    }
}

fn user(id: &str) -> UserFacet {
    UserFacet {
        id: id.to_string(),
        bio: "builds compilers".to_string(),
        status: true,
        skills: vec!["rust".to_string()],
        interests: vec!["llvm".to_string()],
    }
}

#[tokio::test(start_paused = true)]
async fn retry_ladder_waits_three_six_nine_seconds() {
    let rpc = MockEmbeddingService::new();
    rpc.fail_next(3);
    let hub = EmbeddingHub::start(config(1, 10), Arc::new(rpc.clone()));

    let start = Instant::now();
    hub.queue_user_create(user("u1")).await;
    rpc.wait_for_completed(4).await;

    let offsets: Vec<u64> = rpc
        .calls()
        .await
        .iter()
        .map(|c| c.at.duration_since(start).as_secs())
        .collect();
    assert_eq!(offsets, vec![0, 3, 9, 18]);

    // The fourth call succeeded; nothing else is scheduled.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(rpc.call_count(), 4);
    hub.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn mutation_job_is_dropped_after_four_calls() {
    let rpc = MockEmbeddingService::new();
    rpc.fail_always(true);
    let hub = EmbeddingHub::start(config(1, 10), Arc::new(rpc.clone()));

    hub.queue_user_delete("u1").await;
    rpc.wait_for_completed(4).await;
    tokio::time::sleep(Duration::from_secs(300)).await;

    assert_eq!(rpc.call_count(), 4);
    assert!(
        rpc.requests()
            .await
            .iter()
            .all(|r| *r == EmbeddingRequest::DeleteUser { id: "u1".into() })
    );
    hub.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn status_job_is_dropped_after_three_calls() {
    let rpc = MockEmbeddingService::new();
    rpc.fail_always(true);
    let hub = EmbeddingHub::start(config(1, 10), Arc::new(rpc.clone()));

    let start = Instant::now();
    hub.queue_project_update_status("p1", false).await;
    rpc.wait_for_completed(3).await;
    tokio::time::sleep(Duration::from_secs(300)).await;

    let offsets: Vec<u64> = rpc
        .calls()
        .await
        .iter()
        .map(|c| c.at.duration_since(start).as_secs())
        .collect();
    assert_eq!(offsets, vec![0, 3, 9]);
    hub.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn duplicate_updates_are_delivered_twice() {
    let rpc = MockEmbeddingService::new();
    let hub = EmbeddingHub::start(config(2, 10), Arc::new(rpc.clone()));

    hub.queue_user_update(user("u1")).await;
    hub.queue_user_update(user("u1")).await;
    rpc.wait_for_completed(2).await;

    let requests = rpc.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);
    assert_eq!(requests[0].method(), "UpdateUserEmbedding");
    hub.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn full_queue_suspends_the_producer() {
    let rpc = MockEmbeddingService::gated();
    let mut cfg = config(1, 2);
    cfg.rpc_timeout = Duration::from_secs(3600);
    let hub = EmbeddingHub::start(cfg, Arc::new(rpc.clone()));

    // Occupy the only worker.
    hub.queue_user_delete("busy").await;
    rpc.wait_for_calls(1).await;

    hub.queue_user_delete("u1").await;
    hub.queue_user_delete("u2").await;
    assert_eq!(hub.pending(), 2);
    assert!(matches!(hub.health(), HealthStatus::Degraded(_)));

    let producer = hub.clone();
    let mut third =
        tokio::spawn(async move { producer.queue_user_delete("u3").await });
    assert!(
        tokio::time::timeout(Duration::from_millis(100), &mut third)
            .await
            .is_err(),
        "third enqueue should block while the queue is full"
    );

    rpc.release(1);
    third.await.unwrap();
    assert_eq!(hub.pending(), 2);

    rpc.release(10);
    rpc.wait_for_completed(4).await;
    hub.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_in_flight_calls_and_abandons_the_rest() {
    let rpc = MockEmbeddingService::gated();
    let mut cfg = config(2, 10);
    cfg.rpc_timeout = Duration::from_secs(3600);
    let hub = EmbeddingHub::start(cfg, Arc::new(rpc.clone()));

    for id in ["u1", "u2", "u3", "u4", "u5"] {
        hub.queue_user_delete(id).await;
    }
    rpc.wait_for_calls(2).await;

    let stopping = hub.clone();
    let mut shutdown = tokio::spawn(async move { stopping.shutdown().await });
    assert!(
        tokio::time::timeout(Duration::from_millis(100), &mut shutdown)
            .await
            .is_err(),
        "shutdown should wait for in-flight calls"
    );

    rpc.release(2);
    shutdown.await.unwrap();

    assert_eq!(rpc.call_count(), 2);
    assert_eq!(rpc.completed_count(), 2);
    assert!(matches!(hub.health(), HealthStatus::Unhealthy(_)));
}

#[tokio::test(start_paused = true)]
async fn shutdown_is_bounded_by_the_rpc_deadline() {
    let rpc = MockEmbeddingService::gated();
    let hub = EmbeddingHub::start(config(2, 10), Arc::new(rpc.clone()));

    hub.queue_user_delete("u1").await;
    hub.queue_user_delete("u2").await;
    rpc.wait_for_calls(2).await;

    let start = Instant::now();
    hub.shutdown().await;
    assert!(start.elapsed() >= Duration::from_secs(30));
    assert_eq!(rpc.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn enqueue_after_shutdown_is_dropped() {
    let rpc = MockEmbeddingService::new();
    let hub = EmbeddingHub::start(config(1, 10), Arc::new(rpc.clone()));
    hub.shutdown().await;

    hub.queue_user_create(user("late")).await;
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(rpc.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn unreachable_service_is_reconnected_lazily() {
    let rpc = MockEmbeddingService::new();
    rpc.fail_next_connects(1);
    let hub = EmbeddingHub::start(config(1, 10), Arc::new(rpc.clone()));

    hub.queue_user_create(user("u1")).await;
    rpc.wait_for_completed(1).await;

    // Startup attempt failed; the job opened a fresh connection.
    assert_eq!(rpc.connect_count(), 2);
    assert_eq!(rpc.call_count(), 1);
    hub.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn failed_call_drops_the_connection() {
    let rpc = MockEmbeddingService::new();
    rpc.fail_next(1);
    let hub = EmbeddingHub::start(config(1, 10), Arc::new(rpc.clone()));

    hub.queue_user_create(user("u1")).await;
    rpc.wait_for_completed(2).await;

    assert_eq!(rpc.connect_count(), 2);
    hub.shutdown().await;
}
