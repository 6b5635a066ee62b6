// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Room fan-out scenarios driven through the public handle.

use devmatch_chat::{ChatHub, ChatHubConfig, ChatMessage};

#[tokio::test]
async fn slow_consumer_is_evicted_while_others_keep_up() {
    let (hub, _task) = ChatHub::start(ChatHubConfig::default());
    let (_a, mut rx_a) = hub.register_with_buffer("r", "a", 1).unwrap();
    let (_b, mut rx_b) = hub.register_with_buffer("r", "b", 1).unwrap();

    let m1 = ChatMessage::new("c", "m1");
    let m2 = ChatMessage::new("c", "m2");
    let m3 = ChatMessage::new("c", "m3");

    hub.broadcast("r", m1.clone()).await.unwrap();
    assert_eq!(rx_b.recv().await, Some(m1.clone()));

    // A has not read m1, so its buffer is full.
    hub.broadcast("r", m2.clone()).await.unwrap();
    assert_eq!(rx_b.recv().await, Some(m2));

    hub.broadcast("r", m3.clone()).await.unwrap();
    assert_eq!(rx_b.recv().await, Some(m3));

    assert_eq!(rx_a.recv().await, Some(m1));
    assert_eq!(rx_a.recv().await, None);
    assert_eq!(hub.client_count("r").await.unwrap(), 1);
}

#[tokio::test]
async fn room_of_slow_consumers_empties() {
    let (hub, _task) = ChatHub::start(ChatHubConfig::default());
    let mut receivers = Vec::new();
    for user in ["a", "b", "c"] {
        let (_client, rx) = hub.register_with_buffer("r", user, 1).unwrap();
        receivers.push(rx);
    }

    hub.broadcast("r", ChatMessage::new("x", "fill")).await.unwrap();
    hub.broadcast("r", ChatMessage::new("x", "overflow"))
        .await
        .unwrap();

    assert_eq!(hub.client_count("r").await.unwrap(), 0);
    assert_eq!(hub.room_count().await.unwrap(), 0);
    for mut rx in receivers {
        assert_eq!(rx.recv().await.map(|m| m.message), Some("fill".to_string()));
        assert_eq!(rx.recv().await, None);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn hundred_concurrent_registrations_each_receive_once() {
    let (hub, _task) = ChatHub::start(ChatHubConfig::default());

    let mut joins = Vec::new();
    for i in 0..100 {
        let hub = hub.clone();
        joins.push(tokio::spawn(async move {
            hub.register("r", format!("user-{i}")).unwrap()
        }));
    }
    let mut receivers = Vec::new();
    for join in joins {
        let (_client, rx) = join.await.unwrap();
        receivers.push(rx);
    }

    let m = ChatMessage::new("host", "welcome");
    hub.broadcast("r", m.clone()).await.unwrap();
    assert_eq!(hub.client_count("r").await.unwrap(), 100);

    for mut rx in receivers {
        assert_eq!(rx.recv().await, Some(m.clone()));
        assert!(rx.try_recv().is_err());
    }
}

#[tokio::test]
async fn each_client_sees_broadcasts_in_hub_order() {
    let (hub, _task) = ChatHub::start(ChatHubConfig::default());
    let (_a, mut rx_a) = hub.register("r", "a").unwrap();
    let (_b, mut rx_b) = hub.register("r", "b").unwrap();

    for n in 0..10 {
        hub.broadcast("r", ChatMessage::new("a", n.to_string()))
            .await
            .unwrap();
    }
    for rx in [&mut rx_a, &mut rx_b] {
        for n in 0..10 {
            assert_eq!(rx.recv().await.unwrap().message, n.to_string());
        }
    }
}
