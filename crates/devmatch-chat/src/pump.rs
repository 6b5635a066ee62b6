// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-client read and write loops.
//!
//! Both are generic over the socket halves so they can be driven by an axum
//! websocket or by in-memory streams in tests.

use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::hub::{ChatHandle, Client};
use crate::message::{ChatMessage, InboundFrame};

/// Runs both pumps for one connection and returns when either of them ends.
///
/// The client is unregistered in both cases and the socket halves are dropped.
pub async fn run_client<S, E, K>(
    stream: S,
    sink: K,
    client: Client,
    outbound: mpsc::Receiver<ChatMessage>,
    hub: ChatHandle,
) where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
    K: Sink<Message> + Unpin,
    K::Error: std::fmt::Display,
{
    tokio::select! {
        () = read_pump(stream, client.clone(), hub.clone()) => {}
        () = write_pump(sink, outbound) => {
            debug!(client = %client.id, "chat writer finished, closing connection");
            hub.unregister(&client);
        }
    }
}

/// Reads frames from `stream` and broadcasts each to the client's room.
///
/// Returns when the connection ends or fails, or once the hub has removed the
/// client, after unregistering it. Frames that are not valid JSON are skipped.
pub async fn read_pump<S, E>(mut stream: S, client: Client, hub: ChatHandle)
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    loop {
        let frame = tokio::select! {
            biased;
            () = client.left() => {
                debug!(client = %client.id, "client removed by hub, ignoring further frames");
                break;
            }
            frame = stream.next() => frame,
        };
        let Some(frame) = frame else {
            break;
        };
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!(client = %client.id, error = %e, "chat connection read failed");
                break;
            }
        };

        let inbound: InboundFrame = match serde_json::from_str(text.as_str()) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(chat_id = %client.chat_id, user_id = %client.user_id, "invalid chat frame: {e}");
                continue;
            }
        };

        let message = ChatMessage::new(client.user_id.clone(), inbound.message);
        if let Err(e) = hub.broadcast(client.chat_id.clone(), message).await {
            warn!(client = %client.id, error = %e, "chat hub unavailable");
            break;
        }
    }

    hub.unregister(&client);
}

/// Writes every message from the client's outbound buffer to `sink`.
///
/// Returns when the buffer is closed (the client left or was evicted) or a
/// write fails. A close frame is sent in the first case.
pub async fn write_pump<K>(mut sink: K, mut outbound: mpsc::Receiver<ChatMessage>)
where
    K: Sink<Message> + Unpin,
    K::Error: std::fmt::Display,
{
    while let Some(message) = outbound.recv().await {
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                warn!(id = %message.id, "failed to encode chat message: {e}");
                continue;
            }
        };
        if let Err(e) = sink.send(Message::Text(json.into())).await {
            debug!(error = %e, "chat connection write failed");
            return;
        }
    }

    let _ = sink.send(Message::Close(None)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::{ChatHub, ChatHubConfig};
    use futures::channel::mpsc as fmpsc;
    use futures::stream;

    fn text(s: &str) -> Result<Message, axum::Error> {
        Ok(Message::Text(s.into()))
    }

    #[tokio::test]
    async fn read_pump_broadcasts_frames_then_unregisters() {
        let (hub, _task) = ChatHub::start(ChatHubConfig::default());
        let (speaker, _speaker_rx) = hub.register("r1", "alice").unwrap();
        let (_listener, mut listener_rx) = hub.register("r1", "bob").unwrap();

        let frames = stream::iter(vec![
            text(r#"{"message": "first"}"#),
            text("not json"),
            text(r#"{"message": "second"}"#),
        ]);
        read_pump(frames, speaker, hub.clone()).await;

        let first = listener_rx.recv().await.unwrap();
        let second = listener_rx.recv().await.unwrap();
        assert_eq!(first.message, "first");
        assert_eq!(first.user_id, "alice");
        assert!(!first.edited);
        assert_eq!(second.message, "second");

        // Stream EOF unregistered the speaker.
        assert_eq!(hub.client_count("r1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn read_pump_stops_at_close_frame() {
        let (hub, _task) = ChatHub::start(ChatHubConfig::default());
        let (speaker, _rx) = hub.register("r1", "alice").unwrap();
        let (_listener, mut listener_rx) = hub.register("r1", "bob").unwrap();

        let frames = stream::iter(vec![
            Ok(Message::Close(None)),
            text(r#"{"message": "after close"}"#),
        ]);
        read_pump(frames, speaker, hub.clone()).await;

        assert_eq!(hub.client_count("r1").await.unwrap(), 1);
        assert!(listener_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn write_pump_encodes_json_and_closes() {
        let (tx, rx) = mpsc::channel(4);
        let (sink, mut written) = fmpsc::unbounded::<Message>();

        let msg = ChatMessage::new("u1", "hello");
        tx.send(msg.clone()).await.unwrap();
        drop(tx);
        write_pump(sink, rx).await;

        let Some(Message::Text(json)) = written.next().await else {
            panic!("expected a text frame");
        };
        let decoded: ChatMessage = serde_json::from_str(json.as_str()).unwrap();
        assert_eq!(decoded, msg);
        assert!(matches!(written.next().await, Some(Message::Close(None))));
    }

    #[tokio::test]
    async fn write_pump_stops_on_write_error() {
        let (tx, rx) = mpsc::channel(4);
        let (sink, written) = fmpsc::unbounded::<Message>();
        drop(written);

        tx.send(ChatMessage::new("u1", "lost")).await.unwrap();
        // Returns although the sender is still alive.
        write_pump(sink, rx).await;
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn evicted_client_no_longer_reaches_its_room() {
        let (hub, _task) = ChatHub::start(ChatHubConfig::default());
        let (slow, _slow_rx) = hub.register_with_buffer("r1", "slow", 1).unwrap();
        let (_fast, mut fast_rx) = hub.register("r1", "fast").unwrap();

        hub.broadcast("r1", ChatMessage::new("fast", "m1")).await.unwrap();
        hub.broadcast("r1", ChatMessage::new("fast", "m2")).await.unwrap();
        assert_eq!(hub.client_count("r1").await.unwrap(), 1);
        assert_eq!(fast_rx.recv().await.unwrap().message, "m1");
        assert_eq!(fast_rx.recv().await.unwrap().message, "m2");

        let frames = stream::iter(vec![text(r#"{"message": "after eviction"}"#)]);
        read_pump(frames, slow, hub.clone()).await;

        // The query is answered after any broadcast queued before it.
        assert_eq!(hub.client_count("r1").await.unwrap(), 1);
        assert!(fast_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_writer_ends_the_connection() {
        let (hub, _task) = ChatHub::start(ChatHubConfig::default());
        let (speaker, outbound) = hub.register("r1", "alice").unwrap();
        let (_listener, mut listener_rx) = hub.register("r1", "bob").unwrap();

        let (inbound_tx, inbound) = fmpsc::unbounded::<Result<Message, axum::Error>>();
        let (sink, written) = fmpsc::unbounded::<Message>();
        drop(written);
        let connection = tokio::spawn(run_client(
            inbound,
            sink,
            speaker.clone(),
            outbound,
            hub.clone(),
        ));

        hub.broadcast("r1", ChatMessage::new("bob", "hi")).await.unwrap();
        connection.await.unwrap();
        assert_eq!(listener_rx.recv().await.unwrap().message, "hi");

        // The reader went away with the writer.
        assert!(inbound_tx
            .unbounded_send(text(r#"{"message": "ghost"}"#))
            .is_err());
        assert_eq!(hub.client_count("r1").await.unwrap(), 1);
        assert!(speaker.has_left());
        assert!(listener_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_socket_ends_the_connection() {
        let (hub, _task) = ChatHub::start(ChatHubConfig::default());
        let (client, outbound) = hub.register("r1", "alice").unwrap();
        let (sink, _written) = fmpsc::unbounded::<Message>();

        let frames = stream::iter(Vec::<Result<Message, axum::Error>>::new());
        run_client(frames, sink, client.clone(), outbound, hub.clone()).await;

        assert_eq!(hub.room_count().await.unwrap(), 0);
        assert!(client.has_left());
    }
}
