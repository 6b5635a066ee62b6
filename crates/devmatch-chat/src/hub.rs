// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat coordinator.
//!
//! The room map lives inside one task and is only touched there. Handles talk
//! to it over channels, so no lock guards the map. A client's outbound
//! buffer is closed by dropping the coordinator's sender half, which can
//! happen only once.

use std::collections::HashMap;
use std::fmt;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use devmatch_core::{DevmatchError, HealthStatus};

use crate::message::{BroadcastEnvelope, ChatMessage};

/// Chat hub construction parameters.
///
/// Mirrors `ChatConfig` from `devmatch-config`.
#[derive(Debug, Clone)]
pub struct ChatHubConfig {
    /// Capacity of the broadcast intake channel.
    pub broadcast_buffer: usize,
    /// Capacity of each client's outbound buffer.
    pub client_buffer: usize,
}

impl Default for ChatHubConfig {
    fn default() -> Self {
        Self {
            broadcast_buffer: 256,
            client_buffer: 256,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A participant connected to one room.
#[derive(Debug, Clone)]
pub struct Client {
    pub id: ClientId,
    pub chat_id: String,
    pub user_id: String,
    left: CancellationToken,
}

impl Client {
    /// Whether the hub has removed this client from its room.
    pub fn has_left(&self) -> bool {
        self.left.is_cancelled()
    }

    /// Resolves once the hub has removed this client from its room.
    pub async fn left(&self) {
        self.left.cancelled().await;
    }
}

struct Registration {
    client: Client,
    outbound: mpsc::Sender<ChatMessage>,
    // Marks the client as gone when the registration or its member is dropped.
    left: DropGuard,
}

enum Query {
    Rooms(oneshot::Sender<usize>),
    Clients(String, oneshot::Sender<usize>),
}

/// Cloneable front end of the coordinator.
#[derive(Clone)]
pub struct ChatHandle {
    register: mpsc::UnboundedSender<Registration>,
    unregister: mpsc::UnboundedSender<Client>,
    broadcast: mpsc::Sender<BroadcastEnvelope>,
    query: mpsc::UnboundedSender<Query>,
    client_buffer: usize,
    cancel: CancellationToken,
}

impl ChatHandle {
    /// Joins `chat_id` with the configured outbound buffer size.
    ///
    /// Returns the client and the receiving end of its buffer, which yields
    /// `None` once the client is unregistered or evicted.
    pub fn register(
        &self,
        chat_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Result<(Client, mpsc::Receiver<ChatMessage>), DevmatchError> {
        self.register_with_buffer(chat_id, user_id, self.client_buffer)
    }

    pub fn register_with_buffer(
        &self,
        chat_id: impl Into<String>,
        user_id: impl Into<String>,
        buffer: usize,
    ) -> Result<(Client, mpsc::Receiver<ChatMessage>), DevmatchError> {
        let left = CancellationToken::new();
        let client = Client {
            id: ClientId::new(),
            chat_id: chat_id.into(),
            user_id: user_id.into(),
            left: left.clone(),
        };
        let (outbound, rx) = mpsc::channel(buffer.max(1));
        self.register
            .send(Registration {
                client: client.clone(),
                outbound,
                left: left.drop_guard(),
            })
            .map_err(|_| DevmatchError::QueueClosed("chat register"))?;
        Ok((client, rx))
    }

    /// Removes `client` from its room. A no-op if it already left or was evicted.
    pub fn unregister(&self, client: &Client) {
        if self.unregister.send(client.clone()).is_err() {
            debug!(client = %client.id, "chat hub gone, nothing to unregister");
        }
    }

    /// Queues `message` for every client in `chat_id`.
    ///
    /// Waits only for room in the intake channel, never for slow clients.
    pub async fn broadcast(
        &self,
        chat_id: impl Into<String>,
        message: ChatMessage,
    ) -> Result<(), DevmatchError> {
        let envelope = BroadcastEnvelope {
            chat_id: chat_id.into(),
            message,
        };
        self.broadcast
            .send(envelope)
            .await
            .map_err(|_| DevmatchError::QueueClosed("chat broadcast"))
    }

    /// Number of non-empty rooms.
    pub async fn room_count(&self) -> Result<usize, DevmatchError> {
        self.ask(Query::Rooms).await
    }

    /// Number of clients currently in `chat_id`.
    pub async fn client_count(&self, chat_id: impl Into<String>) -> Result<usize, DevmatchError> {
        let chat_id = chat_id.into();
        self.ask(|tx| Query::Clients(chat_id, tx)).await
    }

    async fn ask(
        &self,
        query: impl FnOnce(oneshot::Sender<usize>) -> Query,
    ) -> Result<usize, DevmatchError> {
        let (tx, rx) = oneshot::channel();
        self.query
            .send(query(tx))
            .map_err(|_| DevmatchError::QueueClosed("chat query"))?;
        rx.await
            .map_err(|_| DevmatchError::QueueClosed("chat query"))
    }

    pub fn health(&self) -> HealthStatus {
        if self.cancel.is_cancelled() || self.register.is_closed() {
            HealthStatus::Unhealthy("chat coordinator stopped".to_string())
        } else {
            HealthStatus::Healthy
        }
    }

    /// Stops the coordinator. Every outbound buffer is closed as the room map
    /// is dropped.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

struct Member {
    user_id: String,
    outbound: mpsc::Sender<ChatMessage>,
    _left: DropGuard,
}

/// The coordinator task and its state.
pub struct ChatHub {
    rooms: HashMap<String, HashMap<ClientId, Member>>,
    register: mpsc::UnboundedReceiver<Registration>,
    unregister: mpsc::UnboundedReceiver<Client>,
    broadcast: mpsc::Receiver<BroadcastEnvelope>,
    query: mpsc::UnboundedReceiver<Query>,
    cancel: CancellationToken,
}

impl ChatHub {
    /// Spawns the coordinator and returns a handle to it.
    pub fn start(config: ChatHubConfig) -> (ChatHandle, JoinHandle<()>) {
        let (register_tx, register) = mpsc::unbounded_channel();
        let (unregister_tx, unregister) = mpsc::unbounded_channel();
        let (broadcast_tx, broadcast) = mpsc::channel(config.broadcast_buffer.max(1));
        let (query_tx, query) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let hub = ChatHub {
            rooms: HashMap::new(),
            register,
            unregister,
            broadcast,
            query,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(hub.run());

        let handle = ChatHandle {
            register: register_tx,
            unregister: unregister_tx,
            broadcast: broadcast_tx,
            query: query_tx,
            client_buffer: config.client_buffer.max(1),
            cancel,
        };
        (handle, task)
    }

    async fn run(mut self) {
        info!("chat hub started");
        // Registrations and departures are applied before any broadcast that
        // was queued after them.
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                Some(registration) = self.register.recv() => self.on_register(registration),
                Some(client) = self.unregister.recv() => self.on_unregister(&client),
                Some(envelope) = self.broadcast.recv() => self.on_broadcast(envelope),
                Some(query) = self.query.recv() => self.on_query(query),
                else => break,
            }
        }
        let clients: usize = self.rooms.values().map(HashMap::len).sum();
        info!(rooms = self.rooms.len(), clients, "chat hub stopped");
    }

    fn on_register(&mut self, registration: Registration) {
        let Registration {
            client,
            outbound,
            left,
        } = registration;
        debug!(chat_id = %client.chat_id, user_id = %client.user_id, client = %client.id, "client joined");
        self.rooms.entry(client.chat_id).or_default().insert(
            client.id,
            Member {
                user_id: client.user_id,
                outbound,
                _left: left,
            },
        );
    }

    fn on_unregister(&mut self, client: &Client) {
        let Some(room) = self.rooms.get_mut(&client.chat_id) else {
            return;
        };
        if room.remove(&client.id).is_some() {
            debug!(chat_id = %client.chat_id, user_id = %client.user_id, client = %client.id, "client left");
        }
        if room.is_empty() {
            self.rooms.remove(&client.chat_id);
        }
    }

    fn on_broadcast(&mut self, envelope: BroadcastEnvelope) {
        let BroadcastEnvelope { chat_id, message } = envelope;
        let Some(room) = self.rooms.get_mut(&chat_id) else {
            debug!(%chat_id, "broadcast to empty room");
            return;
        };

        room.retain(|id, member| match member.outbound.try_send(message.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(%chat_id, user_id = %member.user_id, client = %id, "evicting slow consumer");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(%chat_id, user_id = %member.user_id, client = %id, "dropping disconnected client");
                false
            }
        });

        if room.is_empty() {
            self.rooms.remove(&chat_id);
        }
    }

    fn on_query(&self, query: Query) {
        // The asker may have given up; nothing to do then.
        match query {
            Query::Rooms(tx) => {
                let _ = tx.send(self.rooms.len());
            }
            Query::Clients(chat_id, tx) => {
                let _ = tx.send(self.rooms.get(&chat_id).map_or(0, HashMap::len));
            }
        }
    }
}
