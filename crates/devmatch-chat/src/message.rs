// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat wire types.
//!
//! Client -> Server (JSON):
//! ```json
//! {"message": "anyone up for a code review?"}
//! ```
//!
//! Server -> Client (JSON):
//! ```json
//! {"id": "5d0c...", "message": "anyone up for a code review?", "user_id": "u1",
//!  "sent": "2026-03-01T09:00:00Z", "edited": false}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A frame read from a client connection.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    pub message: String,
}

/// A message as delivered to every client in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub message: String,
    pub user_id: String,
    pub sent: DateTime<Utc>,
    pub edited: bool,
}

impl ChatMessage {
    /// A fresh, unedited message stamped with the current time.
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
            user_id: user_id.into(),
            sent: Utc::now(),
            edited: false,
        }
    }
}

/// A message bound for a room.
#[derive(Debug, Clone)]
pub struct BroadcastEnvelope {
    pub chat_id: String,
    pub message: ChatMessage,
}
