// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat room fan-out.
//!
//! A single coordinator task owns the room map and consumes three channels:
//! register, unregister and broadcast. Each connected client gets a bounded
//! outbound buffer; a broadcast that finds a client's buffer full evicts that
//! client instead of waiting for it.
//!
//! The websocket layer is thin: [`ws::ws_handler`] upgrades the connection,
//! registers a [`Client`] and runs [`read_pump`] and [`write_pump`] over the
//! two halves of the socket through [`run_client`]. Whichever pump ends first
//! takes the other down with it.

pub mod hub;
pub mod message;
pub mod pump;
pub mod ws;

pub use hub::{ChatHandle, ChatHub, ChatHubConfig, Client, ClientId};
pub use message::{BroadcastEnvelope, ChatMessage, InboundFrame};
pub use pump::{read_pump, run_client, write_pump};
pub use ws::{ChatParams, ws_handler};
