// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for trial reminder bookkeeping.
//!
//! All access goes through a single `tokio-rusqlite` connection, which
//! serializes statements on its background thread. The schema is created by
//! embedded refinery migrations when the database is opened.

pub mod migrations;
pub mod store;

pub use store::SqliteReminderStore;
