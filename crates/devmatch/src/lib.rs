// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring for the `devmatch` binary.
//!
//! Exposed as a library so the HTTP surface can be exercised in tests.

pub mod serve;
pub mod server;
pub mod shutdown;
