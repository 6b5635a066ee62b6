// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations.

use devmatch_core::DevmatchError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Applies pending migrations. Applied versions are tracked in
/// `refinery_schema_history`.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), DevmatchError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(|e| DevmatchError::Storage {
            source: Box::new(e),
        })?;
    Ok(())
}
