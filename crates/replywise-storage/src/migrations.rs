// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations (refinery).

use replywise_core::ReplywiseError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Applies every pending migration. Refinery records applied versions in
/// `refinery_schema_history`, so reopening a database is a no-op.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), ReplywiseError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(|e| ReplywiseError::Storage {
            source: Box::new(e),
        })?;
    Ok(())
}
