// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite review repository for the Replywise pipeline.
//!
//! WAL-mode SQLite with embedded refinery migrations and a single-writer
//! connection via `tokio-rusqlite`. Duplicate review ingestion is resolved
//! by an atomic insert-if-absent, and a partial unique index keeps at most
//! one live draft per review.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStore;
pub use database::Database;
