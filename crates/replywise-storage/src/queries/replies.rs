// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply records and the single-active-draft rule.

use replywise_core::ReplywiseError;
use replywise_core::types::{DraftStatus, ReplyRecord, ReplyStatus};
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::queries::parse_enum;

const REPLY_COLUMNS: &str =
    "id, review_id, text, status, origin, quota_consuming, generated_at, posted_at, posted_by";

fn row_to_reply(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReplyRecord> {
    Ok(ReplyRecord {
        id: row.get(0)?,
        review_id: row.get(1)?,
        text: row.get(2)?,
        status: parse_enum(row, 3)?,
        origin: parse_enum(row, 4)?,
        quota_consuming: row.get(5)?,
        generated_at: row.get(6)?,
        posted_at: row.get(7)?,
        posted_by: row.get(8)?,
    })
}

fn insert(conn: &rusqlite::Connection, reply: &ReplyRecord) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "INSERT INTO replies ({REPLY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        params![
            reply.id,
            reply.review_id,
            reply.text,
            reply.status.to_string(),
            reply.origin.to_string(),
            reply.quota_consuming,
            reply.generated_at,
            reply.posted_at,
            reply.posted_by,
        ],
    )
}

/// Rejects the review's current draft and inserts `reply` as the new one,
/// in one transaction.
pub async fn create_draft(db: &Database, reply: &ReplyRecord) -> Result<(), ReplywiseError> {
    let mut reply = reply.clone();
    reply.status = DraftStatus::Draft;
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE replies SET status = 'rejected' WHERE review_id = ?1 AND status = 'draft'",
                params![reply.review_id],
            )?;
            insert(&tx, &reply)?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Inserts `reply` and sets its review's status in one transaction.
/// Fails with `NotFound` when the review does not exist; nothing is written.
pub async fn insert_with_status(
    db: &Database,
    reply: &ReplyRecord,
    status: ReplyStatus,
) -> Result<(), ReplywiseError> {
    let reply = reply.clone();
    let review_id = reply.review_id.clone();
    let changed = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE reviews SET reply_status = ?2 WHERE id = ?1",
                params![reply.review_id, status.to_string()],
            )?;
            if changed == 0 {
                return Ok(0);
            }
            insert(&tx, &reply)?;
            tx.commit()?;
            Ok(changed)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(ReplywiseError::not_found("review", review_id));
    }
    Ok(())
}

pub async fn active_draft(db: &Database, review_id: &str) -> Result<Option<ReplyRecord>, ReplywiseError> {
    let review_id = review_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {REPLY_COLUMNS} FROM replies WHERE review_id = ?1 AND status = 'draft'"
                ),
                params![review_id],
                row_to_reply,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn list_replies(db: &Database, review_id: &str) -> Result<Vec<ReplyRecord>, ReplywiseError> {
    let review_id = review_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REPLY_COLUMNS} FROM replies WHERE review_id = ?1
                 ORDER BY generated_at ASC, rowid ASC"
            ))?;
            let rows = stmt.query_map(params![review_id], row_to_reply)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Moves a draft to `posted`. Fails with `NotFound` if `reply_id` is not a
/// live draft.
pub async fn mark_posted(
    db: &Database,
    reply_id: &str,
    posted_at: &str,
    posted_by: &str,
) -> Result<(), ReplywiseError> {
    let id = reply_id.to_string();
    let posted_at = posted_at.to_string();
    let posted_by = posted_by.to_string();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE replies SET status = 'posted', posted_at = ?2, posted_by = ?3
                 WHERE id = ?1 AND status = 'draft'",
                params![id, posted_at, posted_by],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(ReplywiseError::not_found("draft reply", reply_id));
    }
    Ok(())
}

pub async fn mark_rejected(db: &Database, reply_id: &str) -> Result<(), ReplywiseError> {
    let id = reply_id.to_string();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE replies SET status = 'rejected' WHERE id = ?1 AND status = 'draft'",
                params![id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(ReplywiseError::not_found("draft reply", reply_id));
    }
    Ok(())
}
