// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derived usage counter. Nothing here is ever decremented: the month
//! window moves and old rows fall out of it.

use replywise_core::ReplywiseError;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;

pub async fn monthly_limit(db: &Database, user_id: &str) -> Result<Option<i64>, ReplywiseError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT monthly_limit FROM plans WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Quota-consuming replies generated since `since` across every business
/// the user owns. Rejected drafts still count.
pub async fn count_quota_usage(db: &Database, user_id: &str, since: &str) -> Result<u64, ReplywiseError> {
    let user_id = user_id.to_string();
    let since = since.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM replies r
                 JOIN reviews v ON v.id = r.review_id
                 JOIN businesses b ON b.id = v.business_id
                 WHERE b.user_id = ?1 AND r.quota_consuming = 1 AND r.generated_at >= ?2",
                params![user_id, since],
                |row| row.get(0),
            )?;
            Ok(count.max(0) as u64)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
