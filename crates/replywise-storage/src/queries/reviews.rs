// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review rows.

use replywise_core::ReplywiseError;
use replywise_core::types::{InsertOutcome, ReplyStatus, Review, StarRating};
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::queries::{conversion_err, parse_enum};

const REVIEW_COLUMNS: &str = "id, business_id, external_review_id, reviewer_name, \
     reviewer_photo_url, rating, comment, submitted_at, updated_at, is_anonymous, \
     ingested_at, reply_status, quota_exempt";

fn row_to_review(row: &rusqlite::Row<'_>) -> rusqlite::Result<Review> {
    let rating: u8 = row.get(5)?;
    Ok(Review {
        id: row.get(0)?,
        business_id: row.get(1)?,
        external_review_id: row.get(2)?,
        reviewer_name: row.get(3)?,
        reviewer_photo_url: row.get(4)?,
        rating: StarRating::try_from(rating).map_err(|e| conversion_err(5, e))?,
        comment: row.get(6)?,
        submitted_at: row.get(7)?,
        updated_at: row.get(8)?,
        is_anonymous: row.get(9)?,
        ingested_at: row.get(10)?,
        reply_status: parse_enum(row, 11)?,
        quota_exempt: row.get(12)?,
    })
}

/// Inserts the review unless `(business_id, external_review_id)` is taken.
///
/// The conflict is resolved inside SQLite, so concurrent duplicates never
/// surface a constraint error.
pub async fn insert_if_absent(db: &Database, review: &Review) -> Result<InsertOutcome, ReplywiseError> {
    let review = review.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "INSERT INTO reviews (id, business_id, external_review_id, reviewer_name,
                    reviewer_photo_url, rating, comment, submitted_at, updated_at,
                    is_anonymous, ingested_at, reply_status, quota_exempt)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                 ON CONFLICT(business_id, external_review_id) DO NOTHING",
                params![
                    review.id,
                    review.business_id,
                    review.external_review_id,
                    review.reviewer_name,
                    review.reviewer_photo_url,
                    review.rating.value(),
                    review.comment,
                    review.submitted_at,
                    review.updated_at,
                    review.is_anonymous,
                    review.ingested_at,
                    review.reply_status.to_string(),
                    review.quota_exempt,
                ],
            )?;
            Ok(if changed == 1 {
                InsertOutcome::Inserted
            } else {
                InsertOutcome::AlreadyExists
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_review(db: &Database, id: &str) -> Result<Option<Review>, ReplywiseError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1"),
                params![id],
                row_to_review,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_by_external_id(
    db: &Database,
    business_id: &str,
    external_review_id: &str,
) -> Result<Option<Review>, ReplywiseError> {
    let business_id = business_id.to_string();
    let external_review_id = external_review_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews
                     WHERE business_id = ?1 AND external_review_id = ?2"
                ),
                params![business_id, external_review_id],
                row_to_review,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Sets the reply status. Fails with `NotFound` when no row matches.
pub async fn update_status(db: &Database, id: &str, status: ReplyStatus) -> Result<(), ReplywiseError> {
    let review_id = id.to_string();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE reviews SET reply_status = ?2 WHERE id = ?1",
                params![review_id, status.to_string()],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(ReplywiseError::not_found("review", id));
    }
    Ok(())
}

/// Applies a reviewer edit. Older `updated_at` values are ignored so a
/// stale redelivery cannot roll the text back.
pub async fn update_text(
    db: &Database,
    id: &str,
    comment: Option<&str>,
    rating: StarRating,
    updated_at: &str,
) -> Result<(), ReplywiseError> {
    let id = id.to_string();
    let comment = comment.map(str::to_string);
    let updated_at = updated_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE reviews SET comment = ?2, rating = ?3, updated_at = ?4
                 WHERE id = ?1 AND updated_at < ?4",
                params![id, comment, rating.value(), updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
