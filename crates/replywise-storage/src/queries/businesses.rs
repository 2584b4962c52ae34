// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Businesses, platform accounts and plans.

use replywise_core::ReplywiseError;
use replywise_core::types::{Business, BusinessConfig, PlatformAccount, SealedToken};
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::queries::conversion_err;

pub async fn upsert_business(db: &Database, business: &Business) -> Result<(), ReplywiseError> {
    let config = serde_json::to_string(&business.config).map_err(|e| ReplywiseError::Storage {
        source: Box::new(e),
    })?;
    let business = business.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO businesses (id, user_id, account_id, name, location_name, config)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    user_id = excluded.user_id,
                    account_id = excluded.account_id,
                    name = excluded.name,
                    location_name = excluded.location_name,
                    config = excluded.config,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    business.id,
                    business.user_id,
                    business.account_id,
                    business.name,
                    business.location_name,
                    config,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_business(db: &Database, id: &str) -> Result<Option<Business>, ReplywiseError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, user_id, account_id, name, location_name, config
                 FROM businesses WHERE id = ?1",
                params![id],
                |row| {
                    let raw_config: String = row.get(5)?;
                    let config: BusinessConfig =
                        serde_json::from_str(&raw_config).map_err(|e| conversion_err(5, e))?;
                    Ok(Business {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        account_id: row.get(2)?,
                        name: row.get(3)?,
                        location_name: row.get(4)?,
                        config,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn upsert_account(
    db: &Database,
    account: &PlatformAccount,
) -> Result<(), ReplywiseError> {
    let id = account.id.clone();
    let user_id = account.user_id.clone();
    let (ciphertext, nonce) = match &account.sealed_refresh_token {
        Some(sealed) => (Some(sealed.ciphertext.clone()), Some(sealed.nonce.to_vec())),
        None => (None, None),
    };
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO platform_accounts (id, user_id, refresh_ciphertext, refresh_nonce)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    user_id = excluded.user_id,
                    refresh_ciphertext = excluded.refresh_ciphertext,
                    refresh_nonce = excluded.refresh_nonce,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![id, user_id, ciphertext, nonce],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_account(
    db: &Database,
    id: &str,
) -> Result<Option<PlatformAccount>, ReplywiseError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, user_id, refresh_ciphertext, refresh_nonce
                 FROM platform_accounts WHERE id = ?1",
                params![id],
                |row| {
                    let ciphertext: Option<Vec<u8>> = row.get(2)?;
                    let nonce: Option<Vec<u8>> = row.get(3)?;
                    let sealed_refresh_token = match (ciphertext, nonce) {
                        (Some(ciphertext), Some(nonce)) => {
                            let nonce: [u8; 12] = nonce.as_slice().try_into().map_err(|e| {
                                conversion_err(3, e)
                            })?;
                            Some(SealedToken { ciphertext, nonce })
                        }
                        _ => None,
                    };
                    Ok(PlatformAccount {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        sealed_refresh_token,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn set_plan(db: &Database, user_id: &str, monthly_limit: i64) -> Result<(), ReplywiseError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO plans (user_id, monthly_limit) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET monthly_limit = excluded.monthly_limit",
                params![user_id, monthly_limit],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
