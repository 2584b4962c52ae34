// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamp helpers.
//!
//! All stored timestamps are UTC ISO 8601 strings with millisecond precision,
//! so lexical order equals chronological order.

use chrono::{DateTime, Datelike, TimeZone, Utc};

use crate::error::ReplywiseError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Current time in storage format.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Parses any RFC 3339 timestamp and re-renders it in storage format.
pub fn normalize_timestamp(value: &str) -> Result<String, ReplywiseError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|at| format_timestamp(at.with_timezone(&Utc)))
        .map_err(|e| ReplywiseError::Config(format!("invalid timestamp `{value}`: {e}")))
}

/// First instant of the calendar month containing `now`, in storage format.
pub fn month_start(now: DateTime<Utc>) -> String {
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    format_timestamp(start)
}
