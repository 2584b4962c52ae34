// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric descriptions and recording helpers.
//!
//! Recording goes through the metrics facade, so these are no-ops until a
//! recorder is installed.

use metrics::{describe_counter, describe_gauge, describe_histogram};

pub const REPLIES_TOTAL: &str = "replywise_replies_total";
pub const REVIEWS_INGESTED_TOTAL: &str = "replywise_reviews_ingested_total";
pub const GENERATION_LATENCY_SECONDS: &str = "replywise_generation_latency_seconds";
pub const PUBLISH_TOTAL: &str = "replywise_publish_total";
pub const IMPORT_PAGES_TOTAL: &str = "replywise_import_pages_total";

/// Registers every Replywise metric description. Call once after the
/// recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        REPLIES_TOTAL,
        "Reviews that finished a pipeline round, by final reply status"
    );
    describe_counter!(
        REVIEWS_INGESTED_TOTAL,
        "Review deliveries by origin (webhook, import) and outcome (created, duplicate)"
    );
    describe_histogram!(
        GENERATION_LATENCY_SECONDS,
        "Latency of reply generation calls in seconds"
    );
    describe_counter!(PUBLISH_TOTAL, "Reply publish attempts by outcome");
    describe_counter!(IMPORT_PAGES_TOTAL, "Review listing pages processed by imports");
    describe_gauge!("replywise_memory_heap_bytes", "Allocated heap bytes (jemalloc)");
    describe_gauge!("replywise_memory_resident_bytes", "Resident bytes (jemalloc)");
}

/// A review reached `status` at the end of a pipeline round.
pub fn record_reply(status: &str) {
    metrics::counter!(REPLIES_TOTAL, "status" => status.to_string()).increment(1);
}

/// A review delivery from `origin` ended as `outcome`.
pub fn record_ingestion(origin: &str, outcome: &str) {
    metrics::counter!(
        REVIEWS_INGESTED_TOTAL,
        "origin" => origin.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

pub fn record_generation_latency(seconds: f64) {
    metrics::histogram!(GENERATION_LATENCY_SECONDS).record(seconds);
}

/// `outcome` is `success` or a publish error kind such as `rate_limited`.
pub fn record_publish(outcome: &str) {
    metrics::counter!(PUBLISH_TOTAL, "outcome" => outcome.to_string()).increment(1);
}

pub fn record_import_page() {
    metrics::counter!(IMPORT_PAGES_TOTAL).increment(1);
}

pub fn set_memory_heap(bytes: f64) {
    metrics::gauge!("replywise_memory_heap_bytes").set(bytes);
}

pub fn set_memory_resident(bytes: f64) {
    metrics::gauge!("replywise_memory_resident_bytes").set(bytes);
}
