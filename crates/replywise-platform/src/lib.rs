// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review platform integration.
//!
//! [`PlatformClient`] implements [`replywise_core::ReviewPlatform`] over HTTP:
//! OAuth refresh-token exchange, paginated review listing and reply posting.
//! [`PublishClient`] wraps any platform with per-use token decryption, a
//! timeout and error classification.

pub mod client;
pub mod publish;
pub mod wire;

pub use client::{PlatformClient, classify_status};
pub use publish::PublishClient;
