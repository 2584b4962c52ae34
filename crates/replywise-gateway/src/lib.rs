// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Replywise.
//!
//! Receives review notifications, exposes the internal pipeline trigger and
//! the human reply actions, and serves health and metrics. Everything under
//! `/v1` requires a bearer token.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayState, HealthState, ServerConfig, build_router, start_server};
