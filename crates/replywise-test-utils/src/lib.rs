// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Replywise integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockGenerator`] - scripted reply generator that records prompts
//! - [`MockPlatform`] - review platform with scripted pages and post outcomes
//! - [`RecordingNotifier`] - keeps every reply notice
//! - [`FaultyStore`] - store wrapper that fails queued writes
//! - [`TestHarness`] - the full pipeline over a temp SQLite database

pub mod faulty_store;
pub mod harness;
pub mod mock_generator;
pub mod mock_platform;
pub mod recording_notifier;

pub use faulty_store::FaultyStore;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_generator::{DEFAULT_MOCK_REPLY, MockGenerator, MockReply};
pub use mock_platform::{MOCK_ACCESS_TOKEN, MockPlatform, PostOutcome, PostedCall, listed_review};
pub use recording_notifier::RecordingNotifier;
