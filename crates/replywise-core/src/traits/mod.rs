// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Replywise pipeline.
//!
//! Every external dependency of the pipeline (storage, text generation,
//! the review platform, notifications) sits behind one of these traits.
//! All adapters extend [`PluginAdapter`] and use `#[async_trait]` for
//! dynamic dispatch compatibility.

pub mod adapter;
pub mod generator;
pub mod notifier;
pub mod platform;
pub mod storage;
pub mod usage;

pub use adapter::PluginAdapter;
pub use generator::ReplyGenerator;
pub use notifier::ReplyNotifier;
pub use platform::ReviewPlatform;
pub use storage::ReviewStore;
pub use usage::UsageLedger;
