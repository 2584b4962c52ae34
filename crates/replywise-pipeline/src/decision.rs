// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto-post decision.

use replywise_core::types::StarConfig;

/// True when a reply generated under `star` must be published in the same
/// processing round instead of being held for approval.
///
/// A failed publish then leaves the review `failed` with the draft kept;
/// it is never downgraded to `pending`.
pub fn should_auto_post(star: &StarConfig) -> bool {
    star.auto_reply
}
