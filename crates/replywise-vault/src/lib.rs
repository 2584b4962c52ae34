// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM protection for platform refresh tokens.
//!
//! Refresh tokens are sealed before they reach storage and opened only for
//! the duration of a single publish or import call.

pub mod cipher;
pub mod crypto;

pub use cipher::{TokenCipher, mask_secret};
