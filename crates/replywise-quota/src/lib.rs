// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monthly reply quota enforcement.
//!
//! Usage is derived from quota-consuming reply records in the current UTC
//! calendar month. It is never stored or reset explicitly.

pub mod guard;

pub use guard::QuotaGuard;
