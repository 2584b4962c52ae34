// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for reply generation.
//!
//! [`template`] renders `{{VAR}}`, `{{#VAR}}` and `{{^VAR}}` directives against
//! an explicit [`TemplateVars`] bag; [`builder`] derives that bag from a
//! business's configuration and the review being answered.

pub mod builder;
pub mod template;

pub use builder::{DEFAULT_TEMPLATE, PromptBuilder};
pub use template::{Template, TemplateVars, render};
