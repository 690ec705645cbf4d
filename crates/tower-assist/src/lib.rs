//! Tower Assist - the drafting assistant seam.
//!
//! The console asks a generative model for field values while an operator
//! reviews a draft ("auto-fill"). This crate provides:
//!
//! - [`FormAssistant`], the trait the review flow calls
//! - [`merge_suggestion`], how a suggestion is folded into form state
//! - [`extract_json_object`], pulling a JSON object out of free model text
//! - [`ClaudeAssistant`], an implementation over the Anthropic Messages API
//!
//! Suggestions are untrusted. Nothing here validates their shape; the
//! draft sanitizer does that before anything is persisted.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod assistant;
pub mod claude;
pub mod error;
pub mod extract;

pub use assistant::{FormAssistant, merge_suggestion};
pub use claude::{ClaudeAssistant, ClaudeSettings};
pub use error::{AssistError, AssistResult};
pub use extract::extract_json_object;
