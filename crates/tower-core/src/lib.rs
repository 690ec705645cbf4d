//! Tower Core - Foundation types for the Control Tower admin console.
//!
//! This crate provides:
//! - [`EntityKind`], the closed set of record kinds the AI assistant may draft
//! - The per-kind field allowlist that gates what reaches persistence
//! - Collection names and console destinations for each kind
//! - [`Timestamp`], the UTC timestamp used across the workspace
//!
//! # Example
//!
//! ```
//! use tower_core::EntityKind;
//!
//! let kind: EntityKind = "stamp".parse().unwrap();
//! assert_eq!(kind.collection(), "stamps");
//! assert!(kind.allows("external_id"));
//! assert!(!EntityKind::Promo.allows("created_at"));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod entity;
pub mod types;

pub use entity::{Destination, EntityKind, UnknownEntityKind};
pub use types::Timestamp;
