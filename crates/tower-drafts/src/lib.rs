//! Tower Drafts - the draft sanitize-and-persist pipeline.
//!
//! AI-authored proposals flow through this crate on their way to the
//! backend:
//!
//! ```text
//! assistant ─► parse_proposals ─► DraftStore ─► operator edits
//!                                                   │
//!             DraftStore::remove ◄─ gateway.create ◄┴─ Dispatcher::save
//!                                  (normalize ─► sanitize)
//! ```
//!
//! - [`Draft`] / [`DraftStore`]: pending proposals, newest first
//! - [`sanitize`]: allowlist projection of untrusted form data
//! - [`Dispatcher`]: per-kind normalization and persistence
//! - [`ReviewManager`]: approve / reject / auto-fill
//! - [`parse_proposals`]: assistant JSON to drafts
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tower_core::EntityKind;
//! use tower_drafts::prelude::*;
//! use tower_storage::MemoryGateway;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let gateway = Arc::new(MemoryGateway::with_collections(["promos"]));
//! let review = ReviewManager::new(Arc::new(DraftStore::new()), gateway, Dispatcher::default());
//!
//! let mut data = serde_json::Map::new();
//! data.insert("code".into(), "FALL10".into());
//! data.insert("created_at".into(), "yesterday".into());
//! let id = review.propose(EntityKind::Promo, "Fall promo", data);
//!
//! let outcome = review.approve(&id, None).await;
//! assert!(outcome.is_approved());
//! assert!(review.store().is_empty());
//! # });
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod dispatch;
pub mod draft;
pub mod error;
pub mod proposal;
pub mod review;
pub mod sanitize;
pub mod store;

pub use dispatch::{DEFAULT_STAMP_ID_PREFIX, DispatchRules, Dispatcher, SaveFailure, SavedRecord};
pub use draft::{Draft, DraftId};
pub use error::{DraftError, DraftResult};
pub use proposal::{load_proposals, parse_proposals};
pub use review::{ReviewManager, ReviewOutcome};
pub use sanitize::sanitize;
pub use store::DraftStore;
