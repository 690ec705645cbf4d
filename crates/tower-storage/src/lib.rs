//! Tower Storage - the persistence gateway.
//!
//! Records approved in the console are written to a managed backend through
//! the [`PersistenceGateway`] trait. The trait is keyed by collection name
//! and exposes `create`, `update` and `list`.
//!
//! # Implementations
//!
//! | Gateway | Backend | Use |
//! |---------|---------|-----|
//! | [`MemoryGateway`] | In-process maps | Tests, `--dry-run` review sessions |
//! | [`RestGateway`] | PostgREST (`/rest/v1/{collection}`) | Production |
//!
//! # Errors
//!
//! Every gateway reports failures as a structured [`GatewayError`]. Raw
//! backend error bodies, whose shape is not guaranteed, are classified with
//! [`GatewayError::from_error_body`] so the operator always gets readable
//! text and missing collections are told apart from other failures.
//!
//! # Example
//!
//! ```
//! use tower_storage::{MemoryGateway, PersistenceGateway};
//!
//! # tokio_test_block(async {
//! let gateway = MemoryGateway::with_collections(["promos"]);
//! let mut payload = serde_json::Map::new();
//! payload.insert("code".into(), "FALL10".into());
//!
//! let record = gateway.create("promos", payload).await.unwrap();
//! assert_eq!(record["code"], "FALL10");
//!
//! let err = gateway.create("drops", serde_json::Map::new()).await.unwrap_err();
//! assert!(err.is_missing_collection());
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod gateway;
pub mod memory;
pub mod rest;

pub use error::{GatewayError, GatewayResult};
pub use gateway::{Listing, PersistenceGateway};
pub use memory::MemoryGateway;
pub use rest::{RestGateway, RestGatewayConfig};
