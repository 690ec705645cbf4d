//! Tower Test - Shared test utilities for Control Tower.
//!
//! This crate provides mock implementations and test helpers that can be
//! used across multiple Control Tower crates as a dev-dependency.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! tower-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust,ignore
//! #[cfg(test)]
//! mod tests {
//!     use tower_test::{MockGateway, form};
//!
//!     #[tokio::test]
//!     async fn test_backend_failure() {
//!         let gateway = MockGateway::new()
//!             .with_error_body(serde_json::json!({"message": "duplicate key"}));
//!
//!         let err = gateway.create("promos", form(json!({}))).await.unwrap_err();
//!         assert_eq!(err.to_string(), "duplicate key");
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
