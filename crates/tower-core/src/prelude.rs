//! Prelude module - commonly used types for convenient import.
//!
//! Use `use tower_core::prelude::*;` to import all essential types.

pub use crate::{Destination, EntityKind, Timestamp, UnknownEntityKind};
