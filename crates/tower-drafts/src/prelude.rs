//! Prelude module - commonly used types for convenient import.
//!
//! Use `use tower_drafts::prelude::*;` to import all essential types.

pub use crate::{
    DispatchRules, Dispatcher, Draft, DraftId, DraftStore, ReviewManager, ReviewOutcome,
    SaveFailure, SavedRecord, parse_proposals, sanitize,
};
