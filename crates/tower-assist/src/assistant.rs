//! The assistant trait and suggestion merging.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tower_core::EntityKind;

use crate::error::AssistResult;

/// A generative model that proposes form values for a record kind.
///
/// # Example
///
/// ```rust,ignore
/// use tower_assist::{FormAssistant, AssistResult};
///
/// struct Canned;
///
/// #[async_trait::async_trait]
/// impl FormAssistant for Canned {
///     async fn suggest(
///         &self,
///         kind: EntityKind,
///         context: Option<&str>,
///     ) -> AssistResult<Option<Map<String, Value>>> {
///         Ok(None) // nothing to offer
///     }
/// }
/// ```
#[async_trait]
pub trait FormAssistant: Send + Sync {
    /// Propose field values for a `kind` form.
    ///
    /// `context` is free-form operator text (a brief, the current form as
    /// JSON, ...). `Ok(None)` means "no suggestion available" and must leave
    /// the caller's form untouched.
    async fn suggest(
        &self,
        kind: EntityKind,
        context: Option<&str>,
    ) -> AssistResult<Option<Map<String, Value>>>;
}

/// Fold a suggestion into form state. Suggested keys overwrite existing ones.
///
/// Returns the number of keys written.
pub fn merge_suggestion(form: &mut Map<String, Value>, suggestion: Map<String, Value>) -> usize {
    let count = suggestion.len();
    for (key, value) in suggestion {
        form.insert(key, value);
    }
    count
}
