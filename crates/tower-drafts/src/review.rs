//! Review manager - orchestrates the operator's approval flow.
//!
//! The [`ReviewManager`] coordinates between:
//! - The [`DraftStore`] (proposals pending review)
//! - The [`Dispatcher`] (normalize, sanitize, create)
//! - The [`PersistenceGateway`] (backend collections)
//! - An optional [`FormAssistant`] (auto-fill)
//!
//! # Approval Flow
//!
//! 1. Refuse a second approval while one is outstanding for the same draft
//! 2. Look up the draft; unknown ids are `NotFound`
//! 3. Save the operator's form (or the draft's own data) through the dispatcher
//! 4. On success remove the draft and return the destination hint
//! 5. On failure keep the draft unchanged and return one operator message
//!
//! A draft whose save is outstanding cannot be rejected.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_assist::{FormAssistant, merge_suggestion};
use tower_core::{Destination, EntityKind};
use tower_storage::PersistenceGateway;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::dispatch::Dispatcher;
use crate::draft::{Draft, DraftId};
use crate::store::DraftStore;

/// The result of an approval attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    /// The record was created and the draft removed.
    Approved {
        /// The record as stored by the backend.
        record: Value,
        /// Console view where the record can be configured next.
        destination: Destination,
    },
    /// The save failed; the draft is still pending, unchanged.
    Failed {
        /// Message for the operator.
        message: String,
        /// Whether the kind's collection has not been provisioned.
        missing_collection: bool,
    },
    /// No draft with that id is pending.
    NotFound,
    /// An approval for this draft is already in progress.
    InFlight,
}

impl ReviewOutcome {
    /// Check if the record was saved.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }

    /// Check if the save failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Removes a draft id from the in-flight set when dropped.
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<DraftId>>,
    id: DraftId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| {
            tracing::warn!("In-flight set lock poisoned, recovering");
            e.into_inner()
        });
        set.remove(&self.id);
    }
}

/// Drives review of pending drafts.
pub struct ReviewManager {
    store: Arc<DraftStore>,
    gateway: Arc<dyn PersistenceGateway>,
    dispatcher: Dispatcher,
    assistant: Option<Arc<dyn FormAssistant>>,
    in_flight: Mutex<HashSet<DraftId>>,
}

impl std::fmt::Debug for ReviewManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewManager")
            .field("pending", &self.store.len())
            .field("gateway", &self.gateway.name())
            .field("dispatcher", &self.dispatcher)
            .field("assistant", &self.assistant.is_some())
            .finish_non_exhaustive()
    }
}

impl ReviewManager {
    /// Create a review manager without an assistant.
    #[must_use]
    pub fn new(
        store: Arc<DraftStore>,
        gateway: Arc<dyn PersistenceGateway>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            store,
            gateway,
            dispatcher,
            assistant: None,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Attach an assistant for [`autofill`](Self::autofill).
    #[must_use]
    pub fn with_assistant(mut self, assistant: Arc<dyn FormAssistant>) -> Self {
        self.assistant = Some(assistant);
        self
    }

    /// The draft store.
    #[must_use]
    pub fn store(&self) -> &Arc<DraftStore> {
        &self.store
    }

    /// The dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Whether an assistant is attached.
    #[must_use]
    pub fn has_assistant(&self) -> bool {
        self.assistant.is_some()
    }

    /// Add a new draft and return its id.
    pub fn propose(
        &self,
        kind: EntityKind,
        summary: impl Into<String>,
        data: Map<String, Value>,
    ) -> DraftId {
        let draft = Draft::new(kind, summary, data);
        let id = draft.id.clone();
        self.store.add(draft);
        id
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashSet<DraftId>> {
        self.in_flight.lock().unwrap_or_else(|e| {
            tracing::warn!("In-flight set lock poisoned, recovering");
            e.into_inner()
        })
    }

    fn claim(&self, id: &DraftId) -> Option<InFlightGuard<'_>> {
        self.lock_in_flight().insert(id.clone()).then(|| InFlightGuard {
            in_flight: &self.in_flight,
            id: id.clone(),
        })
    }

    /// Approve a draft, persisting `form` (or the draft's data when `None`).
    ///
    /// The draft is removed only if the record was created.
    pub async fn approve(&self, id: &DraftId, form: Option<Map<String, Value>>) -> ReviewOutcome {
        let Some(_guard) = self.claim(id) else {
            debug!(draft_id = %id, "Approval already in progress");
            return ReviewOutcome::InFlight;
        };
        let Some(draft) = self.store.get(id) else {
            debug!(draft_id = %id, "Approve requested for unknown draft");
            return ReviewOutcome::NotFound;
        };

        let span = info_span!("approve", draft_id = %id, kind = %draft.kind);
        let form = form.unwrap_or(draft.data);

        let result = self
            .dispatcher
            .save(self.gateway.as_ref(), draft.kind, &form)
            .instrument(span.clone())
            .await;

        span.in_scope(|| match result {
            Ok(saved) => {
                self.store.remove(id);
                info!(destination = %saved.destination, "Draft approved");
                ReviewOutcome::Approved {
                    record: saved.record,
                    destination: saved.destination,
                }
            },
            Err(failure) => {
                warn!(error = %failure.error, "Draft kept after failed save");
                ReviewOutcome::Failed {
                    message: failure.operator_message(),
                    missing_collection: failure.is_missing_collection(),
                }
            },
        })
    }

    /// Reject a draft. Returns whether it was removed.
    ///
    /// Refused while an approval for the draft is saving.
    pub fn reject(&self, id: &DraftId) -> bool {
        let in_flight = self.lock_in_flight();
        if in_flight.contains(id) {
            debug!(draft_id = %id, "Reject refused, approval in progress");
            return false;
        }
        let removed = self.store.remove(id);
        drop(in_flight);
        match &removed {
            Some(draft) => info!(draft_id = %id, kind = %draft.kind, "Draft rejected"),
            None => debug!(draft_id = %id, "Reject requested for unknown draft"),
        }
        removed.is_some()
    }

    /// Ask the assistant to fill in `form`.
    ///
    /// Suggested keys overwrite form keys. With no assistant, no suggestion
    /// or an assistant error the form comes back unchanged.
    pub async fn autofill(
        &self,
        kind: EntityKind,
        mut form: Map<String, Value>,
        context: Option<&str>,
    ) -> Map<String, Value> {
        let Some(assistant) = &self.assistant else {
            debug!(kind = %kind, "No assistant configured, skipping auto-fill");
            return form;
        };

        match assistant.suggest(kind, context).await {
            Ok(Some(suggestion)) => {
                let written = merge_suggestion(&mut form, suggestion);
                info!(kind = %kind, fields = written, "Auto-fill applied");
            },
            Ok(None) => info!(kind = %kind, "Assistant had no suggestion"),
            Err(e) => warn!(kind = %kind, error = %e, "Auto-fill failed"),
        }
        form
    }
}
