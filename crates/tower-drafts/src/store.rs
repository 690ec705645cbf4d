//! In-memory store for drafts pending review.

use std::sync::RwLock;

use crate::draft::{Draft, DraftId};

/// In-memory store for drafts pending review, newest first.
///
/// Thread-safe via internal [`RwLock`]. Drafts are never mutated in place;
/// operator edits live in the caller's form state until approval.
///
/// # Example
///
/// ```
/// use tower_drafts::{Draft, DraftStore};
/// use tower_core::EntityKind;
///
/// let store = DraftStore::new();
/// let draft = Draft::new(EntityKind::Promo, "Fall promo", serde_json::Map::new());
/// let id = draft.id.clone();
/// store.add(draft);
/// assert_eq!(store.len(), 1);
/// assert!(store.remove(&id).is_some());
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct DraftStore {
    drafts: RwLock<Vec<Draft>>,
}

impl DraftStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Draft>> {
        self.drafts.read().unwrap_or_else(|e| {
            tracing::warn!("DraftStore read lock poisoned, recovering");
            e.into_inner()
        })
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Draft>> {
        self.drafts.write().unwrap_or_else(|e| {
            tracing::warn!("DraftStore write lock poisoned, recovering");
            e.into_inner()
        })
    }

    /// Add a draft at the front of the list.
    ///
    /// A draft with the same id is replaced.
    pub fn add(&self, draft: Draft) {
        let mut drafts = self.write();
        drafts.retain(|d| d.id != draft.id);
        tracing::debug!(draft_id = %draft.id, kind = %draft.kind, "Draft added");
        drafts.insert(0, draft);
    }

    /// Remove a draft, returning it. Unknown ids are a no-op.
    pub fn remove(&self, id: &DraftId) -> Option<Draft> {
        let mut drafts = self.write();
        let index = drafts.iter().position(|d| &d.id == id)?;
        Some(drafts.remove(index))
    }

    /// Get a copy of a draft.
    #[must_use]
    pub fn get(&self, id: &DraftId) -> Option<Draft> {
        self.read().iter().find(|d| &d.id == id).cloned()
    }

    /// Snapshot of all drafts, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<Draft> {
        self.read().clone()
    }

    /// Number of pending drafts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no drafts are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drop every pending draft.
    pub fn clear(&self) {
        self.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use tower_core::EntityKind;

    fn draft(id: &str) -> Draft {
        Draft::new(EntityKind::Drop, id, Map::new()).with_id(id)
    }

    #[test]
    fn test_newest_first() {
        let store = DraftStore::new();
        store.add(draft("a"));
        store.add(draft("b"));
        store.add(draft("c"));

        let ids: Vec<String> = store.list().iter().map(|d| d.id.to_string()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let store = DraftStore::new();
        store.add(draft("a"));
        assert!(store.remove(&DraftId::from("zzz")).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_id_replaces() {
        let store = DraftStore::new();
        store.add(draft("a"));
        store.add(draft("b"));
        let mut updated = draft("a");
        updated.summary = "again".to_string();
        store.add(updated);

        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].summary, "again");
    }

    #[test]
    fn test_get_and_clear() {
        let store = DraftStore::new();
        store.add(draft("a"));
        assert_eq!(store.get(&DraftId::from("a")).unwrap().summary, "a");
        assert!(store.get(&DraftId::from("b")).is_none());

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let store = DraftStore::new();
        store.add(draft("a"));
        let snapshot = store.list();
        store.clear();
        assert_eq!(snapshot.len(), 1);
    }
}
