//! Integration tests for the draft approval flow.
//!
//! Drives `ReviewManager` end to end against scripted and in-memory
//! backends: what gets persisted, what the operator is told, and when a
//! draft leaves the store.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tower_core::EntityKind;
use tower_drafts::{Dispatcher, DraftId, DraftStore, ReviewManager, ReviewOutcome, parse_proposals};
use tower_storage::{MemoryGateway, PersistenceGateway};
use tower_test::{
    MockAssistant, MockGateway, all_collections, form, member_form, promo_form, stamp_form,
    test_draft,
};

fn manager_with(gateway: Arc<dyn PersistenceGateway>) -> ReviewManager {
    tower_test::init_test_tracing();
    ReviewManager::new(Arc::new(DraftStore::new()), gateway, Dispatcher::default())
}

fn add(manager: &ReviewManager, kind: EntityKind, data: Value) -> DraftId {
    let draft = test_draft(kind, data);
    let id = draft.id.clone();
    manager.store().add(draft);
    id
}

#[tokio::test]
async fn test_promo_persists_only_allowed_fields() {
    let gateway = Arc::new(MockGateway::new());
    let manager = manager_with(gateway.clone());
    let id = manager.propose(EntityKind::Promo, "Fall promo", promo_form());

    let outcome = manager.approve(&id, None).await;
    assert!(outcome.is_approved(), "{outcome:?}");

    let created = gateway.created("promos");
    assert_eq!(created.len(), 1);
    assert_eq!(
        Value::Object(created[0].clone()),
        json!({"name": "Fall Flash Sale", "code": "FALL10"})
    );
    assert!(manager.store().is_empty());
}

#[tokio::test]
async fn test_stamp_draft_id_becomes_external_id() {
    let gateway = Arc::new(MockGateway::new());
    let manager = manager_with(gateway.clone());
    let id = manager.propose(EntityKind::Stamp, "Golden Wing", stamp_form());

    let outcome = manager.approve(&id, None).await;
    let ReviewOutcome::Approved { destination, .. } = outcome else {
        panic!("expected approval, got {outcome:?}");
    };
    assert_eq!(destination.label, "Inventory");
    assert_eq!(destination.route, "/inventory");

    let payload = &gateway.created("stamps")[0];
    assert!(!payload.contains_key("id"));
    assert_eq!(payload["external_id"], "stp_abc");
    assert_eq!(payload["status"], "draft");
    assert_eq!(payload["name"], "Golden Wing");
    assert_eq!(payload["rarity"], "Legendary");
    assert_eq!(payload["price_eggs"], 80);
}

#[tokio::test]
async fn test_stamp_status_is_always_draft() {
    let gateway = Arc::new(MockGateway::new());
    let manager = manager_with(gateway.clone());

    for status in [json!("live"), json!("archived"), json!(null), json!(false)] {
        let id = add(&manager, EntityKind::Stamp, json!({"name": "s", "status": status}));
        assert!(manager.approve(&id, None).await.is_approved());
    }

    let created = gateway.created("stamps");
    assert_eq!(created.len(), 4);
    assert!(created.iter().all(|p| p["status"] == "draft"));
}

#[tokio::test]
async fn test_member_enums_fall_back_to_defaults() {
    let gateway = Arc::new(MockGateway::new());
    let manager = manager_with(gateway.clone());
    let id = manager.propose(EntityKind::Member, "New ops member", member_form());

    assert!(manager.approve(&id, None).await.is_approved());

    let payload = &gateway.created("members")[0];
    assert_eq!(payload["role"], "member");
    assert_eq!(payload["tier"], "free");
    assert!(!payload.contains_key("password"));
}

#[tokio::test]
async fn test_missing_table_keeps_draft_unchanged() {
    let gateway = Arc::new(
        MockGateway::new().with_error_body(json!({"message": "relation \"promos\" does not exist"})),
    );
    let manager = manager_with(gateway);
    let id = manager.propose(EntityKind::Promo, "Fall promo", promo_form());
    let before = manager.store().get(&id).unwrap();

    let outcome = manager.approve(&id, None).await;
    let ReviewOutcome::Failed {
        message,
        missing_collection,
    } = outcome
    else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(missing_collection);
    assert!(message.contains("`promos` table does not exist yet"));
    assert_eq!(manager.store().get(&id).unwrap(), before);
}

#[tokio::test]
async fn test_empty_error_body_is_readable() {
    let gateway = Arc::new(MockGateway::new().with_error_body(json!({})));
    let manager = manager_with(gateway);
    let id = manager.propose(EntityKind::Promo, "Fall promo", promo_form());

    let outcome = manager.approve(&id, None).await;
    let ReviewOutcome::Failed {
        message,
        missing_collection,
    } = outcome
    else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(!missing_collection);
    assert!(message.starts_with("Failed to save promo: "));
    assert!(message.contains("{}"));
    assert!(!message.contains("[object Object]"));
    assert_eq!(manager.store().len(), 1);
}

#[tokio::test]
async fn test_transport_failure_keeps_draft() {
    let gateway = Arc::new(MockGateway::new().with_transport_failure("connection reset"));
    let manager = manager_with(gateway.clone());
    let id = add(&manager, EntityKind::Drop, json!({"title": "Fall drop"}));

    let outcome = manager.approve(&id, None).await;
    let ReviewOutcome::Failed { message, .. } = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(message.starts_with("Failed to save drop: "));
    assert!(message.contains("connection reset"));
    assert!(manager.store().get(&id).is_some());

    // Same draft, next attempt succeeds.
    assert!(manager.approve(&id, None).await.is_approved());
    assert!(manager.store().is_empty());
    assert_eq!(gateway.created("drops").len(), 2);
}

#[tokio::test]
async fn test_approve_after_provisioning() {
    let gateway = Arc::new(MemoryGateway::new());
    let manager = manager_with(gateway.clone());
    let id = manager.propose(EntityKind::Stamp, "Golden Wing", stamp_form());

    let first = manager.approve(&id, None).await;
    assert!(matches!(
        first,
        ReviewOutcome::Failed {
            missing_collection: true,
            ..
        }
    ));

    gateway.provision("stamps");
    assert!(manager.approve(&id, None).await.is_approved());

    let rows = gateway.records("stamps");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["external_id"], "stp_abc");
}

#[tokio::test]
async fn test_reject_always_removes() {
    let manager = manager_with(Arc::new(MockGateway::new()));

    for kind in EntityKind::ALL {
        let id = add(&manager, kind, json!({"garbage": [1, 2, 3], "nested": {"x": null}}));
        assert!(manager.reject(&id));
        assert!(manager.store().get(&id).is_none());
    }
    assert!(manager.store().is_empty());
}

#[tokio::test]
async fn test_concurrent_approval_is_refused() {
    let gateway = Arc::new(MockGateway::new().with_delay(Duration::from_millis(200)));
    let manager = manager_with(gateway.clone());
    let id = manager.propose(EntityKind::Promo, "Fall promo", promo_form());

    let (first, second) = tokio::join!(manager.approve(&id, None), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        manager.approve(&id, None).await
    });

    assert!(first.is_approved());
    assert_eq!(second, ReviewOutcome::InFlight);
    assert_eq!(gateway.created("promos").len(), 1);
}

#[tokio::test]
async fn test_reject_refused_while_approval_saves() {
    let gateway = Arc::new(MockGateway::new().with_delay(Duration::from_millis(200)));
    let manager = manager_with(gateway.clone());
    let id = manager.propose(EntityKind::Promo, "Fall promo", promo_form());

    let (approved, rejected) = tokio::join!(manager.approve(&id, None), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        manager.reject(&id)
    });

    assert!(approved.is_approved());
    assert!(!rejected);
    assert_eq!(gateway.created("promos").len(), 1);
    assert!(manager.store().is_empty());
}

#[tokio::test]
async fn test_reject_then_approve_persists_nothing() {
    let gateway = Arc::new(MockGateway::new());
    let manager = manager_with(gateway.clone());
    let id = manager.propose(EntityKind::Promo, "Fall promo", promo_form());

    assert!(manager.reject(&id));
    assert_eq!(manager.approve(&id, None).await, ReviewOutcome::NotFound);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_autofill_output_is_still_sanitized() {
    let gateway = Arc::new(MockGateway::new());
    let assistant = MockAssistant::new().with_suggestion(form(json!({
        "subject": "Autumn is here",
        "channels": ["email", "push"],
        "internal_notes": "do not persist"
    })));
    let manager = manager_with(gateway.clone()).with_assistant(Arc::new(assistant.clone()));
    let id = add(&manager, EntityKind::Broadcast, json!({"name": "Fall newsletter"}));

    let draft = manager.store().get(&id).unwrap();
    let filled = manager
        .autofill(EntityKind::Broadcast, draft.data.clone(), Some("fall launch"))
        .await;
    assert_eq!(filled["internal_notes"], "do not persist");

    assert!(manager.approve(&id, Some(filled)).await.is_approved());
    let payload = &gateway.created("broadcasts")[0];
    assert_eq!(payload["name"], "Fall newsletter");
    assert_eq!(payload["subject"], "Autumn is here");
    assert!(!payload.contains_key("internal_notes"));

    assert_eq!(
        assistant.requests(),
        vec![(EntityKind::Broadcast, Some("fall launch".to_string()))]
    );
}

#[tokio::test]
async fn test_autofill_failure_leaves_form() {
    let assistant = MockAssistant::new().with_failure("Status 529: overloaded");
    let manager =
        manager_with(Arc::new(MockGateway::new())).with_assistant(Arc::new(assistant));

    let original = promo_form();
    let filled = manager
        .autofill(EntityKind::Promo, original.clone(), None)
        .await;
    assert_eq!(filled, original);
}

#[tokio::test]
async fn test_proposals_to_backend() {
    let gateway = Arc::new(MemoryGateway::with_collections(all_collections()));
    let manager = manager_with(gateway.clone());

    let proposals = json!([
        {"type": "drop", "summary": "Fall drop", "data": {"title": "Fall", "artist": "?"}},
        {"type": "coupon", "summary": "unknown kind", "data": {}},
        {"type": "stamp", "data": {"id": "stp_leaf", "name": "Maple Leaf"}},
        {"type": "promo", "data": "not an object"}
    ]);
    for draft in parse_proposals(&proposals) {
        manager.store().add(draft);
    }
    assert_eq!(manager.store().len(), 2);

    for draft in manager.store().list() {
        assert!(manager.approve(&draft.id, None).await.is_approved());
    }
    assert!(manager.store().is_empty());

    let drops = gateway.records("drops");
    assert_eq!(drops.len(), 1);
    assert!(!drops[0].contains_key("artist"));

    let stamps = gateway.records("stamps");
    assert_eq!(stamps[0]["external_id"], "stp_leaf");
    assert_ne!(stamps[0]["id"], "stp_leaf");
}
