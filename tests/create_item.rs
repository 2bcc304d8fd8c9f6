// Tests for the write path: typed errors reach the caller.
mod common;

use chrono::{Local, Timelike};
use common::{fixed_now, pipeline, pipeline_for};
use nextup::error::StoreError;
use nextup::model::{AuthorizationState, ListHandle, NewItem};
use nextup::store::MemoryStore;
use std::sync::Arc;

fn store() -> MemoryStore {
    MemoryStore::authorized()
        .with_list(ListHandle::new("p1", "Personal"))
        .with_list(ListHandle::new("w1", "Work"))
}

#[tokio::test]
async fn test_empty_title_is_invalid_input() {
    let pipeline = pipeline(store().with_default_list("p1"));

    for title in ["", "   "] {
        let err = pipeline.create_item(NewItem::new(title)).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)), "got {:?}", err);
    }
}

#[tokio::test]
async fn test_unknown_list_is_list_not_found() {
    let pipeline = pipeline(store().with_default_list("p1"));

    let item = NewItem {
        list_id: Some("nope".to_string()),
        ..NewItem::new("Pay rent")
    };
    match pipeline.create_item(item).await {
        Err(StoreError::ListNotFound(id)) => assert_eq!(id, "nope"),
        other => panic!("expected ListNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_default_list_is_reported() {
    let pipeline = pipeline(store());
    let err = pipeline.create_item(NewItem::new("Pay rent")).await.unwrap_err();
    assert!(matches!(err, StoreError::NoDefaultList));
}

#[tokio::test]
async fn test_created_item_lands_in_the_requested_list() {
    let store = Arc::new(store().with_default_list("p1"));
    let pipeline = pipeline_for(store.clone(), true);

    let due = fixed_now() + chrono::Duration::hours(2);
    let uid = pipeline
        .create_item(NewItem {
            title: "  Quarterly review  ".to_string(),
            due: Some(due),
            notes: Some("bring slides".to_string()),
            list_id: Some("w1".to_string()),
        })
        .await
        .unwrap();

    let raw = store.item(&uid).await.unwrap();
    assert_eq!(raw.title.as_deref(), Some("Quarterly review"));
    assert_eq!(raw.list_id, "w1");
    assert_eq!(raw.notes.as_deref(), Some("bring slides"));
    assert!(!raw.completed);

    // Due dates are stored as wall-clock components of the local zone.
    let components = raw.due.unwrap();
    let local = due.with_timezone(&Local);
    assert_eq!(components.hour, Some(local.hour()));
    assert_eq!(components.resolve(), Some(due));
}

#[tokio::test]
async fn test_default_list_is_used_without_a_list_id() {
    let store = Arc::new(store().with_default_list("w1"));
    let pipeline = pipeline_for(store.clone(), true);

    let uid = pipeline.create_item(NewItem::new("Inbox zero")).await.unwrap();
    assert_eq!(store.item(&uid).await.unwrap().list_id, "w1");
}

#[tokio::test]
async fn test_refused_access_blocks_writes() {
    let denied = Arc::new(
        MemoryStore::new(AuthorizationState::Denied)
            .with_list(ListHandle::new("p1", "Personal"))
            .with_default_list("p1"),
    );
    let err = pipeline_for(denied, true)
        .create_item(NewItem::new("Nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AccessDenied));

    let restricted = Arc::new(MemoryStore::new(AuthorizationState::Restricted));
    let err = pipeline_for(restricted, true)
        .create_item(NewItem::new("Nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AccessRestricted));

    // Undetermined and not allowed to prompt.
    let pending = Arc::new(MemoryStore::new(AuthorizationState::NotDetermined));
    let err = pipeline_for(pending.clone(), false)
        .create_item(NewItem::new("Nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AccessDenied));
    assert_eq!(pending.access_requests().await, 0);
}

#[tokio::test]
async fn test_write_only_access_may_create() {
    let store = Arc::new(
        MemoryStore::new(AuthorizationState::WriteOnly)
            .with_list(ListHandle::new("p1", "Personal"))
            .with_default_list("p1"),
    );
    let pipeline = pipeline_for(store.clone(), true);
    let uid = pipeline.create_item(NewItem::new("Blind add")).await.unwrap();
    assert!(store.item(&uid).await.is_some());
}
