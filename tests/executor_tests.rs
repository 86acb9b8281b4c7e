//! Execution engine: recording, error mapping, success hooks and replay

mod common;

use common::{Reply, ScriptedTransport, executor};
use serde_json::json;
use ticketing_console::{
    Action, ApiCall, ConsoleError, DraftState, ExecutionRequest, HttpMethod, ServiceKey, lock_store,
};

#[test]
fn test_success_records_history_and_result() {
    let transport = ScriptedTransport::new(vec![Reply::ok(r#"{"status":"RESERVED"}"#)]);
    let (executor, store) = executor(transport.clone());

    let data = executor
        .execute(ExecutionRequest::new(
            "Reserve Order",
            ApiCall::post(ServiceKey::Order, "/orders/reserve", json!({"order_id": "o-1"})),
        ))
        .unwrap();
    assert_eq!(data, json!({"status": "RESERVED"}));

    let store = lock_store(&store).unwrap();
    let entry = store.history().latest().unwrap();
    assert_eq!(entry.label, "Reserve Order");
    assert_eq!(entry.method, HttpMethod::Post);
    assert_eq!(entry.path, "/orders/reserve");
    assert_eq!(entry.body, Some(json!({"order_id": "o-1"})));
    assert!(entry.ok);
    assert_eq!(entry.status, 200);
    assert_eq!(store.result().title, "Reserve Order");
    assert_eq!(store.result().status, Some(200));

    let seen = transport.seen();
    assert_eq!(seen[0].url, "http://127.0.0.1:8081/orders/reserve");
    assert_eq!(seen[0].body.as_deref(), Some(r#"{"order_id":"o-1"}"#));
}

#[test]
fn test_http_error_is_recorded_then_raised() {
    let transport = ScriptedTransport::new(vec![Reply::status(409, r#"{"error":"conflict"}"#)]);
    let (executor, store) = executor(transport);

    let err = executor
        .execute(Action::ReserveOrder.build(&DraftState::default()))
        .unwrap_err();
    assert_eq!(err.http_status(), Some(409));
    assert!(err.to_string().contains("conflict"));

    let store = lock_store(&store).unwrap();
    let entry = store.history().latest().unwrap();
    assert!(!entry.ok);
    assert_eq!(entry.status, 409);
    assert_eq!(store.result().status, Some(409));
    assert_eq!(store.result().data, json!({"error": "conflict"}));
}

#[test]
fn test_network_failure_records_nothing() {
    let transport = ScriptedTransport::new(vec![Reply::NetworkDown]);
    let (executor, store) = executor(transport);

    let err = executor
        .execute(Action::GetOrder.build(&DraftState::default()))
        .unwrap_err();
    assert!(matches!(err, ConsoleError::Network(_)));

    let store = lock_store(&store).unwrap();
    assert!(store.history().is_empty());
    assert_eq!(store.result().title, "Ready");
}

#[test]
fn test_create_order_captures_order_id() {
    let transport = ScriptedTransport::new(vec![Reply::ok(r#"{"OrderID":"abc","Status":"CREATED"}"#)]);
    let (executor, store) = executor(transport);

    executor
        .execute(Action::CreateOrder.build(&DraftState::default()))
        .unwrap();

    let store = lock_store(&store).unwrap();
    assert_eq!(store.drafts().order_id, "abc");
    assert_eq!(store.history().latest().unwrap().label, "Create Order");
}

#[test]
fn test_failed_create_order_leaves_drafts_alone() {
    let transport = ScriptedTransport::new(vec![Reply::status(500, r#"{"OrderID":"ghost"}"#)]);
    let (executor, store) = executor(transport);

    assert!(
        executor
            .execute(Action::CreateOrder.build(&DraftState::default()))
            .is_err()
    );
    assert_eq!(lock_store(&store).unwrap().drafts().order_id, "");
}

#[test]
fn test_non_json_body_kept_as_text() {
    let transport = ScriptedTransport::new(vec![Reply::ok("ok")]);
    let (executor, _) = executor(transport);

    let data = executor
        .execute(Action::Healthz(ServiceKey::Worker).build(&DraftState::default()))
        .unwrap();
    assert_eq!(data, json!("ok"));
}

#[test]
fn test_replay_reissues_verbatim() {
    let transport = ScriptedTransport::new(vec![
        Reply::ok(r#"{"OrderID":"abc"}"#),
        Reply::status(409, r#"{"error":"duplicate"}"#),
    ]);
    let (executor, store) = executor(transport.clone());

    executor
        .execute(Action::CreateOrder.build(&DraftState::default()))
        .unwrap();
    let original = lock_store(&store).unwrap().history().latest().unwrap().clone();

    // drafts changed since; the replay must not pick them up
    lock_store(&store)
        .unwrap()
        .update_drafts(|d| d.idempotency_key = "other".to_string());

    let err = executor.replay(&original).unwrap_err();
    assert_eq!(err.http_status(), Some(409));

    let seen = transport.seen();
    assert_eq!(seen[0], seen[1]);

    let store = lock_store(&store).unwrap();
    assert_eq!(store.history().len(), 2);
    let replayed = store.history().latest().unwrap();
    assert_eq!(replayed.label, "Create Order (replay)");
    assert_eq!(replayed.body, original.body);
    assert_ne!(replayed.id, original.id);
    // the replay carries no success hook
    assert_eq!(store.drafts().order_id, "abc");
}
