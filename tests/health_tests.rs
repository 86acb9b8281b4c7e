//! Sequential health sweep over every backend service

mod common;

use common::{Reply, ScriptedTransport, executor};
use ticketing_console::health::{self, OverallHealth, ServiceHealth};
use ticketing_console::{ServiceKey, lock_store};

#[test]
fn test_sweep_checks_every_service_in_order() {
    let transport = ScriptedTransport::new(Vec::new());
    let (executor, store) = executor(transport.clone());

    let board = health::sweep(&executor).unwrap();
    assert_eq!(board.overall(), OverallHealth::AllReady);

    let urls = transport.urls();
    assert_eq!(
        urls,
        vec![
            "http://127.0.0.1:8080/healthz",
            "http://127.0.0.1:8081/healthz",
            "http://127.0.0.1:8082/healthz",
            "http://127.0.0.1:8083/healthz",
            "http://127.0.0.1:8084/healthz",
            "http://127.0.0.1:8088/healthz",
        ]
    );

    let store = lock_store(&store).unwrap();
    assert_eq!(store.health(), &board);
    assert_eq!(store.history().len(), 6);
    assert_eq!(
        store.history().latest().unwrap().label,
        "gateway-nginx /healthz"
    );
}

#[test]
fn test_failures_do_not_stop_the_sweep() {
    let transport = ScriptedTransport::new(vec![
        Reply::ok("ok"),
        Reply::NetworkDown,
        Reply::status(503, "draining"),
    ]);
    let (executor, store) = executor(transport.clone());

    let board = health::sweep(&executor).unwrap();
    assert_eq!(transport.seen().len(), 6);
    assert_eq!(board.get(ServiceKey::Gateway), ServiceHealth::Ready);
    assert_eq!(board.get(ServiceKey::Order), ServiceHealth::Down);
    assert_eq!(board.get(ServiceKey::Inventory), ServiceHealth::Down);
    assert_eq!(board.get(ServiceKey::Nginx), ServiceHealth::Ready);
    assert_eq!(board.overall(), OverallHealth::HasDown);

    // the network failure never completed, so it left no history entry
    assert_eq!(lock_store(&store).unwrap().history().len(), 5);
}

#[test]
fn test_single_check_updates_board() {
    let transport = ScriptedTransport::new(vec![Reply::status(500, "")]);
    let (executor, store) = executor(transport);

    let health = health::check(&executor, ServiceKey::Worker).unwrap();
    assert_eq!(health, ServiceHealth::Down);

    let store = lock_store(&store).unwrap();
    assert_eq!(store.health().get(ServiceKey::Worker), ServiceHealth::Down);
    assert_eq!(store.health().get(ServiceKey::Query), ServiceHealth::Unknown);
    assert_eq!(store.health().overall(), OverallHealth::HasDown);
}
