//! End-to-end dispatch scenarios over a typed payload.

use herald_events::prelude::*;
use herald_test::{CallCounter, CallLog, counting_callback, failing_callback, setup_test_logging};

/// Payload shared by every event of a small UI.
#[derive(Debug, Clone, PartialEq)]
enum UiEvent {
    Click { x: i32, y: i32 },
    Key(char),
    Close,
}

fn recorder(
    log: &CallLog,
    label: &'static str,
) -> impl Fn(&UiEvent) -> Result<(), BoxError> + use<> {
    let log = log.clone();
    move |event| {
        log.push(format!("{label}:{event:?}"));
        Ok(())
    }
}

#[test]
fn test_click_then_click_again() {
    setup_test_logging("herald_events=trace");
    let registry = EventRegistry::<UiEvent>::new();
    let log = CallLog::new();

    let id1 = registry.listen("click", recorder(&log, "cb1"), None).unwrap();
    let id2 = registry.listen_once("click", recorder(&log, "cb2"), None).unwrap();
    assert!(id2 > id1);

    let click = UiEvent::Click { x: 1, y: 2 };
    assert!(registry.call("click", None, &click).unwrap());
    assert_eq!(
        log.calls(),
        vec!["cb1:Click { x: 1, y: 2 }", "cb2:Click { x: 1, y: 2 }"]
    );

    log.clear();
    assert!(registry.call("click", None, &click).unwrap());
    assert_eq!(log.calls(), vec!["cb1:Click { x: 1, y: 2 }"]);
}

#[test]
fn test_filters_route_by_payload() {
    let registry = EventRegistry::<UiEvent>::new();
    let log = CallLog::new();

    registry
        .listen(
            "input",
            recorder(&log, "keys"),
            Some(Box::new(|e: &UiEvent| !matches!(e, UiEvent::Key(_)))),
        )
        .unwrap();
    registry
        .listen_once(
            "input",
            recorder(&log, "close"),
            Some(Box::new(|e: &UiEvent| *e != UiEvent::Close)),
        )
        .unwrap();

    registry.call("input", None, &UiEvent::Key('q')).unwrap();
    registry.call("input", None, &UiEvent::Close).unwrap();
    registry.call("input", None, &UiEvent::Key('w')).unwrap();

    // The once-only listener was consumed by the first call even though its
    // filter suppressed it.
    assert_eq!(log.calls(), vec!["keys:Key('q')", "keys:Key('w')"]);
}

#[test]
fn test_cancel_all_then_nothing_fires() {
    let registry = EventRegistry::<UiEvent>::new();
    let counter = CallCounter::new();

    for once in [false, true, false] {
        registry
            .on("close", counting_callback::<UiEvent>(counter.clone()), None, once)
            .unwrap();
    }

    assert!(registry.off("close", None, false).unwrap());
    assert!(!registry.call("close", None, &UiEvent::Close).unwrap());
    assert!(!registry.execute("close", None, &UiEvent::Close).unwrap());
    assert!(!registry.execute_once("close", None, &UiEvent::Close).unwrap());
    assert_eq!(counter.count(), 0);
}

#[test]
fn test_failures_are_reported_without_stopping_siblings() {
    let registry = EventRegistry::<UiEvent>::new();
    let log = CallLog::new();

    let bad = registry
        .listen(
            "key",
            failing_callback::<UiEvent>(log.clone(), "render", "renderer unavailable"),
            None,
        )
        .unwrap();
    registry.listen("key", recorder(&log, "echo"), None).unwrap();

    let err = registry.call("key", None, &UiEvent::Key('a')).unwrap_err();
    assert!(matches!(err, EventError::Dispatch { .. }));
    assert_eq!(err.failures().len(), 1);
    assert_eq!(err.failures()[0].id, bad);
    assert!(err.to_string().contains("renderer unavailable"));
    assert_eq!(log.calls(), vec!["render", "echo:Key('a')"]);
}

#[test]
fn test_handler_shared_across_components() {
    let registry = EventRegistry::<UiEvent>::new();
    let log = CallLog::new();

    let toolbar = EventHandler::new(&registry);
    let canvas = EventHandler::new(&registry);

    let id = toolbar.register("click", recorder(&log, "toolbar"), None, false).unwrap();
    canvas.register("click", recorder(&log, "canvas"), None, true).unwrap();

    assert!(canvas.on_targeted_event("click", id, &UiEvent::Close).unwrap());
    assert_eq!(log.calls(), vec!["toolbar:Close"]);

    assert!(toolbar.on_event("click", &UiEvent::Close).unwrap());
    assert_eq!(log.len(), 3);

    assert!(toolbar.deregister("click", Some(id)));
    assert!(registry.is_empty());
}

#[test]
fn test_listen_multi_returns_ids_in_order() {
    let registry = EventRegistry::<UiEvent>::new();
    let log = CallLog::new();

    let ids = registry
        .listen_multi(vec![
            ListenerSpec::new("click", recorder(&log, "a")),
            ListenerSpec::new("key", recorder(&log, "b")).once(),
            ListenerSpec::new("click", recorder(&log, "c"))
                .with_filter(|e| matches!(e, UiEvent::Click { x, .. } if *x < 0)),
        ])
        .unwrap();

    let raw: Vec<u64> = ids.iter().map(|id| id.get()).collect();
    assert_eq!(raw, vec![1, 2, 3]);

    registry.call("click", None, &UiEvent::Click { x: 5, y: 0 }).unwrap();
    assert_eq!(log.len(), 2);
}
