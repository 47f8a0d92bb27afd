//! Integration tests for the event engine
//!
//! Binding, namespaces, delegation, one-shot handlers, unbinding and
//! dispatcher bookkeeping, driven through `Sr` and `Runtime`.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use sr_core::{BindArgs, BindOptions, Event, Handler, NodeId, Runtime, UnbindArgs, Value};

type Log = Rc<RefCell<Vec<String>>>;

fn attach(rt: &mut Runtime, parent: NodeId, tag: &str, class: &str) -> NodeId {
    let doc = rt.document_mut();
    let el = doc.create_element(tag);
    if !class.is_empty() {
        doc.set_attribute(el, "class", class);
    }
    doc.append_child(parent, el).unwrap();
    el
}

/// `ul.list > li.item > a` twice
fn list(rt: &mut Runtime) -> (NodeId, Vec<NodeId>, Vec<NodeId>) {
    let body = rt.document().body().unwrap();
    let ul = attach(rt, body, "ul", "list");
    let mut items = Vec::new();
    let mut links = Vec::new();
    for _ in 0..2 {
        let li = attach(rt, ul, "li", "item");
        links.push(attach(rt, li, "a", ""));
        items.push(li);
    }
    (ul, items, links)
}

fn logger(log: &Log, label: &str) -> Handler {
    let log = log.clone();
    let label = label.to_string();
    Handler::new(move |_, _| log.borrow_mut().push(label.clone()))
}

/// Warnings from skipped bindings show up with `RUST_LOG=sr_core=warn`
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

// ============================================================================
// BINDING AND DISPATCHERS
// ============================================================================

#[test]
fn test_handlers_fire_in_registration_order() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul)
        .on("click", logger(&log, "first"))
        .on("click", logger(&log, "second"));
    rt.fire(ul, "click");
    assert_eq!(*log.borrow(), vec!["first", "second"]);
}

#[test]
fn test_one_dispatcher_per_type() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul)
        .on("click", logger(&log, "a"))
        .on("click.ns", logger(&log, "b"))
        .on_delegate("click", ".item", logger(&log, "c"));
    assert_eq!(rt.handler_count(ul), 3);
    assert_eq!(rt.document().listener_count(ul), 1);
    assert!(rt.has_dispatcher(ul, "click", false));
}

#[test]
fn test_passive_gets_own_dispatcher() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul)
        .on("touchstart", logger(&log, "active"))
        .on_with(BindArgs::new("touchstart", logger(&log, "passive")).options(BindOptions::passive()));
    assert_eq!(rt.document().listener_count(ul), 2);
    assert!(rt.has_dispatcher(ul, "touchstart", true));

    rt.wrap(ul).off("touchstart");
    assert_eq!(rt.document().listener_count(ul), 0);
}

#[test]
fn test_bind_then_unbind_leaves_nothing() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    let handler = logger(&log, "x");
    rt.wrap(ul)
        .on_delegate("click keyup", ".item", handler.clone())
        .off_delegate("click keyup", ".item", Some(&handler));
    assert_eq!(rt.handler_count(ul), 0);
    assert_eq!(rt.document().listener_count(ul), 0);
    assert_eq!(rt.tracked_counts().handler_nodes, 0);
    assert_eq!(rt.tracked_counts().dispatcher_nodes, 0);
}

#[test]
fn test_missing_handler_binds_nothing() {
    init_tracing();
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    rt.wrap(ul).on_with(BindArgs::without_handler("click"));
    assert_eq!(rt.handler_count(ul), 0);
    assert_eq!(rt.document().listener_count(ul), 0);
}

#[test]
fn test_map_binding() {
    let mut rt = Runtime::new();
    let (ul, _, links) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul).on_with(
        BindArgs::map([("click", logger(&log, "click")), ("keyup", logger(&log, "keyup"))]).selector("a"),
    );
    rt.fire(links[0], "keyup");
    rt.fire(links[1], "click");
    assert_eq!(*log.borrow(), vec!["keyup", "click"]);
}

// ============================================================================
// NAMESPACES
// ============================================================================

#[test]
fn test_namespace_order_is_irrelevant_for_unbind() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul).on("click.a.b", logger(&log, "x")).off("click.b.a");
    assert_eq!(rt.handler_count(ul), 0);
    assert_eq!(rt.document().listener_count(ul), 0);
}

#[test]
fn test_namespaced_trigger() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul)
        .on("click", logger(&log, "plain"))
        .on("click.a", logger(&log, "a"))
        .on("click.a.b", logger(&log, "ab"))
        .on("click.c", logger(&log, "c"));

    rt.wrap(ul).trigger("click.a");
    assert_eq!(*log.borrow(), vec!["plain", "a"]);

    log.borrow_mut().clear();
    rt.wrap(ul).trigger("click.b.a");
    assert_eq!(*log.borrow(), vec!["plain", "a", "ab"]);

    log.borrow_mut().clear();
    rt.wrap(ul).trigger("click");
    assert_eq!(*log.borrow(), vec!["plain", "a", "ab", "c"]);

    log.borrow_mut().clear();
    rt.fire(ul, "click");
    assert_eq!(log.borrow().len(), 4);
}

#[test]
fn test_unbind_by_namespace_only() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul)
        .on("click.plugin", logger(&log, "click"))
        .on("keyup.plugin", logger(&log, "keyup"))
        .on("click", logger(&log, "other"))
        .off(".plugin");
    assert_eq!(rt.handler_count(ul), 1);
    assert!(rt.has_dispatcher(ul, "click", false));
    assert!(!rt.has_dispatcher(ul, "keyup", false));

    rt.fire(ul, "click");
    assert_eq!(*log.borrow(), vec!["other"]);
}

#[test]
fn test_namespace_only_bind_is_skipped() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul).on(".plugin", logger(&log, "x"));
    assert_eq!(rt.handler_count(ul), 0);
}

// ============================================================================
// DELEGATION
// ============================================================================

#[test]
fn test_delegated_receiver_is_matching_ancestor() {
    let mut rt = Runtime::new();
    let (ul, items, links) = list(&mut rt);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    rt.wrap(ul).on_delegate(
        "click",
        ".item",
        Handler::new(move |_, event: &mut Event| {
            log.borrow_mut()
                .push((event.target(), event.current_target(), event.receiver()));
        }),
    );
    rt.fire(links[1], "click");
    assert_eq!(*seen.borrow(), vec![(links[1], Some(ul), Some(items[1]))]);

    // The container itself never matches
    rt.fire(ul, "click");
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_delegated_child_combinator() {
    let mut rt = Runtime::new();
    let (ul, items, links) = list(&mut rt);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    rt.wrap(ul).on_delegate(
        "click",
        "> li",
        Handler::new(move |_, event: &mut Event| log.borrow_mut().push(event.receiver())),
    );
    rt.fire(links[0], "click");
    assert_eq!(*seen.borrow(), vec![Some(items[0])]);
}

#[test]
fn test_delegated_invalid_selector_never_fires() {
    init_tracing();
    let mut rt = Runtime::new();
    let (ul, _, links) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul).on_delegate("click", "li[", logger(&log, "x"));
    rt.fire(links[0], "click");
    assert!(log.borrow().is_empty());
}

#[test]
fn test_delegated_survives_unbind_of_other_namespace() {
    let mut rt = Runtime::new();
    let (ul, _, links) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul)
        .on_delegate("click.ns1", ".item", logger(&log, "x"))
        .off("click.ns2");
    assert_eq!(rt.handler_count(ul), 1);

    rt.fire(links[0], "click");
    assert_eq!(*log.borrow(), vec!["x"]);
}

#[test]
fn test_nested_delegated_matches_resolve_own_receiver() {
    let mut rt = Runtime::new();
    let body = rt.document().body().unwrap();
    let container = attach(&mut rt, body, "section", "");
    let outer = attach(&mut rt, container, "div", "b");
    let inner = attach(&mut rt, outer, "div", "a");
    let target = attach(&mut rt, inner, "span", "");

    let seen = Rc::new(RefCell::new(Vec::new()));
    for class in ["a", "b"] {
        let log = seen.clone();
        rt.wrap(container).on_delegate(
            "click",
            &format!(".{class}"),
            Handler::new(move |_, event: &mut Event| log.borrow_mut().push((class, event.receiver()))),
        );
    }

    rt.fire(target, "click");
    assert_eq!(*seen.borrow(), vec![("a", Some(inner)), ("b", Some(outer))]);
}

#[test]
fn test_off_with_handler_only_removes_direct() {
    let mut rt = Runtime::new();
    let (ul, _, links) = list(&mut rt);
    let log = new_log();
    let handler = logger(&log, "x");
    rt.wrap(ul)
        .on("click", handler.clone())
        .on_delegate("click", "a", handler.clone())
        .off_handler("click", &handler);
    assert_eq!(rt.handler_count(ul), 1);

    rt.fire(links[0], "click");
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_off_selector_must_match_exactly() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul)
        .on_delegate("click", ".item", logger(&log, "x"))
        .off_delegate("click", "li", None);
    assert_eq!(rt.handler_count(ul), 1);
    rt.wrap(ul).off_delegate("click", ".item", None);
    assert_eq!(rt.handler_count(ul), 0);
}

#[test]
fn test_off_all_is_hard_reset() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul)
        .on("click", logger(&log, "a"))
        .on("keyup.ns", logger(&log, "b"))
        .on_with(BindArgs::new("scroll", logger(&log, "c")).options(BindOptions::passive()))
        .off_all();
    assert_eq!(rt.handler_count(ul), 0);
    assert_eq!(rt.document().listener_count(ul), 0);
}

#[test]
fn test_unbind_without_records_is_noop() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    rt.wrap(ul).off("click").off_all().off_with(UnbindArgs::types(".ns"));
    assert_eq!(rt.tracked_counts().dispatcher_nodes, 0);
}

// ============================================================================
// ONE-SHOT
// ============================================================================

#[test]
fn test_one_fires_once_and_cleans_dispatcher() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul).one("click", logger(&log, "once"));
    rt.fire(ul, "click");
    rt.fire(ul, "click");
    assert_eq!(*log.borrow(), vec!["once"]);
    assert_eq!(rt.document().listener_count(ul), 0);
}

#[test]
fn test_one_delegated_waits_for_a_match() {
    let mut rt = Runtime::new();
    let (ul, _, links) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul).one_delegate("click", "a", logger(&log, "link"));
    rt.fire(ul, "click");
    assert_eq!(rt.handler_count(ul), 1);
    rt.fire(links[0], "click");
    rt.fire(links[1], "click");
    assert_eq!(*log.borrow(), vec!["link"]);
    assert_eq!(rt.handler_count(ul), 0);
}

#[test]
fn test_one_keeps_other_bindings_of_same_handler() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    let handler = logger(&log, "h");
    rt.wrap(ul).on("click", handler.clone()).one("keyup", handler);
    rt.fire(ul, "keyup");
    rt.fire(ul, "click");
    assert_eq!(*log.borrow(), vec!["h", "h"]);
    assert_eq!(rt.handler_count(ul), 1);
}

// ============================================================================
// SNAPSHOT AND PROPAGATION
// ============================================================================

#[test]
fn test_handlers_added_during_dispatch_wait() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    let late = logger(&log, "late");
    let outer_log = log.clone();
    rt.wrap(ul).on(
        "click",
        Handler::new(move |rt, _| {
            outer_log.borrow_mut().push("early".to_string());
            rt.wrap(ul).on("click", late.clone());
        }),
    );
    rt.fire(ul, "click");
    assert_eq!(*log.borrow(), vec!["early"]);
}

#[test]
fn test_handler_removed_during_dispatch_still_runs() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let log = new_log();
    let second = logger(&log, "second");
    let target = second.clone();
    let first_log = log.clone();
    rt.wrap(ul)
        .on(
            "click",
            Handler::new(move |rt, _| {
                first_log.borrow_mut().push("first".to_string());
                rt.wrap(ul).off_handler("click", &target);
            }),
        )
        .on("click", second);
    rt.fire(ul, "click");
    assert_eq!(*log.borrow(), vec!["first", "second"]);
    rt.fire(ul, "click");
    assert_eq!(*log.borrow(), vec!["first", "second", "first"]);
}

#[test]
fn test_stop_immediate_propagation() {
    let mut rt = Runtime::new();
    let (ul, items, _) = list(&mut rt);
    let log = new_log();
    let stop_log = log.clone();
    rt.wrap(items[0])
        .on(
            "click",
            Handler::new(move |_, event| {
                stop_log.borrow_mut().push("stopper".to_string());
                event.stop_immediate_propagation();
            }),
        )
        .on("click", logger(&log, "skipped"));
    rt.wrap(ul).on("click", logger(&log, "parent"));
    rt.fire(items[0], "click");
    assert_eq!(*log.borrow(), vec!["stopper"]);
}

#[test]
fn test_stop_propagation_finishes_current_node() {
    let mut rt = Runtime::new();
    let (ul, items, _) = list(&mut rt);
    let log = new_log();
    let stop_log = log.clone();
    rt.wrap(items[0])
        .on(
            "click",
            Handler::new(move |_, event| {
                stop_log.borrow_mut().push("stopper".to_string());
                event.stop_propagation();
            }),
        )
        .on("click", logger(&log, "sibling"));
    rt.wrap(ul).on("click", logger(&log, "parent"));
    rt.fire(items[0], "click");
    assert_eq!(*log.borrow(), vec!["stopper", "sibling"]);
}

// ============================================================================
// TRIGGER
// ============================================================================

#[test]
fn test_trigger_carries_extra_data() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    let seen = Rc::new(RefCell::new(Value::Null));
    let slot = seen.clone();
    rt.wrap(ul).on(
        "refresh",
        Handler::new(move |_, event| {
            assert!(event.is_trigger());
            *slot.borrow_mut() = event.extra().clone();
        }),
    );
    rt.wrap(ul).trigger_with("refresh", json!({"page": 2}));
    assert_eq!(*seen.borrow(), json!({"page": 2}));
}

#[test]
fn test_trigger_reports_prevent_default() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    rt.wrap(ul).on("submit", Handler::new(|_, event| event.prevent_default()));
    assert!(rt.trigger_event(ul, "submit", &Value::Null));
    assert!(!rt.trigger_event(ul, "reset", &Value::Null));
}

#[test]
fn test_passive_handler_cannot_prevent_default() {
    let mut rt = Runtime::new();
    let (ul, _, _) = list(&mut rt);
    rt.wrap(ul).on_with(
        BindArgs::new("wheel", Handler::new(|_, event| event.prevent_default()))
            .options(BindOptions::passive()),
    );
    assert!(!rt.trigger_event(ul, "wheel", &Value::Null));
}

#[test]
fn test_non_bubbling_trigger() {
    let mut rt = Runtime::new();
    let (ul, items, _) = list(&mut rt);
    let log = new_log();
    rt.wrap(ul)
        .on("focus", logger(&log, "focus"))
        .on("custom", logger(&log, "custom"));
    rt.wrap(items[0]).trigger("focus custom");
    assert_eq!(*log.borrow(), vec!["custom"]);
}

#[test]
fn test_trigger_each_node_of_set() {
    let mut rt = Runtime::new();
    let (_, items, _) = list(&mut rt);
    let log = new_log();
    rt.select(".item").on("ping", logger(&log, "ping"));
    rt.select("li.item").trigger("ping");
    assert_eq!(log.borrow().len(), items.len());
}
