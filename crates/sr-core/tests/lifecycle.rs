//! Integration tests for subtree lifecycle
//!
//! Cleanup on `remove`/`empty`, the leak check over many discarded nodes,
//! user data and state-carrying clones.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use sr_core::{Callback, CssValue, FxOptions, Handler, NodeId, Runtime, RuntimeConfig, SrError};

fn attach(rt: &mut Runtime, parent: NodeId, tag: &str) -> NodeId {
    let doc = rt.document_mut();
    let el = doc.create_element(tag);
    doc.append_child(parent, el).unwrap();
    el
}

fn counter() -> (Rc<RefCell<u32>>, Handler) {
    let hits = Rc::new(RefCell::new(0));
    let inner = hits.clone();
    (hits, Handler::new(move |_, _| *inner.borrow_mut() += 1))
}

// ============================================================================
// CLEANUP
// ============================================================================

#[test]
fn test_remove_cleans_subtree() {
    let mut rt = Runtime::new();
    let body = rt.document().body().unwrap();
    let outer = attach(&mut rt, body, "div");
    let inner = attach(&mut rt, outer, "p");
    let (_, handler) = counter();
    rt.wrap(outer).on("click", handler.clone()).set_data("k", json!(1));
    rt.wrap(inner).on_delegate("click", "a", handler);

    rt.wrap(outer).remove();
    assert!(!rt.document().is_connected(outer));
    assert_eq!(rt.handler_count(outer), 0);
    assert_eq!(rt.handler_count(inner), 0);
    assert_eq!(rt.document().total_listener_count(), 0);
    assert_eq!(rt.wrap(outer).data("k"), None);
}

#[test]
fn test_empty_keeps_root_bindings() {
    let mut rt = Runtime::new();
    let body = rt.document().body().unwrap();
    let list = attach(&mut rt, body, "ul");
    let item = attach(&mut rt, list, "li");
    let (hits, handler) = counter();
    rt.wrap(list).on("click", handler.clone());
    rt.wrap(item).on("click", handler);

    rt.wrap(list).empty();
    assert!(rt.document().children(list).is_empty());
    assert_eq!(rt.handler_count(list), 1);
    assert_eq!(rt.handler_count(item), 0);

    rt.fire(list, "click");
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn test_remove_cancels_running_animation() {
    let mut rt = Runtime::new();
    let body = rt.document().body().unwrap();
    let div = attach(&mut rt, body, "div");
    let done = Rc::new(RefCell::new(false));
    let flag = done.clone();
    rt.wrap(div)
        .fade_out(FxOptions::new().duration(400).complete(Callback::new(move |_, _| {
            *flag.borrow_mut() = true;
        })))
        .animate(&[("opacity", CssValue::from(1))], 100);
    rt.advance(100);
    assert!(rt.is_animating(div));

    rt.wrap(div).remove();
    assert!(!rt.is_animating(div));
    assert_eq!(rt.queue_len(div), 0);
    assert!(!rt.has_pending_work());
    rt.run_until_idle().unwrap();
    assert!(!*done.borrow());
}

#[test]
fn test_cleanup_is_safe_twice() {
    let mut rt = Runtime::new();
    let body = rt.document().body().unwrap();
    let div = attach(&mut rt, body, "div");
    rt.wrap(div).remove().remove().empty();
    assert_eq!(rt.tracked_counts().side_table, 0);
}

#[test]
fn test_leak_check_returns_to_baseline() {
    let mut rt = Runtime::new();
    let body = rt.document().body().unwrap();
    let baseline = rt.tracked_counts();

    for round in 0..50 {
        let container = attach(&mut rt, body, "section");
        let mut nodes = vec![container];
        for _ in 0..5 {
            let child = attach(&mut rt, container, "div");
            attach(&mut rt, child, "span");
            nodes.push(child);
        }
        let (_, handler) = counter();
        rt.wrap(container)
            .on_delegate("click.round", "div", handler.clone())
            .one("keyup", handler.clone());
        rt.wrap_all(nodes.clone())
            .on("mouseover", handler)
            .set_data("round", json!(round))
            .hide()
            .fade_in(200)
            .delay(30)
            .slide_up(100);
        rt.advance(50);

        if round % 2 == 0 {
            rt.wrap(container).remove();
        } else {
            rt.wrap(body).empty();
        }
    }

    assert_eq!(rt.tracked_counts(), baseline);
    assert_eq!(rt.document().total_listener_count(), 0);
    assert_eq!(rt.document().running_transition_count(), 0);
    assert!(!rt.has_pending_work());
}

// ============================================================================
// DATA
// ============================================================================

#[test]
fn test_data_round_trip_and_attribute_fallback() {
    let mut rt = Runtime::new();
    let body = rt.document().body().unwrap();
    let div = attach(&mut rt, body, "div");
    rt.document_mut().set_attribute(div, "data-max-items", "5");

    let mut sel = rt.wrap(div);
    assert_eq!(sel.data("maxItems"), Some(json!(5)));
    sel.set_data("user-name", json!("ada"));
    assert_eq!(sel.data("userName"), Some(json!("ada")));
    assert_eq!(sel.data_all().len(), 2);

    sel.remove_data(&["userName"]);
    assert_eq!(sel.data("user-name"), None);
    sel.remove_data(&[]);
    assert_eq!(sel.data("userName"), None);
    // The attribute is still there to fall back on
    assert_eq!(sel.data_all().len(), 1);
}

#[test]
fn test_data_on_empty_set() {
    let mut rt = Runtime::new();
    let mut sel = rt.select(".nothing");
    assert!(sel.is_empty());
    assert_eq!(sel.data("x"), None);
    assert!(sel.data_all().is_empty());
}

// ============================================================================
// CLONE
// ============================================================================

#[test]
fn test_clone_with_events_and_data() {
    let mut rt = Runtime::new();
    let body = rt.document().body().unwrap();
    let card = attach(&mut rt, body, "div");
    let button = attach(&mut rt, card, "button");
    let (hits, handler) = counter();
    rt.wrap(card).on("click", handler.clone()).set_data("id", json!(7));
    rt.wrap(button).on("click", handler);

    let copy = rt.wrap(card).clone_nodes(true, None).into_nodes()[0];
    let copy_button = rt.document().children(copy)[0];
    rt.document_mut().append_child(body, copy).unwrap();

    assert_eq!(rt.wrap(copy).data("id"), Some(json!(7)));
    assert_eq!(rt.handler_count(copy), 1);
    assert_eq!(rt.handler_count(copy_button), 1);
    assert!(rt.has_dispatcher(copy, "click", false));

    rt.fire(copy_button, "click");
    assert_eq!(*hits.borrow(), 2);
}

#[test]
fn test_clone_shallow_state() {
    let mut rt = Runtime::new();
    let body = rt.document().body().unwrap();
    let card = attach(&mut rt, body, "div");
    let button = attach(&mut rt, card, "button");
    let (_, handler) = counter();
    rt.wrap(card).on("click", handler.clone());
    rt.wrap(button).on("click", handler);

    let copy = rt.wrap(card).clone_nodes(true, Some(false)).into_nodes()[0];
    let copy_button = rt.document().children(copy)[0];
    assert_eq!(rt.handler_count(copy), 1);
    assert_eq!(rt.handler_count(copy_button), 0);

    let plain = rt.wrap(card).clone_nodes(false, None).into_nodes()[0];
    assert_eq!(rt.handler_count(plain), 0);
    assert_eq!(rt.document().listener_count(plain), 0);
}

#[test]
fn test_clone_keeps_hidden_display() {
    let mut rt = Runtime::new();
    let body = rt.document().body().unwrap();
    let div = attach(&mut rt, body, "div");
    rt.document_mut().set_style(div, "display", "grid");
    rt.wrap(div).hide();

    let copy = rt.wrap(div).clone_nodes(true, None).into_nodes()[0];
    rt.document_mut().append_child(body, copy).unwrap();
    rt.wrap(copy).show();
    assert_eq!(rt.document().computed_style(copy, "display"), "grid");
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn test_config_changes_speeds() {
    let config = RuntimeConfig::from_json(r#"{"fx": {"default_ms": 100, "failsafe_margin_ms": 10}}"#).unwrap();
    assert_eq!(config.fx.fast_ms, 200);
    let mut rt = Runtime::with_config(config);
    let body = rt.document().body().unwrap();
    let div = attach(&mut rt, body, "div");
    rt.wrap(div).animate(&[("width", CssValue::from(10))], FxOptions::new());
    // `auto -> 10px` snaps; the failsafe runs at 100 + 10
    rt.advance(109);
    assert!(rt.is_animating(div));
    rt.advance(1);
    assert!(!rt.is_animating(div));
}

#[test]
fn test_config_rejects_zero_frame_interval() {
    assert!(matches!(
        RuntimeConfig::from_json(r#"{"frame_interval_ms": 0}"#),
        Err(SrError::Config(_))
    ));
    assert!(matches!(RuntimeConfig::from_json("{"), Err(SrError::Json(_))));
}
