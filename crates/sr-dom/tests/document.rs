//! Integration tests for sr-dom
//!
//! Tree mutation, style resolution, transitions and listener bookkeeping.

use sr_dom::{Document, DomError, ListenerId, NodeId};

fn attach(doc: &mut Document, parent: NodeId, tag: &str) -> NodeId {
    let el = doc.create_element(tag);
    doc.append_child(parent, el).unwrap();
    el
}

// ============================================================================
// TREE
// ============================================================================

#[test]
fn test_insert_before_orders_children() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let a = attach(&mut doc, body, "div");
    let c = attach(&mut doc, body, "div");
    let b = doc.create_element("div");
    doc.insert_before(body, b, Some(c)).unwrap();
    assert_eq!(doc.children(body), &[a, b, c]);
    assert_eq!(doc.next_element_sibling(a), Some(b));
    assert_eq!(doc.previous_element_sibling(c), Some(b));
}

#[test]
fn test_insert_before_foreign_reference() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let a = attach(&mut doc, body, "div");
    let inner = attach(&mut doc, a, "span");
    let b = doc.create_element("div");
    assert_eq!(
        doc.insert_before(body, b, Some(inner)),
        Err(DomError::NotAChild { parent: body, reference: inner })
    );
}

#[test]
fn test_append_moves_node() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let a = attach(&mut doc, body, "div");
    let b = attach(&mut doc, body, "div");
    let child = attach(&mut doc, a, "p");
    doc.append_child(b, child).unwrap();
    assert!(doc.children(a).is_empty());
    assert_eq!(doc.parent(child), Some(b));
}

#[test]
fn test_descendants_preorder() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let root = attach(&mut doc, body, "div");
    let a = attach(&mut doc, root, "div");
    let a1 = attach(&mut doc, a, "span");
    let text = doc.create_text("t");
    doc.append_child(a, text).unwrap();
    let b = attach(&mut doc, root, "div");
    assert_eq!(doc.descendants(root), vec![a, a1, b]);
}

#[test]
fn test_remove_children_detaches_all() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let root = attach(&mut doc, body, "ul");
    let li = attach(&mut doc, root, "li");
    let removed = doc.remove_children(root);
    assert_eq!(removed, vec![li]);
    assert!(!doc.is_connected(li));
}

#[test]
fn test_event_path() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let div = attach(&mut doc, body, "div");
    let path = doc.event_path(div, true);
    assert_eq!(path.first(), Some(&div));
    assert_eq!(path.last(), Some(&doc.root()));
    assert_eq!(doc.event_path(div, false), vec![div]);
}

// ============================================================================
// STYLE
// ============================================================================

#[test]
fn test_class_helpers() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let div = attach(&mut doc, body, "div");
    doc.add_class(div, "a");
    doc.add_class(div, "b");
    doc.add_class(div, "a");
    assert_eq!(doc.attribute(div, "class"), Some("a b"));
    doc.remove_class(div, "a");
    assert!(!doc.has_class(div, "a"));
    assert!(doc.has_class(div, "b"));
}

#[test]
fn test_invalid_rule_rejected() {
    let mut doc = Document::new();
    assert!(!doc.add_style_rule("div[", "display: none"));
    assert!(doc.add_style_rule("div.hidden", "display: none"));
}

#[test]
fn test_later_rule_wins() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let p = attach(&mut doc, body, "p");
    doc.add_class(p, "x");
    doc.add_style_rule("p", "display: inline");
    doc.add_style_rule(".x", "display: grid");
    assert_eq!(doc.computed_style(p, "display"), "grid");
}

#[test]
fn test_force_layout_counts() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let before = doc.layout_flush_count();
    doc.force_layout(body);
    assert_eq!(doc.layout_flush_count(), before + 1);
}

// ============================================================================
// TRANSITIONS
// ============================================================================

#[test]
fn test_transition_not_started_when_detached() {
    let mut doc = Document::new();
    let div = doc.create_element("div");
    doc.set_style(div, "opacity", "1");
    doc.set_style(div, "transition", "opacity 100ms");
    doc.set_style(div, "opacity", "0");
    assert_eq!(doc.running_transition_count(), 0);
}

#[test]
fn test_transition_not_started_when_display_none() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let div = attach(&mut doc, body, "div");
    doc.set_style(div, "display", "none");
    doc.set_style(div, "transition", "opacity 100ms");
    doc.set_style(div, "opacity", "0");
    assert!(!doc.has_running_transition(div, "opacity"));
}

#[test]
fn test_transition_from_rule_value() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let div = attach(&mut doc, body, "div");
    doc.add_class(div, "fade");
    doc.add_style_rule(".fade", "transition: opacity 200ms linear");
    doc.set_style(div, "opacity", "0");
    assert!(doc.has_running_transition(div, "opacity"));
    assert_eq!(doc.next_transition_end(), Some(200.0));
}

#[test]
fn test_transition_with_delay() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let div = attach(&mut doc, body, "div");
    doc.set_style(div, "width", "0px");
    doc.set_style(div, "transition", "width 100ms linear 50ms");
    doc.set_style(div, "width", "100px");
    doc.set_time(50.0);
    assert_eq!(doc.computed_style(div, "width"), "0px");
    doc.set_time(100.0);
    assert_eq!(doc.computed_style(div, "width"), "50px");
    assert_eq!(doc.next_transition_end(), Some(150.0));
}

#[test]
fn test_finished_transition_reports_duration() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let div = attach(&mut doc, body, "div");
    doc.set_style(div, "opacity", "1");
    doc.set_style(div, "transition", "opacity 80ms");
    doc.set_style(div, "opacity", "0");
    doc.set_time(500.0);
    let finished = doc.take_finished_transitions();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].node, div);
    assert_eq!(finished[0].elapsed_ms, 80.0);
    assert!(doc.take_finished_transitions().is_empty());
}

#[test]
fn test_detach_cancels_subtree_transitions() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let outer = attach(&mut doc, body, "div");
    let inner = attach(&mut doc, outer, "div");
    doc.set_style(inner, "opacity", "1");
    doc.set_style(inner, "transition", "opacity 100ms");
    doc.set_style(inner, "opacity", "0");
    assert_eq!(doc.running_transition_count(), 1);
    doc.detach(outer);
    assert_eq!(doc.running_transition_count(), 0);
}

#[test]
fn test_clock_never_rewinds() {
    let mut doc = Document::new();
    doc.set_time(100.0);
    doc.set_time(40.0);
    assert_eq!(doc.now(), 100.0);
}

// ============================================================================
// LISTENERS
// ============================================================================

#[test]
fn test_listener_registration() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let div = attach(&mut doc, body, "div");
    assert!(doc.add_event_listener(div, "click", ListenerId(0), false));
    assert!(!doc.add_event_listener(div, "click", ListenerId(0), false));
    assert!(doc.add_event_listener(div, "click", ListenerId(0), true));
    assert_eq!(doc.event_listeners(div, "click").len(), 2);
    assert!(doc.has_event_listener(div, "click", ListenerId(0), true));

    assert!(doc.remove_event_listener(div, "click", ListenerId(0), true));
    assert_eq!(doc.listener_count(div), 1);
    assert_eq!(doc.total_listener_count(), 1);
}
