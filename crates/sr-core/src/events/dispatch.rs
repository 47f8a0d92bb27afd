//! Dispatcher and trigger
//!
//! The dispatcher is the single native listener per `(type, passive)` on a
//! node. It fans one native event out to the node's matching records.

use std::collections::HashSet;

use serde_json::Value;
use sr_dom::{Document, NodeId};

use crate::events::args::{SelectorFilter, UnbindArgs};
use crate::events::event::bubbles;
use crate::events::handler::{HandlerRecord, TypeSpec};
use crate::events::registry::unbind;
use crate::events::Event;
use crate::util::{needs_scoped_query, scope_selector, split_whitespace};
use crate::Runtime;

/// Run the dispatcher installed on `node` for the listener's passive flag
pub(crate) fn run_dispatcher(rt: &mut Runtime, node: NodeId, event: &mut Event, passive: bool) {
    // Snapshot: registry changes made by handlers apply to later dispatches
    let snapshot: Vec<HandlerRecord> = match rt.handlers.get(&node) {
        Some(records) => records
            .iter()
            .filter(|r| r.passive == passive && r.accepts(event))
            .cloned()
            .collect(),
        None => return,
    };

    for record in snapshot {
        if event.is_immediate_propagation_stopped() {
            break;
        }
        let receiver = match &record.selector {
            None => Some(node),
            Some(selector) => delegated_target(&rt.doc, node, event.target(), selector),
        };
        let Some(receiver) = receiver else {
            continue;
        };

        event.set_receiver(Some(receiver));
        record.handler.call(rt, event);

        if record.once {
            let selector = match record.selector {
                Some(selector) => SelectorFilter::Exact(selector),
                None => SelectorFilter::Direct,
            };
            unbind(
                rt,
                node,
                UnbindArgs::Matching {
                    types: record.original_type,
                    selector,
                    handler: Some(record.handler),
                },
            );
        }
    }
    event.set_receiver(None);
}

/// Resolve the receiver of a delegated record: the nearest inclusive
/// ancestor of `target` that matches `selector` and lies strictly inside
/// `container`.
pub(crate) fn delegated_target(
    doc: &Document,
    container: NodeId,
    target: NodeId,
    selector: &str,
) -> Option<NodeId> {
    if target == container || !doc.contains(container, target) {
        return None;
    }

    if !needs_scoped_query(selector) {
        return doc
            .closest(target, selector)
            .filter(|&found| found != container && doc.contains(container, found));
    }

    let candidates: HashSet<NodeId> = doc
        .query_all(container, &scope_selector(selector))
        .into_iter()
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let mut current = Some(target);
    while let Some(node) = current {
        if node == container {
            break;
        }
        if candidates.contains(&node) {
            return Some(node);
        }
        current = doc.parent(node);
    }
    None
}

/// Dispatch a cancelable synthetic event for every item of `types`.
/// Returns whether any of them had its default prevented.
pub(crate) fn trigger(rt: &mut Runtime, node: NodeId, types: &str, extra: &Value) -> bool {
    let mut prevented = false;
    for item in split_whitespace(types) {
        let spec = TypeSpec::parse(item);
        if spec.base.is_empty() {
            continue;
        }
        let bubbles = bubbles(&spec.base);
        let mut event = Event::triggered(&spec.base, node, spec.namespaces, extra.clone())
            .with_bubbles(bubbles);
        rt.dispatch_event(&mut event);
        prevented |= event.is_default_prevented();
    }
    prevented
}
