//! Handler registries and dispatcher bookkeeping
//!
//! A node carries one native listener per `(type, passive)` pair that has
//! at least one handler record; the listener is installed with the first
//! record and removed with the last.

use sr_dom::{ListenerId, NodeId};

use crate::events::args::{BindRequest, SelectorFilter, UnbindArgs};
use crate::events::handler::{Handler, HandlerRecord, TypeSpec};
use crate::util::split_whitespace;
use crate::Runtime;

/// Listener id of the dispatcher on every node
pub(crate) const DISPATCHER: ListenerId = ListenerId(0);

/// Key of an installed dispatcher
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct DispatcherKey {
    pub(crate) event_type: String,
    pub(crate) passive: bool,
}

pub(crate) fn bind(rt: &mut Runtime, node: NodeId, request: BindRequest) {
    if rt.doc.node(node).is_none() {
        tracing::warn!("on({}): unknown node {}", request.types, node);
        return;
    }
    for item in split_whitespace(&request.types) {
        let spec = TypeSpec::parse(item);
        if spec.base.is_empty() {
            tracing::debug!("Skipping namespace-only type {:?}", item);
            continue;
        }
        rt.handlers.entry(node).or_default().push(HandlerRecord {
            event_type: spec.base.clone(),
            namespaces: spec.namespaces,
            selector: request.selector.clone(),
            handler: request.handler.clone(),
            once: request.options.once,
            passive: request.options.passive,
            original_type: item.to_string(),
        });
        ensure_dispatcher(rt, node, &spec.base, request.options.passive);
    }
}

fn ensure_dispatcher(rt: &mut Runtime, node: NodeId, event_type: &str, passive: bool) {
    let key = DispatcherKey {
        event_type: event_type.to_string(),
        passive,
    };
    if rt.dispatchers.entry(node).or_default().insert(key) {
        rt.doc.add_event_listener(node, event_type, DISPATCHER, passive);
        tracing::debug!("Installed {} dispatcher on {} (passive: {})", event_type, node, passive);
    }
}

pub(crate) fn unbind(rt: &mut Runtime, node: NodeId, args: UnbindArgs) {
    match args {
        UnbindArgs::All => {
            rt.handlers.remove(&node);
            remove_all_dispatchers(rt, node);
        }
        UnbindArgs::Matching { types, selector, handler } => {
            for item in split_whitespace(&types) {
                let spec = TypeSpec::parse(item);
                unbind_one(rt, node, &spec, &selector, handler.as_ref());
            }
        }
    }
}

fn unbind_one(
    rt: &mut Runtime,
    node: NodeId,
    spec: &TypeSpec,
    selector: &SelectorFilter,
    handler: Option<&Handler>,
) {
    let touched: Vec<String> = if spec.base.is_empty() {
        let mut types: Vec<String> = rt
            .handlers
            .get(&node)
            .map(|records| records.iter().map(|r| r.event_type.clone()).collect())
            .unwrap_or_default();
        if let Some(keys) = rt.dispatchers.get(&node) {
            types.extend(keys.iter().map(|k| k.event_type.clone()));
        }
        types.sort();
        types.dedup();
        types
    } else {
        vec![spec.base.clone()]
    };

    if let Some(records) = rt.handlers.get_mut(&node) {
        let before = records.len();
        records.retain(|record| {
            let matches = (spec.base.is_empty() || record.event_type == spec.base)
                && spec.namespaces_within(&record.namespaces)
                && selector.accepts(record.selector.as_deref())
                && handler.is_none_or(|h| h.same(&record.handler));
            !matches
        });
        let removed = before - records.len();
        if removed > 0 {
            tracing::debug!("Removed {} handler(s) from {}", removed, node);
        }
        if records.is_empty() {
            rt.handlers.remove(&node);
        }
    }

    for event_type in touched {
        sync_dispatchers(rt, node, &event_type);
    }
}

/// Drop dispatchers for `event_type` that no longer have a record
fn sync_dispatchers(rt: &mut Runtime, node: NodeId, event_type: &str) {
    for passive in [false, true] {
        let needed = rt.handlers.get(&node).is_some_and(|records| {
            records
                .iter()
                .any(|r| r.event_type == event_type && r.passive == passive)
        });
        if needed {
            continue;
        }
        let key = DispatcherKey {
            event_type: event_type.to_string(),
            passive,
        };
        let Some(keys) = rt.dispatchers.get_mut(&node) else {
            return;
        };
        if keys.remove(&key) {
            rt.doc.remove_event_listener(node, event_type, DISPATCHER, passive);
            tracing::debug!("Removed {} dispatcher from {} (passive: {})", event_type, node, passive);
        }
        if keys.is_empty() {
            rt.dispatchers.remove(&node);
        }
    }
}

/// Remove every dispatcher installed on `node`
pub(crate) fn remove_all_dispatchers(rt: &mut Runtime, node: NodeId) {
    let Some(keys) = rt.dispatchers.remove(&node) else {
        return;
    };
    for key in keys {
        rt.doc
            .remove_event_listener(node, &key.event_type, DISPATCHER, key.passive);
    }
}

/// Re-bind every record of `source` onto `dest`
pub(crate) fn copy_handlers(rt: &mut Runtime, source: NodeId, dest: NodeId) {
    let Some(records) = rt.handlers.get(&source).cloned() else {
        return;
    };
    for record in records {
        bind(
            rt,
            dest,
            BindRequest {
                types: record.original_type,
                selector: record.selector,
                handler: record.handler,
                options: crate::events::BindOptions {
                    once: record.once,
                    passive: record.passive,
                },
            },
        );
    }
}
