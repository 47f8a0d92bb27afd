//! Subtree lifecycle: cleanup before removal, and state-carrying clones
//!
//! Engine state lives in tables keyed by `NodeId`, so nothing goes away on
//! its own when a node leaves the document. Every structural removal runs
//! `cleanup_tree` first, which evicts handler registries, dispatchers,
//! queues, armed timers and side-table records for the discarded elements.

use sr_dom::NodeId;

use crate::events::{copy_handlers, remove_all_dispatchers};
use crate::fx::{self, AnimationState};
use crate::Runtime;

/// Evict all engine state of the elements in `root`'s subtree.
///
/// `include_root = false` keeps the root's own bindings, for content
/// replacement. Idempotent.
pub(crate) fn cleanup_tree(rt: &mut Runtime, root: NodeId, include_root: bool) {
    let mut nodes = Vec::new();
    if include_root && rt.doc.is_element(root) {
        nodes.push(root);
    }
    nodes.extend(rt.doc.descendants(root));
    for node in nodes {
        cleanup_node(rt, node);
    }
}

fn cleanup_node(rt: &mut Runtime, node: NodeId) {
    remove_all_dispatchers(rt, node);
    rt.handlers.remove(&node);
    rt.queues.remove(&node);

    // Cancel without running callbacks or touching styles
    match rt.side_table.take_animation(node) {
        Some(AnimationState::Delay { timer }) => {
            rt.clear_timeout(timer);
        }
        Some(AnimationState::AwaitingFrame(pending)) => {
            rt.cancel_animation_frame(pending.frame);
        }
        Some(AnimationState::Transition(state)) => fx::disarm(rt, node, &state),
        None => {}
    }
    rt.side_table.remove(node);
}

/// Clean up `node` and its subtree, then detach it
pub(crate) fn remove(rt: &mut Runtime, node: NodeId) {
    cleanup_tree(rt, node, true);
    rt.doc.detach(node);
    tracing::debug!("Removed {}", node);
}

/// Clean up and detach every child of `node`; the node keeps its own state
pub(crate) fn empty(rt: &mut Runtime, node: NodeId) {
    cleanup_tree(rt, node, false);
    rt.doc.remove_children(node);
}

/// Deep-clone `node`.
///
/// `with_root` carries the root's handlers, data and stored display onto the
/// clone; `deep` does the same for every descendant element.
pub(crate) fn clone(rt: &mut Runtime, node: NodeId, with_root: bool, deep: bool) -> Option<NodeId> {
    let (clone, pairs) = rt.doc.clone_subtree(node)?;
    for (source, copy) in pairs {
        let carry = if source == node { with_root } else { deep };
        if carry {
            carry_state(rt, source, copy);
        }
    }
    Some(clone)
}

fn carry_state(rt: &mut Runtime, source: NodeId, dest: NodeId) {
    copy_handlers(rt, source, dest);

    let Some(record) = rt.side_table.get(source) else {
        return;
    };
    if record.data.is_empty() && record.old_display.is_none() {
        return;
    }
    let data = record.data.clone();
    let old_display = record.old_display.clone();
    let entry = rt.side_table.entry(dest);
    entry.data = data;
    entry.old_display = old_display;
}
