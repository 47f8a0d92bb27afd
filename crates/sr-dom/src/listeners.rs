//! Native event listener bookkeeping
//!
//! The document only records which listeners exist; invoking them is the
//! embedder's job, which resolves a `ListenerId` to its own callback.

use std::collections::HashMap;

use crate::NodeId;

/// Opaque listener identity chosen by the embedder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// A registered native listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListener {
    pub event_type: String,
    pub id: ListenerId,
    pub passive: bool,
}

#[derive(Debug, Default)]
pub(crate) struct ListenerTable {
    by_node: HashMap<NodeId, Vec<EventListener>>,
}

impl ListenerTable {
    /// Add a listener. Identical registrations are ignored.
    pub(crate) fn add(&mut self, node: NodeId, listener: EventListener) -> bool {
        let list = self.by_node.entry(node).or_default();
        if list.contains(&listener) {
            return false;
        }
        list.push(listener);
        true
    }

    pub(crate) fn remove(&mut self, node: NodeId, listener: &EventListener) -> bool {
        let Some(list) = self.by_node.get_mut(&node) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| l != listener);
        let removed = list.len() != before;
        if list.is_empty() {
            self.by_node.remove(&node);
        }
        removed
    }

    pub(crate) fn contains(&self, node: NodeId, listener: &EventListener) -> bool {
        self.by_node
            .get(&node)
            .is_some_and(|list| list.contains(listener))
    }

    /// Listeners for one event type, in registration order
    pub(crate) fn for_type(&self, node: NodeId, event_type: &str) -> Vec<EventListener> {
        self.by_node
            .get(&node)
            .map(|list| {
                list.iter()
                    .filter(|l| l.event_type == event_type)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, node: NodeId) -> usize {
        self.by_node.get(&node).map_or(0, Vec::len)
    }

    pub(crate) fn total(&self) -> usize {
        self.by_node.values().map(Vec::len).sum()
    }
}
