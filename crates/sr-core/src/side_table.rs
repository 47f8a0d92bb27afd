//! Per-node side table
//!
//! Data associated with a node without touching its attributes: the
//! in-flight animation step, the display value recorded by `hide`, and user
//! data. Entries are evicted explicitly by subtree cleanup, and a record
//! that becomes empty is dropped so the table only holds live state.

use std::collections::HashMap;

use serde_json::{Map, Value};
use sr_dom::NodeId;

use crate::fx::AnimationState;

/// Display representation recorded before hiding
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoredDisplay {
    /// Computed CSS display of an HTML element
    Css(String),
    /// Value of an SVG `display` attribute; `None` when it was absent
    SvgAttribute(Option<String>),
    /// Hidden while detached, so the value must be resolved on show
    Unknown,
}

#[derive(Debug, Default)]
pub(crate) struct NodeRecord {
    pub(crate) animation: Option<AnimationState>,
    pub(crate) old_display: Option<StoredDisplay>,
    pub(crate) data: Map<String, Value>,
}

impl NodeRecord {
    fn is_empty(&self) -> bool {
        self.animation.is_none() && self.old_display.is_none() && self.data.is_empty()
    }
}

#[derive(Debug, Default)]
pub(crate) struct SideTable {
    records: HashMap<NodeId, NodeRecord>,
}

impl SideTable {
    pub(crate) fn get(&self, node: NodeId) -> Option<&NodeRecord> {
        self.records.get(&node)
    }

    pub(crate) fn get_mut(&mut self, node: NodeId) -> Option<&mut NodeRecord> {
        self.records.get_mut(&node)
    }

    /// Record for `node`, created on demand
    pub(crate) fn entry(&mut self, node: NodeId) -> &mut NodeRecord {
        self.records.entry(node).or_default()
    }

    /// Evict everything stored for `node`
    pub(crate) fn remove(&mut self, node: NodeId) -> Option<NodeRecord> {
        self.records.remove(&node)
    }

    /// Drop the record if nothing is left in it
    pub(crate) fn prune(&mut self, node: NodeId) {
        if self.records.get(&node).is_some_and(NodeRecord::is_empty) {
            self.records.remove(&node);
        }
    }

    pub(crate) fn animation(&self, node: NodeId) -> Option<&AnimationState> {
        self.get(node).and_then(|r| r.animation.as_ref())
    }

    pub(crate) fn set_animation(&mut self, node: NodeId, state: AnimationState) {
        self.entry(node).animation = Some(state);
    }

    /// Take the in-flight animation state out of the table
    pub(crate) fn take_animation(&mut self, node: NodeId) -> Option<AnimationState> {
        let state = self.get_mut(node)?.animation.take();
        self.prune(node);
        state
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
