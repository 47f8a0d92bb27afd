//! SR DOM - Document Object Model
//!
//! Arena-backed document consumed by the SR event and animation engines:
//! tree structure, attributes, inline and computed style, CSS transitions
//! on a virtual clock, selector matching and native listener bookkeeping.

mod document;
mod listeners;
mod node;
mod selector;
mod style;
mod transition;

use std::fmt;

pub use document::Document;
pub use listeners::{EventListener, ListenerId};
pub use node::{Attribute, ElementData, Namespace, Node, NodeData};
pub use selector::{parse_selector_list, SelectorList};
pub use style::{default_display, initial_value, StyleDeclarations};
pub use transition::{
    parse_transition_list, CssNumber, FinishedTransition, StepPosition, TimingFunction,
    TransitionSpec,
};

/// Node identifier (index into arena)
///
/// Ids are never reused, so a stale id can never alias a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// DOM structural errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Cannot insert {child} into {parent}: hierarchy request")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Node {0} cannot have children")]
    NotAContainer(NodeId),

    #[error("Node {reference} is not a child of {parent}")]
    NotAChild { parent: NodeId, reference: NodeId },
}
