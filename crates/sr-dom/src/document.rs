//! Document
//!
//! Owns the node arena, the author stylesheet, native listener records and
//! running transitions. Time only moves when the embedder calls `set_time`.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::listeners::{EventListener, ListenerId, ListenerTable};
use crate::node::{ElementData, Namespace, Node, NodeData};
use crate::selector::parse_selector_list;
use crate::style::{default_display, initial_value, StyleDeclarations, StyleRule};
use crate::transition::{parse_transition_list, CssNumber, FinishedTransition, RunningTransition, TransitionSpec};
use crate::{DomError, NodeId};

/// HTML/SVG document
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    rules: Vec<StyleRule>,
    listeners: ListenerTable,
    transitions: Vec<RunningTransition>,
    now_ms: f64,
    layout_flushes: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with `<html><head></head><body></body></html>`
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Node::document()],
            rules: Vec::new(),
            listeners: ListenerTable::default(),
            transitions: Vec::new(),
            now_ms: 0.0,
            layout_flushes: 0,
        };
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.link(doc.root(), html);
        doc.link(html, head);
        doc.link(html, body);
        doc
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The `<html>` element
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    /// The `<body>` element
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&id| self.tag_name(id) == Some("body"))
    }

    /// Number of nodes ever allocated
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------
    // Node creation and access
    // ------------------------------------------------------------------

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached HTML element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::element(tag, Namespace::Html))
    }

    /// Create a detached SVG element
    pub fn create_svg_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::element(tag, Namespace::Svg))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Node::text(text))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id).and_then(Node::as_element)
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.node_mut(id).and_then(Node::as_element_mut)
    }

    #[inline]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn is_svg(&self, id: NodeId) -> bool {
        self.element(id)
            .is_some_and(|e| e.namespace == Namespace::Svg)
    }

    // ------------------------------------------------------------------
    // Tree navigation
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|&s| s == id)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|&s| self.is_element(s))
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|&s| s == id)?;
        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|&s| self.is_element(s))
    }

    /// Descendant elements in tree order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if self.is_element(current) {
                out.push(current);
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Inclusive containment check
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Whether the node is attached to this document's tree
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.node(id).is_some() && self.contains(self.root(), id)
    }

    /// Path used for event propagation: the target followed by its ancestors
    pub fn event_path(&self, target: NodeId, bubbles: bool) -> Vec<NodeId> {
        if self.node(target).is_none() {
            return Vec::new();
        }
        let mut path = vec![target];
        if bubbles {
            let mut current = self.parent(target);
            while let Some(id) = current {
                path.push(id);
                current = self.parent(id);
            }
        }
        path
    }

    pub fn text_content(&self, id: NodeId) -> String {
        match self.node(id).map(Node::data) {
            Some(NodeData::Text(text)) => text.clone(),
            Some(_) => self
                .children(id)
                .iter()
                .map(|&c| self.text_content(c))
                .collect(),
            None => String::new(),
        }
    }

    // ------------------------------------------------------------------
    // Tree mutation
    // ------------------------------------------------------------------

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_node = self.node(parent).ok_or(DomError::UnknownNode(parent))?;
        let child_node = self.node(child).ok_or(DomError::UnknownNode(child))?;
        if !parent_node.is_container() {
            return Err(DomError::NotAContainer(parent));
        }
        if matches!(child_node.data(), NodeData::Document) || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Append `child` to `parent`, moving it if already attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.unlink(child);
        self.link(parent, child);
        Ok(())
    }

    /// Insert `child` before `reference` (append when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        let Some(reference) = reference else {
            return self.append_child(parent, child);
        };
        self.check_insert(parent, child)?;
        if self.parent(reference) != Some(parent) {
            return Err(DomError::NotAChild { parent, reference });
        }
        if reference == child {
            return Ok(());
        }
        self.unlink(child);
        let pos = self
            .children(parent)
            .iter()
            .position(|&c| c == reference)
            .ok_or(DomError::NotAChild { parent, reference })?;
        if let Some(node) = self.node_mut(parent) {
            node.children.insert(pos, child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
    }

    /// Detach a node from its parent. Transitions in the subtree are dropped.
    pub fn detach(&mut self, id: NodeId) {
        self.unlink(id);
        self.cancel_subtree_transitions(id);
    }

    /// Detach every child of `id`, returning them
    pub fn remove_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = self.children(id).to_vec();
        for &child in &children {
            self.detach(child);
        }
        children
    }

    /// Deep-clone a subtree. The clone is detached and carries attributes
    /// and inline style but no listeners.
    ///
    /// Returns the clone root and the `(source, clone)` element pairs in
    /// tree order, root first.
    pub fn clone_subtree(&mut self, id: NodeId) -> Option<(NodeId, Vec<(NodeId, NodeId)>)> {
        let source = self.node(id)?;
        if matches!(source.data(), NodeData::Document) {
            return None;
        }
        let mut pairs = Vec::new();
        let clone = self.clone_recursive(id, &mut pairs);
        Some((clone, pairs))
    }

    fn clone_recursive(&mut self, id: NodeId, pairs: &mut Vec<(NodeId, NodeId)>) -> NodeId {
        let data = self.nodes[id.index()].data.clone();
        let is_element = matches!(data, NodeData::Element(_));
        let clone = self.alloc(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        if is_element {
            pairs.push((id, clone));
        }
        for child in self.children(id).to_vec() {
            let child_clone = self.clone_recursive(child, pairs);
            self.link(clone, child_clone);
        }
        clone
    }

    /// Sort nodes into document order and drop duplicates.
    ///
    /// Detached subtrees sort after the document, grouped by their root.
    pub fn sort_document_order(&self, nodes: &mut Vec<NodeId>) {
        let mut seen = HashSet::new();
        nodes.retain(|id| seen.insert(*id));
        nodes.sort_by(|&a, &b| self.compare_document_position(a, b));
    }

    fn compare_document_position(&self, a: NodeId, b: NodeId) -> Ordering {
        let (root_a, path_a) = self.tree_position(a);
        let (root_b, path_b) = self.tree_position(b);
        root_a.cmp(&root_b).then_with(|| path_a.cmp(&path_b))
    }

    fn tree_position(&self, id: NodeId) -> (NodeId, Vec<usize>) {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let index = self
                .children(parent)
                .iter()
                .position(|&c| c == current)
                .unwrap_or(0);
            path.push(index);
            current = parent;
        }
        path.reverse();
        (current, path)
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.get_attr(name)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.set_attr(name, value);
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.element_mut(id)?.remove_attr(name)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        if el.has_class(class) {
            return;
        }
        let mut classes: Vec<&str> = el.classes().collect();
        classes.push(class);
        let joined = classes.join(" ");
        el.set_attr("class", &joined);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        let joined = el
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        el.set_attr("class", &joined);
    }

    // ------------------------------------------------------------------
    // Style
    // ------------------------------------------------------------------

    /// Add an author rule. Returns false (and adds nothing) for an invalid selector.
    pub fn add_style_rule(&mut self, selector: &str, declarations: &str) -> bool {
        let Some(selector) = parse_selector_list(selector) else {
            tracing::debug!("Ignoring style rule with invalid selector: {}", selector);
            return false;
        };
        self.rules.push(StyleRule {
            selector,
            declarations: StyleDeclarations::parse(declarations),
        });
        true
    }

    /// Inline declaration for a property, if any
    pub fn inline_style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id)?.style.get(property)
    }

    pub fn inline_styles(&self, id: NodeId) -> Option<&StyleDeclarations> {
        self.element(id).map(|e| &e.style)
    }

    /// Set an inline declaration. An empty value removes the property.
    ///
    /// A changed value on a property covered by the element's `transition`
    /// starts a transition from the previous computed value.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        let property = property.trim().to_ascii_lowercase();
        if !self.is_element(id) {
            return;
        }
        let before = self.computed_style(id, &property);
        self.cancel_transition(id, &property);
        if let Some(el) = self.element_mut(id) {
            el.style.set(&property, value);
        }
        self.maybe_start_transition(id, &property, &before);
    }

    /// Remove an inline declaration
    pub fn remove_style(&mut self, id: NodeId, property: &str) {
        self.set_style(id, property, "");
    }

    /// Resolve the computed value of a property.
    ///
    /// Order: running transition, inline style, last matching author rule,
    /// SVG `display` presentation attribute, user-agent default.
    pub fn computed_style(&self, id: NodeId, property: &str) -> String {
        let property = property.trim().to_ascii_lowercase();
        let Some(el) = self.element(id) else {
            return String::new();
        };

        if let Some(running) = self
            .transitions
            .iter()
            .find(|t| t.node == id && t.property == property)
        {
            return running.value_at(self.now_ms);
        }

        if let Some(value) = el.style.get(&property) {
            return value.to_string();
        }

        if let Some(value) = self
            .rules
            .iter()
            .rev()
            .filter(|rule| rule.selector.matches(self, id, None))
            .find_map(|rule| rule.declarations.get(&property))
        {
            return value.to_string();
        }

        if property == "display" {
            if el.namespace == Namespace::Svg {
                if let Some(value) = el.get_attr("display") {
                    return value.to_string();
                }
            }
            return default_display(&el.tag, el.namespace).to_string();
        }

        initial_value(&property).to_string()
    }

    /// Force a synchronous style/layout flush
    pub fn force_layout(&mut self, id: NodeId) {
        if self.is_element(id) {
            self.layout_flushes += 1;
        }
    }

    /// Number of forced layout flushes so far
    pub fn layout_flush_count(&self) -> u64 {
        self.layout_flushes
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    pub fn now(&self) -> f64 {
        self.now_ms
    }

    /// Move the document clock. Finished transitions are collected with
    /// `take_finished_transitions`.
    pub fn set_time(&mut self, now_ms: f64) {
        if now_ms > self.now_ms {
            self.now_ms = now_ms;
        }
    }

    pub fn has_running_transition(&self, id: NodeId, property: &str) -> bool {
        self.transitions
            .iter()
            .any(|t| t.node == id && t.property == property)
    }

    pub fn running_transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Earliest pending transition end
    pub fn next_transition_end(&self) -> Option<f64> {
        self.transitions
            .iter()
            .map(RunningTransition::end_ms)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Remove and return transitions that completed by the current time,
    /// ordered by completion time.
    pub fn take_finished_transitions(&mut self) -> Vec<FinishedTransition> {
        let now = self.now_ms;
        let mut finished: Vec<RunningTransition> = Vec::new();
        self.transitions.retain(|t| {
            if t.end_ms() <= now {
                finished.push(t.clone());
                false
            } else {
                true
            }
        });
        finished.sort_by(|a, b| a.end_ms().total_cmp(&b.end_ms()));
        finished
            .into_iter()
            .map(|t| FinishedTransition {
                node: t.node,
                elapsed_ms: t.duration_ms(),
                property: t.property,
            })
            .collect()
    }

    fn cancel_transition(&mut self, id: NodeId, property: &str) {
        self.transitions
            .retain(|t| !(t.node == id && t.property == property));
    }

    fn cancel_subtree_transitions(&mut self, root: NodeId) {
        if self.transitions.is_empty() {
            return;
        }
        let mut subtree: HashSet<NodeId> = self.descendants(root).into_iter().collect();
        subtree.insert(root);
        self.transitions.retain(|t| !subtree.contains(&t.node));
    }

    /// The effective transition entry for a property
    fn transition_for(&self, id: NodeId, property: &str) -> Option<TransitionSpec> {
        let value = self.computed_style(id, "transition");
        parse_transition_list(&value)
            .into_iter()
            .rev()
            .find(|spec| spec.covers(property))
    }

    fn maybe_start_transition(&mut self, id: NodeId, property: &str, before: &str) {
        if property == "transition" || property == "will-change" || !self.is_connected(id) {
            return;
        }
        let after = self.computed_style(id, property);
        if after == before || self.computed_style(id, "display") == "none" {
            return;
        }
        let Some(spec) = self.transition_for(id, property) else {
            return;
        };
        if spec.duration_ms <= 0.0 {
            return;
        }
        let (Some(from), Some(to)) = (CssNumber::parse(before), CssNumber::parse(&after)) else {
            // Discrete values snap
            return;
        };
        if from.unit != to.unit && !(from.value == 0.0 || to.value == 0.0) {
            return;
        }
        let unit = if to.unit.is_empty() { from.unit.clone() } else { to.unit.clone() };
        let from = CssNumber { value: from.value, unit: unit.clone() };
        let to = CssNumber { value: to.value, unit };

        tracing::debug!(
            "Transition {} on {}: {} -> {} over {}ms",
            property,
            id,
            before,
            after,
            spec.duration_ms
        );
        self.transitions
            .push(RunningTransition::new(id, property, from, to, self.now_ms, &spec));
    }

    // ------------------------------------------------------------------
    // Selectors
    // ------------------------------------------------------------------

    /// Elements under `context` (exclusive) matching `selector`, in tree
    /// order. Malformed selectors yield an empty result.
    pub fn query_all(&self, context: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(list) = parse_selector_list(selector) else {
            return Vec::new();
        };
        let scope = self.is_element(context).then_some(context);
        self.descendants(context)
            .into_iter()
            .filter(|&id| list.matches(self, id, scope))
            .collect()
    }

    /// Whether `id` matches `selector`. Malformed selectors never match.
    pub fn matches(&self, id: NodeId, selector: &str) -> bool {
        parse_selector_list(selector).is_some_and(|list| list.matches(self, id, None))
    }

    /// Nearest inclusive ancestor matching `selector`
    pub fn closest(&self, id: NodeId, selector: &str) -> Option<NodeId> {
        let list = parse_selector_list(selector)?;
        let mut current = Some(id);
        while let Some(node) = current {
            if list.matches(self, node, None) {
                return Some(node);
            }
            current = self.parent_element(node);
        }
        None
    }

    // ------------------------------------------------------------------
    // Native listeners
    // ------------------------------------------------------------------

    /// Register a listener. Returns false if an identical one exists.
    pub fn add_event_listener(&mut self, id: NodeId, event_type: &str, listener: ListenerId, passive: bool) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        self.listeners.add(
            id,
            EventListener {
                event_type: event_type.to_string(),
                id: listener,
                passive,
            },
        )
    }

    pub fn remove_event_listener(&mut self, id: NodeId, event_type: &str, listener: ListenerId, passive: bool) -> bool {
        self.listeners.remove(
            id,
            &EventListener {
                event_type: event_type.to_string(),
                id: listener,
                passive,
            },
        )
    }

    pub fn has_event_listener(&self, id: NodeId, event_type: &str, listener: ListenerId, passive: bool) -> bool {
        self.listeners.contains(
            id,
            &EventListener {
                event_type: event_type.to_string(),
                id: listener,
                passive,
            },
        )
    }

    /// Listeners of one type on a node, in registration order
    pub fn event_listeners(&self, id: NodeId, event_type: &str) -> Vec<EventListener> {
        self.listeners.for_type(id, event_type)
    }

    pub fn listener_count(&self, id: NodeId) -> usize {
        self.listeners.count(id)
    }

    pub fn total_listener_count(&self) -> usize {
        self.listeners.total()
    }
}
