//! Chainable node-set wrapper
//!
//! `Sr` borrows the runtime mutably for as long as it lives and applies each
//! operation to every node of the set, in set order.

use std::collections::HashSet;

use serde_json::{Map, Value};
use sr_dom::NodeId;

use crate::events::{self, BindArgs, Handler, UnbindArgs};
use crate::fx::{self, CssValue, Fade, FxOptions, Slide, Visibility};
use crate::{data, lifecycle, Runtime};

pub struct Sr<'rt> {
    rt: &'rt mut Runtime,
    nodes: Vec<NodeId>,
}

impl<'rt> Sr<'rt> {
    /// De-duplicates `nodes`, keeping first occurrences
    pub(crate) fn new(rt: &'rt mut Runtime, nodes: Vec<NodeId>) -> Self {
        let mut seen = HashSet::new();
        let nodes = nodes.into_iter().filter(|node| seen.insert(*node)).collect();
        Self { rt, nodes }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<NodeId> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn runtime(&mut self) -> &mut Runtime {
        self.rt
    }

    fn each(&mut self, mut f: impl FnMut(&mut Runtime, NodeId)) -> &mut Self {
        for &node in &self.nodes {
            f(self.rt, node);
        }
        self
    }

    // ==================================================================
    // Events
    // ==================================================================

    /// Bind `handler` directly for every type in `types`
    pub fn on(&mut self, types: &str, handler: Handler) -> &mut Self {
        self.on_with(BindArgs::new(types, handler))
    }

    /// Bind `handler` for descendants matching `selector`
    pub fn on_delegate(&mut self, types: &str, selector: &str, handler: Handler) -> &mut Self {
        self.on_with(BindArgs::new(types, handler).selector(selector))
    }

    pub fn on_with(&mut self, args: BindArgs) -> &mut Self {
        let requests = args.into_requests();
        self.each(|rt, node| {
            for request in &requests {
                events::bind(rt, node, request.clone());
            }
        })
    }

    /// `on` with auto-removal after the first firing
    pub fn one(&mut self, types: &str, handler: Handler) -> &mut Self {
        self.on_with(BindArgs::new(types, handler).force_once())
    }

    pub fn one_delegate(&mut self, types: &str, selector: &str, handler: Handler) -> &mut Self {
        self.on_with(BindArgs::new(types, handler).selector(selector).force_once())
    }

    pub fn one_with(&mut self, args: BindArgs) -> &mut Self {
        self.on_with(args.force_once())
    }

    /// Remove every handler and dispatcher
    pub fn off_all(&mut self) -> &mut Self {
        self.off_with(UnbindArgs::All)
    }

    /// Remove bindings of `types`, direct and delegated
    pub fn off(&mut self, types: &str) -> &mut Self {
        self.off_with(UnbindArgs::types(types))
    }

    /// Remove direct bindings of `handler`
    pub fn off_handler(&mut self, types: &str, handler: &Handler) -> &mut Self {
        self.off_with(UnbindArgs::handler(types, handler.clone()))
    }

    /// Remove delegated bindings with exactly `selector`
    pub fn off_delegate(&mut self, types: &str, selector: &str, handler: Option<&Handler>) -> &mut Self {
        self.off_with(UnbindArgs::delegated(types, selector, handler.cloned()))
    }

    pub fn off_with(&mut self, args: UnbindArgs) -> &mut Self {
        self.each(|rt, node| events::unbind(rt, node, args.clone()))
    }

    pub fn trigger(&mut self, types: &str) -> &mut Self {
        self.trigger_with(types, Value::Null)
    }

    /// Trigger with `extra` exposed to handlers as `Event::extra`
    pub fn trigger_with(&mut self, types: &str, extra: Value) -> &mut Self {
        self.each(|rt, node| {
            events::trigger(rt, node, types, &extra);
        })
    }

    // ==================================================================
    // Animation
    // ==================================================================

    /// Queue a transition to `properties`. Property names may be camelCase
    /// or hyphen-case.
    pub fn animate(&mut self, properties: &[(&str, CssValue)], options: impl Into<FxOptions>) -> &mut Self {
        let options = options.into();
        let properties: Vec<(String, CssValue)> = properties
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        self.each(|rt, node| {
            let resolved = options.resolve(&rt.config.fx, &rt.config.fx.default_easing);
            fx::animate(rt, node, properties.clone(), resolved);
        })
    }

    pub fn delay(&mut self, ms: u64) -> &mut Self {
        self.each(|rt, node| fx::delay(rt, node, ms))
    }

    /// Stop the in-flight step; see `fx::stop`
    pub fn stop(&mut self, clear_queue: bool, jump_to_end: bool) -> &mut Self {
        self.each(|rt, node| fx::stop(rt, node, clear_queue, jump_to_end))
    }

    /// `stop` jumping to the end exactly when the queue is cleared
    pub fn stop_default(&mut self, clear_queue: bool) -> &mut Self {
        self.stop(clear_queue, clear_queue)
    }

    pub fn fade_in(&mut self, options: impl Into<FxOptions>) -> &mut Self {
        self.effect(Fade, Visibility::Show, options.into())
    }

    pub fn fade_out(&mut self, options: impl Into<FxOptions>) -> &mut Self {
        self.effect(Fade, Visibility::Hide, options.into())
    }

    pub fn fade_toggle(&mut self, options: impl Into<FxOptions>) -> &mut Self {
        self.effect(Fade, Visibility::Toggle, options.into())
    }

    pub fn slide_down(&mut self, options: impl Into<FxOptions>) -> &mut Self {
        self.effect(Slide, Visibility::Show, options.into())
    }

    pub fn slide_up(&mut self, options: impl Into<FxOptions>) -> &mut Self {
        self.effect(Slide, Visibility::Hide, options.into())
    }

    pub fn slide_toggle(&mut self, options: impl Into<FxOptions>) -> &mut Self {
        self.effect(Slide, Visibility::Toggle, options.into())
    }

    fn effect<E: fx::Effect>(&mut self, effect: E, visibility: Visibility, options: FxOptions) -> &mut Self {
        self.each(|rt, node| fx::queue_effect(rt, node, effect, visibility, &options))
    }

    /// Show without animation, restoring the display recorded by `hide`
    pub fn show(&mut self) -> &mut Self {
        self.each(fx::show)
    }

    pub fn hide(&mut self) -> &mut Self {
        self.each(fx::hide)
    }

    pub fn toggle(&mut self) -> &mut Self {
        self.each(|rt, node| {
            if rt.doc.computed_style(node, "display") == "none" {
                fx::show(rt, node);
            } else {
                fx::hide(rt, node);
            }
        })
    }

    // ==================================================================
    // Data
    // ==================================================================

    /// Value of `key` on the first node
    pub fn data(&mut self, key: &str) -> Option<Value> {
        let node = self.first()?;
        data::get(self.rt, node, key)
    }

    /// All data of the first node
    pub fn data_all(&mut self) -> Map<String, Value> {
        match self.first() {
            Some(node) => data::get_all(self.rt, node),
            None => Map::new(),
        }
    }

    pub fn set_data(&mut self, key: &str, value: Value) -> &mut Self {
        self.each(|rt, node| data::set(rt, node, key, value.clone()))
    }

    /// Delete `keys`, or all user data when `keys` is empty
    pub fn remove_data(&mut self, keys: &[&str]) -> &mut Self {
        self.each(|rt, node| data::remove(rt, node, keys))
    }

    // ==================================================================
    // Lifecycle
    // ==================================================================

    /// Clean up and detach every node
    pub fn remove(&mut self) -> &mut Self {
        self.each(lifecycle::remove)
    }

    /// Clean up and detach the children of every node
    pub fn empty(&mut self) -> &mut Self {
        self.each(lifecycle::empty)
    }

    /// Deep clones of the set. `with_data_and_events` carries handlers and
    /// data onto each clone root; `deep` does the same for descendants and
    /// defaults to `with_data_and_events`.
    pub fn clone_nodes(&mut self, with_data_and_events: bool, deep: Option<bool>) -> Sr<'_> {
        let deep = deep.unwrap_or(with_data_and_events);
        let clones: Vec<NodeId> = self
            .nodes
            .iter()
            .filter_map(|&node| lifecycle::clone(self.rt, node, with_data_and_events, deep))
            .collect();
        Sr::new(&mut *self.rt, clones)
    }
}

impl std::fmt::Debug for Sr<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sr").field("nodes", &self.nodes).finish()
    }
}
