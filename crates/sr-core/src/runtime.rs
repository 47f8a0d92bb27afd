//! Runtime
//!
//! Owns the document and every piece of engine state. Time is virtual:
//! `advance` and `run_until_idle` move the clock and run whatever falls due,
//! in this order at any instant: finished CSS transitions (`transitionend`),
//! animation frames, timeouts.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use sr_dom::{Document, ListenerId, NodeId};

use crate::config::RuntimeConfig;
use crate::events::{self, DispatcherKey, Event, HandlerRecord, DISPATCHER};
use crate::fx::{self, AnimationQueue};
use crate::scheduler::{FrameId, Scheduler, TimerId};
use crate::selection::Sr;
use crate::side_table::SideTable;
use crate::SrError;

type Task = Box<dyn FnOnce(&mut Runtime)>;

/// Native listener callback, outside the handler registries
#[derive(Clone)]
pub struct NativeHook(Rc<dyn Fn(&mut Runtime, &mut Event)>);

impl NativeHook {
    pub fn new(f: impl Fn(&mut Runtime, &mut Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    fn call(&self, rt: &mut Runtime, event: &mut Event) {
        (self.0)(rt, event)
    }
}

impl fmt::Debug for NativeHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeHook({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Sizes of per-node engine state, for leak checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackedCounts {
    /// Nodes with at least one handler record
    pub handler_nodes: usize,
    /// Nodes with at least one installed dispatcher
    pub dispatcher_nodes: usize,
    /// Native listeners registered in the document
    pub native_listeners: usize,
    /// Nodes with a non-empty animation queue
    pub queues: usize,
    /// Nodes with a side-table record
    pub side_table: usize,
    /// Native hooks (animation `transitionend` listeners included)
    pub native_hooks: usize,
    /// Pending timeouts and animation frames
    pub scheduled: usize,
}

pub struct Runtime {
    pub(crate) doc: Document,
    pub(crate) config: RuntimeConfig,
    pub(crate) scheduler: Scheduler<Task>,
    pub(crate) handlers: HashMap<NodeId, Vec<HandlerRecord>>,
    pub(crate) dispatchers: HashMap<NodeId, BTreeSet<DispatcherKey>>,
    pub(crate) queues: HashMap<NodeId, AnimationQueue>,
    pub(crate) side_table: SideTable,
    /// Tag name -> natural display
    pub(crate) display_cache: HashMap<String, String>,
    hooks: HashMap<ListenerId, NativeHook>,
    next_listener_id: u64,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("now", &self.now())
            .field("scheduler", &self.scheduler)
            .field("counts", &self.tracked_counts())
            .finish()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Runtime over an empty document with default configuration
    pub fn new() -> Self {
        Self::with_document(Document::new(), RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::with_document(Document::new(), config)
    }

    pub fn with_document(doc: Document, config: RuntimeConfig) -> Self {
        let mut rt = Self {
            scheduler: Scheduler::new(config.frame_interval_ms),
            doc,
            config,
            handlers: HashMap::new(),
            dispatchers: HashMap::new(),
            queues: HashMap::new(),
            side_table: SideTable::default(),
            display_cache: HashMap::new(),
            hooks: HashMap::new(),
            next_listener_id: DISPATCHER.0 + 1,
        };
        let now = rt.doc.now();
        rt.scheduler.set_now(now);
        rt
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current virtual time (ms)
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Elements matching `selector` in document order; empty for an
    /// invalid selector
    pub fn select(&mut self, selector: &str) -> Sr<'_> {
        let root = self.doc.root();
        let nodes = self.doc.query_all(root, selector);
        Sr::new(self, nodes)
    }

    pub fn wrap(&mut self, node: NodeId) -> Sr<'_> {
        Sr::new(self, vec![node])
    }

    pub fn wrap_all(&mut self, nodes: impl IntoIterator<Item = NodeId>) -> Sr<'_> {
        Sr::new(self, nodes.into_iter().collect())
    }

    // ------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------

    pub fn set_timeout(&mut self, delay_ms: f64, task: impl FnOnce(&mut Runtime) + 'static) -> TimerId {
        self.scheduler.set_timeout(delay_ms, Box::new(task))
    }

    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        self.scheduler.clear_timeout(id)
    }

    pub fn request_animation_frame(&mut self, task: impl FnOnce(&mut Runtime) + 'static) -> FrameId {
        self.scheduler.request_animation_frame(Box::new(task))
    }

    pub fn cancel_animation_frame(&mut self, id: FrameId) -> bool {
        self.scheduler.cancel_animation_frame(id)
    }

    fn set_time(&mut self, now_ms: f64) {
        self.scheduler.set_now(now_ms);
        self.doc.set_time(now_ms);
    }

    fn next_due(&self) -> Option<f64> {
        [
            self.doc.next_transition_end(),
            self.scheduler.next_frame_due(),
            self.scheduler.next_timer_due(),
        ]
        .into_iter()
        .flatten()
        .min_by(|a, b| a.total_cmp(b))
    }

    /// Whether anything is waiting on the clock
    pub fn has_pending_work(&self) -> bool {
        self.next_due().is_some()
    }

    /// Process the next due item if it falls at or before `limit_ms`
    fn step(&mut self, limit_ms: f64) -> bool {
        let Some(due) = self.next_due() else {
            return false;
        };
        if due > limit_ms {
            return false;
        }
        let due = due.max(self.now());
        self.set_time(due);

        let finished = self.doc.take_finished_transitions();
        if !finished.is_empty() {
            for transition in finished {
                let mut event =
                    Event::transition_end(transition.node, &transition.property, transition.elapsed_ms);
                self.dispatch_event(&mut event);
            }
            return true;
        }

        if self.scheduler.next_frame_due().is_some_and(|frame| frame <= due) {
            for task in self.scheduler.take_due_frames(due) {
                task(self);
            }
            return true;
        }

        if let Some(task) = self.scheduler.pop_due_timer(due) {
            task(self);
        }
        true
    }

    /// Move the clock forward by `ms`, running everything that falls due
    pub fn advance(&mut self, ms: u64) {
        let target = self.now() + ms as f64;
        while self.step(target) {}
        self.set_time(target);
    }

    /// Run until nothing is pending. Returns the number of steps taken.
    pub fn run_until_idle(&mut self) -> Result<usize, SrError> {
        let limit = self.config.idle_step_limit;
        let mut steps = 0;
        while let Some(due) = self.next_due() {
            if steps >= limit {
                tracing::warn!("run_until_idle gave up after {} steps", steps);
                return Err(SrError::StepLimit { steps });
            }
            self.step(due);
            steps += 1;
        }
        Ok(steps)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub(crate) fn alloc_listener_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        id
    }

    pub(crate) fn add_native_hook(&mut self, node: NodeId, event_type: &str, id: ListenerId, hook: NativeHook) {
        self.hooks.insert(id, hook);
        self.doc.add_event_listener(node, event_type, id, false);
    }

    pub(crate) fn remove_native_hook(&mut self, node: NodeId, event_type: &str, id: ListenerId) {
        self.hooks.remove(&id);
        self.doc.remove_event_listener(node, event_type, id, false);
    }

    /// Register a native listener that bypasses the handler registries
    pub fn add_event_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        f: impl Fn(&mut Runtime, &mut Event) + 'static,
    ) -> ListenerId {
        let id = self.alloc_listener_id();
        self.add_native_hook(node, event_type, id, NativeHook::new(f));
        id
    }

    pub fn remove_event_listener(&mut self, node: NodeId, event_type: &str, id: ListenerId) {
        self.remove_native_hook(node, event_type, id);
    }

    /// Dispatch along the target's propagation path. Returns false if the
    /// default action was prevented.
    pub fn dispatch_event(&mut self, event: &mut Event) -> bool {
        event.set_timestamp(self.now());
        let path = self.doc.event_path(event.target(), event.bubbles());
        for node in path {
            if event.is_propagation_stopped() {
                break;
            }
            let listeners = self.doc.event_listeners(node, event.event_type());
            if listeners.is_empty() {
                continue;
            }
            event.set_current_target(Some(node));
            for listener in listeners {
                if event.is_immediate_propagation_stopped() {
                    break;
                }
                event.set_passive(listener.passive);
                if listener.id == DISPATCHER {
                    events::run_dispatcher(self, node, event, listener.passive);
                } else if let Some(hook) = self.hooks.get(&listener.id).cloned() {
                    hook.call(self, event);
                }
                event.set_passive(false);
            }
        }
        event.set_current_target(None);
        !event.is_default_prevented()
    }

    /// Dispatch an organic (non-triggered) event of `event_type` at `node`
    pub fn fire(&mut self, node: NodeId, event_type: &str) -> Event {
        let mut event = Event::new(event_type, node);
        self.dispatch_event(&mut event);
        event
    }

    /// Trigger every type in `types` on `node` with `extra` data. Returns
    /// whether any triggered event had its default prevented.
    pub fn trigger_event(&mut self, node: NodeId, types: &str, extra: &Value) -> bool {
        events::trigger(self, node, types, extra)
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Handler records bound on `node`
    pub fn handler_count(&self, node: NodeId) -> usize {
        self.handlers.get(&node).map_or(0, Vec::len)
    }

    /// Whether `node` has a dispatcher for `(event_type, passive)`
    pub fn has_dispatcher(&self, node: NodeId, event_type: &str, passive: bool) -> bool {
        self.dispatchers.get(&node).is_some_and(|keys| {
            keys.contains(&DispatcherKey {
                event_type: event_type.to_string(),
                passive,
            })
        })
    }

    /// Steps queued on `node`, the running one included
    pub fn queue_len(&self, node: NodeId) -> usize {
        fx::queue_len(self, node)
    }

    /// Whether an animation step is in flight on `node`
    pub fn is_animating(&self, node: NodeId) -> bool {
        self.side_table.animation(node).is_some()
    }

    pub fn tracked_counts(&self) -> TrackedCounts {
        TrackedCounts {
            handler_nodes: self.handlers.len(),
            dispatcher_nodes: self.dispatchers.len(),
            native_listeners: self.doc.total_listener_count(),
            queues: self.queues.len(),
            side_table: self.side_table.len(),
            native_hooks: self.hooks.len(),
            scheduled: self.scheduler.pending_timers() + self.scheduler.pending_frames(),
        }
    }
}
