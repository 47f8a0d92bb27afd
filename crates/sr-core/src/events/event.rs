//! Event object passed to handlers

use serde_json::Value;
use sr_dom::NodeId;

/// Event types that do not bubble when triggered
pub(crate) const NON_BUBBLING: &[&str] = &[
    "mouseenter",
    "mouseleave",
    "focus",
    "blur",
    "load",
    "unload",
    "scroll",
];

/// Whether events of this type bubble
pub fn bubbles(event_type: &str) -> bool {
    !NON_BUBBLING.contains(&event_type)
}

/// A dispatched event
#[derive(Debug, Clone)]
pub struct Event {
    event_type: String,
    target: NodeId,
    current_target: Option<NodeId>,
    receiver: Option<NodeId>,
    bubbles: bool,
    cancelable: bool,
    timestamp: f64,
    /// Set for events produced by `trigger`
    synthetic: bool,
    /// Namespaces of a triggered event, sorted
    namespaces: Vec<String>,
    extra: Value,
    property_name: Option<String>,
    elapsed_time: f64,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
    /// Listener currently running was registered as passive
    in_passive_listener: bool,
}

impl Event {
    /// An organic event of `event_type` targeted at `target`
    pub fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: None,
            receiver: None,
            bubbles: bubbles(event_type),
            cancelable: true,
            timestamp: 0.0,
            synthetic: false,
            namespaces: Vec::new(),
            extra: Value::Null,
            property_name: None,
            elapsed_time: 0.0,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            in_passive_listener: false,
        }
    }

    /// A triggered event carrying namespaces and extra data
    pub(crate) fn triggered(event_type: &str, target: NodeId, namespaces: Vec<String>, extra: Value) -> Self {
        Self {
            synthetic: true,
            namespaces,
            extra,
            ..Self::new(event_type, target)
        }
    }

    /// `transitionend` for a finished CSS transition
    pub(crate) fn transition_end(target: NodeId, property: &str, elapsed_ms: f64) -> Self {
        Self {
            cancelable: false,
            bubbles: true,
            property_name: Some(property.to_string()),
            elapsed_time: elapsed_ms / 1000.0,
            ..Self::new("transitionend", target)
        }
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: f64) {
        self.timestamp = timestamp;
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Node the event was dispatched to
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Node whose listener is currently running
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    /// Node a handler runs for: the bound node for direct handlers, the
    /// matched descendant for delegated ones
    pub fn receiver(&self) -> Option<NodeId> {
        self.receiver
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// Virtual time of dispatch (ms)
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Whether the event came from `trigger`
    pub fn is_trigger(&self) -> bool {
        self.synthetic
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Extra data given to `trigger`
    pub fn extra(&self) -> &Value {
        &self.extra
    }

    /// Property of a `transitionend` event
    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }

    /// Duration of a finished transition (seconds)
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    /// Prevent default action. Ignored inside passive listeners and for
    /// non-cancelable events.
    pub fn prevent_default(&mut self) {
        if self.in_passive_listener {
            tracing::warn!("preventDefault ignored inside passive {} listener", self.event_type);
            return;
        }
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop propagation to further nodes
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Stop propagation and skip remaining handlers on this node
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    pub fn is_immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }

    pub(crate) fn set_current_target(&mut self, node: Option<NodeId>) {
        self.current_target = node;
    }

    pub(crate) fn set_receiver(&mut self, node: Option<NodeId>) {
        self.receiver = node;
    }

    pub(crate) fn set_passive(&mut self, passive: bool) {
        self.in_passive_listener = passive;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sr_dom::Document;

    fn target() -> NodeId {
        Document::new().body().unwrap()
    }

    #[test]
    fn test_prevent_default_respects_cancelable() {
        let mut event = Event::new("click", target()).with_cancelable(false);
        event.prevent_default();
        assert!(!event.is_default_prevented());

        let mut event = Event::new("click", target());
        event.prevent_default();
        assert!(event.is_default_prevented());
    }

    #[test]
    fn test_prevent_default_ignored_when_passive() {
        let mut event = Event::new("touchstart", target());
        event.set_passive(true);
        event.prevent_default();
        assert!(!event.is_default_prevented());
    }

    #[test]
    fn test_non_bubbling_types() {
        assert!(!Event::new("focus", target()).bubbles());
        assert!(!Event::new("mouseenter", target()).bubbles());
        assert!(Event::new("click", target()).bubbles());
    }

    #[test]
    fn test_stop_immediate_implies_stop() {
        let mut event = Event::new("click", target());
        event.stop_immediate_propagation();
        assert!(event.is_propagation_stopped());
        assert!(event.is_immediate_propagation_stopped());
    }
}
