//! In-flight animation step state
//!
//! At most one per node, stored in the side table while the step runs.

use sr_dom::ListenerId;

use crate::fx::{Callback, Easing};
use crate::scheduler::{FrameId, TimerId};

/// Ordered `property -> value` list, properties in hyphen-case
pub(crate) type StyleMap = Vec<(String, String)>;

#[derive(Debug)]
pub(crate) enum AnimationState {
    /// A `delay` step waiting on its timer
    Delay { timer: TimerId },
    /// An effect that applied its start styles and waits for the next frame
    AwaitingFrame(PendingEffect),
    /// A property transition in flight
    Transition(TransitionState),
}

#[derive(Debug)]
pub(crate) struct PendingEffect {
    pub(crate) frame: FrameId,
    pub(crate) to: StyleMap,
    pub(crate) duration_ms: u64,
    pub(crate) easing: Easing,
    /// Effect cleanup followed by the caller's callback
    pub(crate) on_complete: Callback,
}

#[derive(Debug)]
pub(crate) struct TransitionState {
    pub(crate) target: StyleMap,
    pub(crate) timer: TimerId,
    /// `transitionend` listener registered on the node
    pub(crate) listener: ListenerId,
    pub(crate) original_transition: Option<String>,
    pub(crate) original_will_change: Option<String>,
    pub(crate) on_complete: Option<Callback>,
}
