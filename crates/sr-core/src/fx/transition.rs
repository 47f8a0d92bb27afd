//! Transition steps
//!
//! Declare a `transition` covering the target properties, assign the end
//! values, then finalize on the node's own `transitionend` or on the
//! failsafe timer, whichever comes first.

use sr_dom::NodeId;

use crate::fx::queue::dequeue;
use crate::fx::state::{AnimationState, StyleMap, TransitionState};
use crate::fx::{Callback, Easing};
use crate::runtime::NativeHook;
use crate::Runtime;

pub(crate) fn run_transition(
    rt: &mut Runtime,
    node: NodeId,
    target: StyleMap,
    duration_ms: u64,
    easing: Easing,
    on_complete: Option<Callback>,
) {
    if target.is_empty() {
        if let Some(callback) = on_complete {
            callback.call(rt, node);
        }
        dequeue(rt, node);
        return;
    }

    let original_transition = rt.doc.inline_style(node, "transition").map(str::to_string);
    let original_will_change = rt.doc.inline_style(node, "will-change").map(str::to_string);

    let transition = target
        .iter()
        .map(|(property, _)| format!("{property} {duration_ms}ms {}", easing.css()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut will_change: Vec<String> = original_will_change
        .as_deref()
        .filter(|value| *value != "auto")
        .map(|value| value.split(',').map(|p| p.trim().to_string()).collect())
        .unwrap_or_default();
    for (property, _) in &target {
        if !will_change.contains(property) {
            will_change.push(property.clone());
        }
    }

    rt.doc.set_style(node, "transition", &transition);
    rt.doc.set_style(node, "will-change", &will_change.join(", "));

    let listener = rt.alloc_listener_id();
    let hook = NativeHook::new(move |rt: &mut Runtime, event| {
        // Ignore transitions of descendants bubbling up
        if event.target() == node {
            finish_transition(rt, node, listener);
        }
    });
    rt.add_native_hook(node, "transitionend", listener, hook);

    let failsafe = duration_ms.saturating_add(rt.config.fx.failsafe_margin_ms) as f64;
    let timer = rt.set_timeout(failsafe, move |rt: &mut Runtime| {
        finish_transition(rt, node, listener);
    });

    for (property, value) in &target {
        rt.doc.set_style(node, property, value);
    }

    tracing::debug!("Transition on {}: {}", node, transition);
    rt.side_table.set_animation(
        node,
        AnimationState::Transition(TransitionState {
            target,
            timer,
            listener,
            original_transition,
            original_will_change,
            on_complete,
        }),
    );
}

/// Finalize the transition step armed with `listener`, if it is still the
/// node's in-flight step
fn finish_transition(rt: &mut Runtime, node: NodeId, listener: sr_dom::ListenerId) {
    let current = matches!(
        rt.side_table.animation(node),
        Some(AnimationState::Transition(state)) if state.listener == listener
    );
    if !current {
        return;
    }
    if let Some(AnimationState::Transition(state)) = rt.side_table.take_animation(node) {
        finalize(rt, node, state, true);
    }
}

/// Cancel the armed listener and timer, restore `transition` and
/// `will-change`, optionally run the callback, then advance the queue.
pub(crate) fn finalize(rt: &mut Runtime, node: NodeId, state: TransitionState, run_callback: bool) {
    disarm(rt, node, &state);

    restore(rt, node, "will-change", state.original_will_change.as_deref());
    restore(rt, node, "transition", state.original_transition.as_deref());

    if run_callback {
        if let Some(callback) = &state.on_complete {
            callback.call(rt, node);
        }
    }

    tracing::debug!("Finalized transition step on {}", node);
    dequeue(rt, node);
}

/// Cancel the listener and failsafe of a transition step
pub(crate) fn disarm(rt: &mut Runtime, node: NodeId, state: &TransitionState) {
    rt.clear_timeout(state.timer);
    rt.remove_native_hook(node, "transitionend", state.listener);
}

fn restore(rt: &mut Runtime, node: NodeId, property: &str, original: Option<&str>) {
    match original {
        Some(value) => rt.doc.set_style(node, property, value),
        None => rt.doc.remove_style(node, property),
    }
}
