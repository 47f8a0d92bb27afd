//! Show/hide effects: fade and slide
//!
//! Every effect step runs the same sequence: skip checks, prepare, flush,
//! measure, apply the start styles, flush again, then transition to the end
//! styles on the next animation frame. The effect's cleanup runs before the
//! caller's completion callback.

use sr_dom::NodeId;

use crate::fx::display::resolve_display;
use crate::fx::queue::{dequeue, enqueue};
use crate::fx::state::{AnimationState, PendingEffect, StyleMap};
use crate::fx::transition::run_transition;
use crate::fx::{Callback, Easing, FxOptions};
use crate::Runtime;

/// Box properties animated by slide effects
const SLIDE_PROPERTIES: &[&str] = &[
    "height",
    "max-height",
    "padding-top",
    "padding-bottom",
    "margin-top",
    "margin-bottom",
    "border-top-width",
    "border-bottom-width",
];

/// Direction of an effect step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visibility {
    Show,
    Hide,
    Toggle,
}

/// A show/hide effect
pub(crate) trait Effect: Copy + 'static {
    /// Easing used when the caller gives none
    const EASING: Easing;
    /// Skip elements whose computed display is `inline`
    const SKIP_INLINE: bool;

    /// Set state that must be in place before measuring
    fn prepare(&self, rt: &mut Runtime, node: NodeId, showing: bool);

    /// Start and end styles
    fn measure(&self, rt: &Runtime, node: NodeId, showing: bool) -> (StyleMap, StyleMap);

    /// Remove temporary inline styles once the transition is done
    fn cleanup(&self, rt: &mut Runtime, node: NodeId, showing: bool);
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Fade;

impl Effect for Fade {
    const EASING: Easing = Easing::Linear;
    const SKIP_INLINE: bool = false;

    fn prepare(&self, rt: &mut Runtime, node: NodeId, showing: bool) {
        if showing {
            rt.doc.set_style(node, "opacity", "0");
            let display = resolve_display(rt, node);
            rt.doc.set_style(node, "display", &display);
        }
    }

    fn measure(&self, rt: &Runtime, node: NodeId, showing: bool) -> (StyleMap, StyleMap) {
        let from = vec![("opacity".to_string(), rt.doc.computed_style(node, "opacity"))];
        let to = vec![("opacity".to_string(), if showing { "1" } else { "0" }.to_string())];
        (from, to)
    }

    fn cleanup(&self, rt: &mut Runtime, node: NodeId, showing: bool) {
        rt.doc.remove_style(node, "opacity");
        if !showing {
            rt.doc.set_style(node, "display", "none");
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Slide;

impl Effect for Slide {
    const EASING: Easing = Easing::Swing;
    const SKIP_INLINE: bool = true;

    fn prepare(&self, rt: &mut Runtime, node: NodeId, showing: bool) {
        if showing {
            let display = resolve_display(rt, node);
            rt.doc.set_style(node, "display", &display);
        }
        rt.doc.set_style(node, "overflow", "hidden");
    }

    fn measure(&self, rt: &Runtime, node: NodeId, showing: bool) -> (StyleMap, StyleMap) {
        let mut from = Vec::new();
        let mut to = Vec::new();
        for &property in SLIDE_PROPERTIES {
            let value = rt.doc.computed_style(node, property);
            if property == "max-height" && value == "none" {
                continue;
            }
            let (start, end) = if showing {
                ("0px".to_string(), value)
            } else {
                (value, "0px".to_string())
            };
            from.push((property.to_string(), start));
            to.push((property.to_string(), end));
        }
        (from, to)
    }

    fn cleanup(&self, rt: &mut Runtime, node: NodeId, showing: bool) {
        for property in SLIDE_PROPERTIES {
            rt.doc.remove_style(node, property);
        }
        rt.doc.remove_style(node, "overflow");
        if !showing {
            rt.doc.set_style(node, "display", "none");
        }
    }
}

/// Queue one effect step on `node`
pub(crate) fn queue_effect<E: Effect>(
    rt: &mut Runtime,
    node: NodeId,
    effect: E,
    visibility: Visibility,
    options: &FxOptions,
) {
    let fx = options.resolve(&rt.config.fx, E::EASING.name());
    enqueue(
        rt,
        node,
        Box::new(move |rt: &mut Runtime, node| {
            let finish_early = |rt: &mut Runtime| {
                if let Some(callback) = &fx.complete {
                    callback.call(rt, node);
                }
                dequeue(rt, node);
            };

            if !rt.doc.is_connected(node) {
                finish_early(rt);
                return;
            }
            let display = rt.doc.computed_style(node, "display");
            if E::SKIP_INLINE && display == "inline" {
                finish_early(rt);
                return;
            }
            let hidden = display == "none";
            let showing = match visibility {
                Visibility::Show => true,
                Visibility::Hide => false,
                Visibility::Toggle => hidden,
            };
            if showing != hidden {
                finish_early(rt);
                return;
            }

            effect.prepare(rt, node, showing);
            rt.doc.force_layout(node);
            let (from, to) = effect.measure(rt, node, showing);
            for (property, value) in &from {
                rt.doc.set_style(node, property, value);
            }
            rt.doc.force_layout(node);

            let user_callback = fx.complete.clone();
            let on_complete = Callback::new(move |rt, node| {
                effect.cleanup(rt, node, showing);
                if let Some(callback) = &user_callback {
                    callback.call(rt, node);
                }
            });

            let frame = rt.request_animation_frame(move |rt: &mut Runtime| {
                resume_effect(rt, node);
            });
            rt.side_table.set_animation(
                node,
                AnimationState::AwaitingFrame(PendingEffect {
                    frame,
                    to,
                    duration_ms: fx.duration_ms,
                    easing: fx.easing,
                    on_complete,
                }),
            );
        }),
    );
}

/// Frame callback of an effect: start the transition to the end styles
fn resume_effect(rt: &mut Runtime, node: NodeId) {
    if !matches!(rt.side_table.animation(node), Some(AnimationState::AwaitingFrame(_))) {
        return;
    }
    if let Some(AnimationState::AwaitingFrame(pending)) = rt.side_table.take_animation(node) {
        run_transition(
            rt,
            node,
            pending.to,
            pending.duration_ms,
            pending.easing,
            Some(pending.on_complete),
        );
    }
}
