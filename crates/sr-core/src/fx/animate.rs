//! `animate`, `delay` and `stop`

use sr_dom::NodeId;

use crate::fx::queue::{self, dequeue, enqueue};
use crate::fx::state::{AnimationState, StyleMap};
use crate::fx::transition::{finalize, run_transition};
use crate::fx::ResolvedFx;
use crate::util::{camel_case, camel_to_kebab};
use crate::Runtime;

/// Properties whose bare numbers take no `px` unit (camelCase)
const UNITLESS: &[&str] = &[
    "animationIterationCount",
    "columnCount",
    "fillOpacity",
    "flex",
    "flexGrow",
    "flexShrink",
    "fontWeight",
    "gridArea",
    "gridColumn",
    "gridRow",
    "lineHeight",
    "opacity",
    "order",
    "orphans",
    "scale",
    "widows",
    "zIndex",
    "zoom",
    "strokeOpacity",
];

/// Target value for `animate`
#[derive(Debug, Clone, PartialEq)]
pub enum CssValue {
    /// Bare number; gains `px` unless the property is unitless
    Number(f64),
    /// Used as given
    Text(String),
}

impl CssValue {
    fn to_css(&self, camel_property: &str) -> String {
        match self {
            CssValue::Number(n) => {
                let number = if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                };
                if UNITLESS.contains(&camel_property) {
                    number
                } else {
                    format!("{number}px")
                }
            }
            CssValue::Text(text) => text.clone(),
        }
    }
}

impl From<f64> for CssValue {
    fn from(n: f64) -> Self {
        CssValue::Number(n)
    }
}

impl From<i32> for CssValue {
    fn from(n: i32) -> Self {
        CssValue::Number(n as f64)
    }
}

impl From<&str> for CssValue {
    fn from(s: &str) -> Self {
        CssValue::Text(s.to_string())
    }
}

impl From<String> for CssValue {
    fn from(s: String) -> Self {
        CssValue::Text(s)
    }
}

/// Queue a property animation on `node`
pub(crate) fn animate(rt: &mut Runtime, node: NodeId, properties: Vec<(String, CssValue)>, fx: ResolvedFx) {
    enqueue(
        rt,
        node,
        Box::new(move |rt: &mut Runtime, node| {
            if !rt.doc.is_connected(node) {
                dequeue(rt, node);
                return;
            }

            let mut target: StyleMap = Vec::new();
            for (name, value) in &properties {
                let camel = camel_case(name);
                let property = camel_to_kebab(&camel);
                let value = value.to_css(&camel);
                if rt.doc.computed_style(node, &property) != value {
                    target.push((property, value));
                }
            }

            rt.doc.force_layout(node);
            run_transition(rt, node, target, fx.duration_ms, fx.easing, fx.complete);
        }),
    );
}

/// Queue a pause of `duration_ms`
pub(crate) fn delay(rt: &mut Runtime, node: NodeId, duration_ms: u64) {
    enqueue(
        rt,
        node,
        Box::new(move |rt: &mut Runtime, node| {
            let timer = rt.set_timeout(duration_ms as f64, move |rt: &mut Runtime| {
                if matches!(rt.side_table.animation(node), Some(AnimationState::Delay { .. })) {
                    rt.side_table.take_animation(node);
                }
                dequeue(rt, node);
            });
            rt.side_table.set_animation(node, AnimationState::Delay { timer });
        }),
    );
}

/// Stop the in-flight step on `node`.
///
/// `clear_queue` drops pending steps. `jump_to_end` applies the step's end
/// values and runs its callback; otherwise styles freeze where they are.
pub(crate) fn stop(rt: &mut Runtime, node: NodeId, clear_queue: bool, jump_to_end: bool) {
    if clear_queue {
        queue::clear(rt, node);
    }

    let Some(state) = rt.side_table.take_animation(node) else {
        if !clear_queue {
            dequeue(rt, node);
        }
        return;
    };

    match state {
        AnimationState::Delay { timer } => {
            rt.clear_timeout(timer);
            dequeue(rt, node);
        }
        AnimationState::AwaitingFrame(pending) => {
            rt.cancel_animation_frame(pending.frame);
            if jump_to_end {
                apply_without_transition(rt, node, &pending.to);
                pending.on_complete.call(rt, node);
            }
            dequeue(rt, node);
        }
        AnimationState::Transition(state) => {
            let snapshot: StyleMap = if jump_to_end {
                state.target.clone()
            } else {
                state
                    .target
                    .iter()
                    .map(|(property, _)| (property.clone(), rt.doc.computed_style(node, property)))
                    .collect()
            };
            rt.doc.set_style(node, "transition", "none");
            for (property, value) in &snapshot {
                rt.doc.set_style(node, property, value);
            }
            rt.doc.force_layout(node);
            finalize(rt, node, state, jump_to_end);
        }
    }
}

/// Assign styles with transitions suspended, then restore the inline
/// `transition`
fn apply_without_transition(rt: &mut Runtime, node: NodeId, styles: &StyleMap) {
    let original = rt.doc.inline_style(node, "transition").map(str::to_string);
    rt.doc.set_style(node, "transition", "none");
    for (property, value) in styles {
        rt.doc.set_style(node, property, value);
    }
    rt.doc.force_layout(node);
    match original {
        Some(value) => rt.doc.set_style(node, "transition", &value),
        None => rt.doc.remove_style(node, "transition"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_value_units() {
        assert_eq!(CssValue::from(100).to_css("height"), "100px");
        assert_eq!(CssValue::from(0.5).to_css("opacity"), "0.5");
        assert_eq!(CssValue::from(2).to_css("zIndex"), "2");
        assert_eq!(CssValue::from(12.5).to_css("marginTop"), "12.5px");
        assert_eq!(CssValue::from("3em").to_css("height"), "3em");
    }
}
