//! CSS Transitions
//!
//! Transition declarations, timing functions and in-flight transitions
//! evaluated against the document clock.
//! https://www.w3.org/TR/css-transitions-1/

use crate::NodeId;

/// CSS transition timing function
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TimingFunction {
    /// linear
    Linear,
    /// ease
    #[default]
    Ease,
    /// ease-in
    EaseIn,
    /// ease-out
    EaseOut,
    /// ease-in-out
    EaseInOut,
    /// cubic-bezier(x1, y1, x2, y2)
    CubicBezier(f64, f64, f64, f64),
    /// steps(count, position)
    Steps(u32, StepPosition),
}

/// Step position for steps() timing function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepPosition {
    #[default]
    End,
    Start,
    JumpNone,
    JumpBoth,
}

impl TimingFunction {
    /// Evaluate the timing function at progress t (0.0 to 1.0)
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            TimingFunction::Linear => t,
            TimingFunction::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            TimingFunction::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            TimingFunction::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            TimingFunction::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            TimingFunction::CubicBezier(x1, y1, x2, y2) => cubic_bezier(*x1, *y1, *x2, *y2, t),
            TimingFunction::Steps(steps, position) => step_function(*steps, *position, t),
        }
    }

    /// Parse a timing keyword or function
    pub fn parse(s: &str) -> Option<TimingFunction> {
        match s {
            "linear" => Some(TimingFunction::Linear),
            "ease" => Some(TimingFunction::Ease),
            "ease-in" => Some(TimingFunction::EaseIn),
            "ease-out" => Some(TimingFunction::EaseOut),
            "ease-in-out" => Some(TimingFunction::EaseInOut),
            _ if s.starts_with("cubic-bezier(") => {
                let inner = s.trim_start_matches("cubic-bezier(").trim_end_matches(')');
                let vals: Vec<f64> = inner
                    .split(',')
                    .filter_map(|v| v.trim().parse().ok())
                    .collect();
                if vals.len() == 4 {
                    Some(TimingFunction::CubicBezier(vals[0], vals[1], vals[2], vals[3]))
                } else {
                    None
                }
            }
            _ if s.starts_with("steps(") => {
                let inner = s.trim_start_matches("steps(").trim_end_matches(')');
                let parts: Vec<&str> = inner.split(',').map(|s| s.trim()).collect();
                let steps = parts.first()?.parse().ok()?;
                let position = match parts.get(1).copied() {
                    Some("start") | Some("jump-start") => StepPosition::Start,
                    Some("jump-none") => StepPosition::JumpNone,
                    Some("jump-both") => StepPosition::JumpBoth,
                    _ => StepPosition::End,
                };
                Some(TimingFunction::Steps(steps, position))
            }
            _ => None,
        }
    }
}

/// Cubic bezier evaluation (simplified Newton-Raphson)
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, t: f64) -> f64 {
    let mut guess = t;
    for _ in 0..8 {
        let x = bezier_component(x1, x2, guess) - t;
        if x.abs() < 0.0001 {
            break;
        }
        let dx = bezier_derivative(x1, x2, guess);
        if dx.abs() < 0.0001 {
            break;
        }
        guess -= x / dx;
    }
    bezier_component(y1, y2, guess)
}

fn bezier_component(p1: f64, p2: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t2 * p2 + t3
}

fn bezier_derivative(p1: f64, p2: f64, t: f64) -> f64 {
    let t2 = t * t;
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t2 * (1.0 - p2)
}

fn step_function(steps: u32, position: StepPosition, t: f64) -> f64 {
    let steps = steps.max(1) as f64;
    match position {
        StepPosition::Start => (t * steps).ceil() / steps,
        StepPosition::End => (t * steps).floor() / steps,
        StepPosition::JumpNone => {
            let s = steps - 1.0;
            if s <= 0.0 { t } else { (t * s).floor() / s }
        }
        StepPosition::JumpBoth => {
            let s = steps + 1.0;
            ((t * s).floor() / s).min(1.0)
        }
    }
}

/// One entry of a `transition` shorthand list
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSpec {
    /// Property being transitioned ("all" covers everything)
    pub property: String,
    pub duration_ms: f64,
    pub delay_ms: f64,
    pub timing: TimingFunction,
}

impl TransitionSpec {
    /// Parse a single `property duration [timing] [delay]` entry
    pub fn parse(value: &str) -> Option<TransitionSpec> {
        let mut parts = value.split_whitespace();
        let property = parts.next()?.to_ascii_lowercase();

        let mut spec = TransitionSpec {
            property,
            duration_ms: 0.0,
            delay_ms: 0.0,
            timing: TimingFunction::Ease,
        };
        let mut seen_duration = false;

        for part in parts {
            if let Some(timing) = TimingFunction::parse(part) {
                spec.timing = timing;
            } else if let Some(time) = parse_time(part) {
                // First time value is the duration, the second the delay
                if seen_duration {
                    spec.delay_ms = time;
                } else {
                    spec.duration_ms = time;
                    seen_duration = true;
                }
            }
        }

        Some(spec)
    }

    /// Whether this entry applies to `property`
    pub fn covers(&self, property: &str) -> bool {
        self.property == "all" || self.property == property
    }
}

/// Parse a comma-separated `transition` value. `none` yields no entries.
pub fn parse_transition_list(value: &str) -> Vec<TransitionSpec> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Vec::new();
    }
    split_top_level(value)
        .into_iter()
        .filter_map(TransitionSpec::parse)
        .filter(|spec| spec.property != "none")
        .collect()
}

/// Split on commas that are not nested in parentheses
fn split_top_level(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

fn parse_time(s: &str) -> Option<f64> {
    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse().ok()
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<f64>().ok().map(|v| v * 1000.0)
    } else {
        None
    }
}

/// An interpolable numeric CSS value (`12px`, `0.5`)
#[derive(Debug, Clone, PartialEq)]
pub struct CssNumber {
    pub value: f64,
    pub unit: String,
}

impl CssNumber {
    pub fn parse(s: &str) -> Option<CssNumber> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);
        let value: f64 = number.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        match unit {
            "" | "px" | "%" | "em" | "rem" | "deg" => Some(CssNumber {
                value,
                unit: unit.to_string(),
            }),
            _ => None,
        }
    }

    /// Format with trailing zeros trimmed (`10px`, `0.25`)
    pub fn format(value: f64, unit: &str) -> String {
        let rounded = (value * 1000.0).round() / 1000.0;
        if rounded.fract() == 0.0 {
            format!("{}{}", rounded as i64, unit)
        } else {
            format!("{rounded}{unit}")
        }
    }
}

/// A transition in progress on one element property
#[derive(Debug, Clone)]
pub(crate) struct RunningTransition {
    pub(crate) node: NodeId,
    pub(crate) property: String,
    from: CssNumber,
    to: CssNumber,
    start_ms: f64,
    duration_ms: f64,
    delay_ms: f64,
    timing: TimingFunction,
}

impl RunningTransition {
    pub(crate) fn new(
        node: NodeId,
        property: &str,
        from: CssNumber,
        to: CssNumber,
        now_ms: f64,
        spec: &TransitionSpec,
    ) -> Self {
        Self {
            node,
            property: property.to_string(),
            from,
            to,
            start_ms: now_ms,
            duration_ms: spec.duration_ms,
            delay_ms: spec.delay_ms,
            timing: spec.timing,
        }
    }

    /// Time at which the transition completes
    pub(crate) fn end_ms(&self) -> f64 {
        self.start_ms + self.delay_ms + self.duration_ms
    }

    pub(crate) fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Current interpolated value at `now_ms`
    pub(crate) fn value_at(&self, now_ms: f64) -> String {
        let elapsed = now_ms - self.start_ms - self.delay_ms;
        let progress = if elapsed <= 0.0 {
            0.0
        } else if self.duration_ms <= 0.0 {
            1.0
        } else {
            elapsed / self.duration_ms
        };
        let eased = self.timing.evaluate(progress);
        let value = self.from.value + (self.to.value - self.from.value) * eased;
        CssNumber::format(value, &self.to.unit)
    }
}

/// A transition that reached its end on the document clock
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedTransition {
    pub node: NodeId,
    pub property: String,
    pub elapsed_ms: f64,
}
