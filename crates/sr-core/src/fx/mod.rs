//! Animation Queue Engine
//!
//! Per-node FIFO of animation steps driving CSS transitions, with
//! deterministic completion through `transitionend` or a failsafe timer and
//! cancellation through `stop`.

mod animate;
mod display;
mod effects;
mod options;
mod queue;
mod state;
mod transition;

pub use animate::CssValue;
pub use options::{Callback, Easing, FxOptions, Speed};

pub(crate) use animate::{animate, delay, stop};
pub(crate) use display::{hide, show};
pub(crate) use effects::{queue_effect, Effect, Fade, Slide, Visibility};
pub(crate) use options::ResolvedFx;
pub(crate) use queue::{AnimationQueue, len as queue_len};
pub(crate) use state::AnimationState;
pub(crate) use transition::disarm;
