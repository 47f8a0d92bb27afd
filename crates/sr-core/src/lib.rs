//! SR Core
//!
//! Event delegation and animation queueing on top of `sr-dom`.
//!
//! A [`Runtime`] owns the document, a cooperative scheduler driven by a
//! virtual clock, per-node handler registries, animation queues and the
//! per-node side table. [`Sr`] is the chainable node-set wrapper callers use.

mod config;
mod data;
mod error;
mod events;
mod fx;
mod lifecycle;
mod runtime;
mod scheduler;
mod selection;
mod side_table;
mod util;

pub use config::{FxConfig, RuntimeConfig};
pub use error::SrError;
pub use events::{BindArgs, BindOptions, Event, Handler, SelectorFilter, UnbindArgs};
pub use fx::{Callback, CssValue, Easing, FxOptions, Speed};
pub use runtime::{NativeHook, Runtime, TrackedCounts};
pub use scheduler::{FrameId, TimerId};
pub use selection::Sr;

pub use serde_json::Value;
pub use sr_dom::{Document, NodeId};
