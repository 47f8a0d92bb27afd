//! Event Dispatch Engine
//!
//! Handler registration with namespaces, delegation and one-shot records;
//! one native dispatcher per `(type, passive)` pair per node.

mod args;
mod dispatch;
mod event;
mod handler;
mod registry;

pub use args::{BindArgs, BindOptions, SelectorFilter, UnbindArgs};
pub use event::Event;
pub use handler::Handler;

pub(crate) use dispatch::{run_dispatcher, trigger};
pub(crate) use handler::HandlerRecord;
pub(crate) use registry::{bind, copy_handlers, remove_all_dispatchers, unbind, DispatcherKey, DISPATCHER};
