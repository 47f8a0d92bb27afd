//! Handlers and handler records

use std::fmt;
use std::rc::Rc;

use crate::events::Event;
use crate::Runtime;

/// Event handler. Clones share identity; removal compares identity.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&mut Runtime, &mut Event)>);

impl Handler {
    pub fn new(f: impl Fn(&mut Runtime, &mut Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub(crate) fn call(&self, rt: &mut Runtime, event: &mut Event) {
        (self.0)(rt, event)
    }

    /// Identity comparison
    pub fn same(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Base type and canonical (sorted, de-duplicated) namespaces of one
/// `type.ns1.ns2` item
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TypeSpec {
    pub(crate) base: String,
    pub(crate) namespaces: Vec<String>,
}

impl TypeSpec {
    pub(crate) fn parse(item: &str) -> Self {
        let mut parts = item.split('.');
        let base = parts.next().unwrap_or_default().to_string();
        let mut namespaces: Vec<String> = parts
            .filter(|ns| !ns.is_empty())
            .map(str::to_string)
            .collect();
        namespaces.sort();
        namespaces.dedup();
        Self { base, namespaces }
    }

    /// Every requested namespace is present in `other`
    pub(crate) fn namespaces_within(&self, other: &[String]) -> bool {
        self.namespaces.iter().all(|ns| other.contains(ns))
    }
}

/// One registered handler on a node
#[derive(Debug, Clone)]
pub(crate) struct HandlerRecord {
    pub(crate) event_type: String,
    pub(crate) namespaces: Vec<String>,
    /// `None` for direct bindings
    pub(crate) selector: Option<String>,
    pub(crate) handler: Handler,
    pub(crate) once: bool,
    pub(crate) passive: bool,
    /// Type string as given at bind time, namespaces included
    pub(crate) original_type: String,
}

impl HandlerRecord {
    /// Namespace rule for dispatch: organic events and triggers without
    /// namespaces reach every record; a namespaced trigger reaches records
    /// without namespaces and records whose namespaces it all carries.
    pub(crate) fn accepts(&self, event: &Event) -> bool {
        if self.event_type != event.event_type() {
            return false;
        }
        if !event.is_trigger() || event.namespaces().is_empty() || self.namespaces.is_empty() {
            return true;
        }
        self.namespaces
            .iter()
            .all(|ns| event.namespaces().contains(ns))
    }
}
