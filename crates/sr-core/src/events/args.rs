//! Public argument shapes for `on`/`one`/`off`
//!
//! Every overload is normalized here into `BindRequest`s or an `UnbindArgs`
//! so the registry never looks at argument shape.

use crate::events::Handler;

/// Listener options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindOptions {
    /// Remove the handler after its first run
    pub once: bool,
    /// Register on the passive dispatcher
    pub passive: bool,
}

impl BindOptions {
    pub fn once() -> Self {
        Self { once: true, passive: false }
    }

    pub fn passive() -> Self {
        Self { once: false, passive: true }
    }
}

/// Arguments accepted by `on`
#[derive(Debug, Clone)]
pub enum BindArgs {
    /// `on(types, [selector], handler, [options])`. A missing handler makes
    /// the whole call a no-op.
    Types {
        types: String,
        selector: Option<String>,
        handler: Option<Handler>,
        options: BindOptions,
    },
    /// `on({ type: handler, ... }, [selector], [options])`
    Map {
        handlers: Vec<(String, Handler)>,
        selector: Option<String>,
        options: BindOptions,
    },
}

impl BindArgs {
    /// Direct binding for a whitespace-separated type list
    pub fn new(types: &str, handler: Handler) -> Self {
        BindArgs::Types {
            types: types.to_string(),
            selector: None,
            handler: Some(handler),
            options: BindOptions::default(),
        }
    }

    /// Binding whose handler is absent (for example a value that was not a
    /// function); binds nothing
    pub fn without_handler(types: &str) -> Self {
        BindArgs::Types {
            types: types.to_string(),
            selector: None,
            handler: None,
            options: BindOptions::default(),
        }
    }

    /// One binding per `(types, handler)` entry, sharing selector and options
    pub fn map<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Handler)>,
        S: Into<String>,
    {
        BindArgs::Map {
            handlers: entries.into_iter().map(|(t, h)| (t.into(), h)).collect(),
            selector: None,
            options: BindOptions::default(),
        }
    }

    /// Delegate to descendants matching `selector`
    pub fn selector(mut self, value: &str) -> Self {
        match &mut self {
            BindArgs::Types { selector, .. } | BindArgs::Map { selector, .. } => {
                *selector = Some(value.to_string());
            }
        }
        self
    }

    pub fn options(mut self, value: BindOptions) -> Self {
        match &mut self {
            BindArgs::Types { options, .. } | BindArgs::Map { options, .. } => *options = value,
        }
        self
    }

    pub(crate) fn force_once(mut self) -> Self {
        match &mut self {
            BindArgs::Types { options, .. } | BindArgs::Map { options, .. } => options.once = true,
        }
        self
    }

    /// Canonical requests. Empty when there is nothing to bind.
    pub(crate) fn into_requests(self) -> Vec<BindRequest> {
        match self {
            BindArgs::Types { types, selector, handler, options } => {
                let Some(handler) = handler else {
                    tracing::warn!("on({}): handler is not a function; ignoring", types);
                    return Vec::new();
                };
                vec![BindRequest { types, selector, handler, options }]
            }
            BindArgs::Map { handlers, selector, options } => handlers
                .into_iter()
                .map(|(types, handler)| BindRequest {
                    types,
                    selector: selector.clone(),
                    handler,
                    options,
                })
                .collect(),
        }
    }
}

/// One normalized bind call
#[derive(Debug, Clone)]
pub(crate) struct BindRequest {
    pub(crate) types: String,
    pub(crate) selector: Option<String>,
    pub(crate) handler: Handler,
    pub(crate) options: BindOptions,
}

/// Which bindings an unbind touches by selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorFilter {
    /// Direct and delegated bindings
    Any,
    /// Direct bindings only
    Direct,
    /// Delegated bindings with exactly this selector
    Exact(String),
}

impl SelectorFilter {
    pub(crate) fn accepts(&self, selector: Option<&str>) -> bool {
        match self {
            SelectorFilter::Any => true,
            SelectorFilter::Direct => selector.is_none(),
            SelectorFilter::Exact(wanted) => selector == Some(wanted.as_str()),
        }
    }
}

/// Arguments accepted by `off`
#[derive(Debug, Clone)]
pub enum UnbindArgs {
    /// `off()`: every handler and dispatcher on the node
    All,
    /// `off(types, [selector], [handler])`
    Matching {
        types: String,
        selector: SelectorFilter,
        handler: Option<Handler>,
    },
}

impl UnbindArgs {
    /// `off(types)`: any selector, any handler
    pub fn types(types: &str) -> Self {
        UnbindArgs::Matching {
            types: types.to_string(),
            selector: SelectorFilter::Any,
            handler: None,
        }
    }

    /// `off(types, handler)`: direct bindings of that handler
    pub fn handler(types: &str, handler: Handler) -> Self {
        UnbindArgs::Matching {
            types: types.to_string(),
            selector: SelectorFilter::Direct,
            handler: Some(handler),
        }
    }

    /// `off(types, selector, [handler])`
    pub fn delegated(types: &str, selector: &str, handler: Option<Handler>) -> Self {
        UnbindArgs::Matching {
            types: types.to_string(),
            selector: SelectorFilter::Exact(selector.to_string()),
            handler,
        }
    }
}
