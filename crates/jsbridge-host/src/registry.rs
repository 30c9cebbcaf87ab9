//! Named host handlers and their registry.
//!
//! The embedding application populates the registry at setup time; the
//! dispatcher only ever uses [`HandlerRegistry::lookup`].  Handler names are
//! compared case-insensitively, so a script calling `getallproducts` reaches
//! the handler registered as `getAllProducts`.
//!
//! Handlers are synchronous callables: they accept a [`HandlerArgs`] view
//! over the call's JSON arguments and either return a JSON value or raise an
//! error.  Errors are sanitized to message text by the dispatcher before
//! crossing back into the sandbox.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

// ── Handler trait ─────────────────────────────────────────────────────────────

/// A host-side callable reachable from script code by name.
pub trait Handler: Send + Sync {
    /// Processes one call.  An `Err` is reported to the script caller as a
    /// sanitized message-only error payload.
    fn invoke(&self, args: HandlerArgs) -> Result<Value, anyhow::Error>;
}

// Plain closures are handlers, so registration reads naturally:
// `registry.register("echo", |args| Ok(args.raw().clone()))`.
impl<F> Handler for F
where
    F: Fn(HandlerArgs) -> Result<Value, anyhow::Error> + Send + Sync,
{
    fn invoke(&self, args: HandlerArgs) -> Result<Value, anyhow::Error> {
        self(args)
    }
}

// ── Handler arguments ─────────────────────────────────────────────────────────

/// Typed view over a call's raw JSON arguments.
///
/// The protocol does not impose a calling convention: arguments arrive as a
/// JSON object (named parameters) or array (positional parameters).  Most
/// handlers use [`named`](Self::named); single-argument handlers
/// conventionally take `positional(0)` of an array.
#[derive(Debug, Clone)]
pub struct HandlerArgs {
    value: Value,
}

impl HandlerArgs {
    /// Wraps the `data` field of an outbound message (`None` becomes an
    /// empty argument set).
    pub fn new(data: Option<Value>) -> Self {
        Self {
            value: data.unwrap_or(Value::Null),
        }
    }

    /// Looks up a named parameter when the arguments are a JSON object.
    pub fn named(&self, key: &str) -> Option<&Value> {
        self.value.as_object().and_then(|map| map.get(key))
    }

    /// Looks up a positional parameter when the arguments are a JSON array.
    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.value.as_array().and_then(|items| items.get(index))
    }

    /// The arguments exactly as they crossed the boundary.
    pub fn raw(&self) -> &Value {
        &self.value
    }

    /// `true` when the caller passed no usable arguments.
    pub fn is_empty(&self) -> bool {
        match &self.value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Mapping from handler name to host callable, case-insensitive.
///
/// # Example
///
/// ```rust
/// use jsbridge_host::{HandlerArgs, HandlerRegistry};
///
/// let mut registry = HandlerRegistry::new();
/// registry.register("echo", |args: HandlerArgs| Ok(args.raw().clone()));
/// assert!(registry.lookup("ECHO").is_some());
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`.
    ///
    /// Names are folded to lowercase, so later lookups match any casing.  A
    /// later registration under the same (case-folded) name replaces the
    /// earlier one.
    pub fn register(&mut self, name: impl Into<String>, handler: impl Handler + 'static) {
        self.handlers
            .insert(name.into().to_ascii_lowercase(), Arc::new(handler));
    }

    /// Finds the handler for `name`, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(&name.to_ascii_lowercase()).cloned()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// `true` when no handler has been registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
