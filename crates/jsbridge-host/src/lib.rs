//! jsbridge-host library crate.
//!
//! The privileged half of the WebView JavaScript bridge: it receives the
//! script side's "messages are ready" notification, drains the outbound
//! queue, routes each message to a registered handler, and pushes results
//! back into the script context.
//!
//! # Architecture
//!
//! ```text
//! Script context (sandboxed)
//!         ↕  eval only
//! [jsbridge-host]
//!   ├── context/     ScriptContext seam + in-process LocalScriptContext
//!   ├── registry/    named handlers, case-insensitive lookup
//!   └── dispatcher/  notification loop, flush, result delivery
//! ```
//!
//! The host never holds a reference into the sandbox beyond the
//! [`ScriptContext`] seam: everything crosses as evaluated text, results
//! come back as JSON strings, and result delivery embeds its JSON in a
//! single-quoted script literal via the escape codec in `jsbridge-core`.

pub mod context;
pub mod dispatcher;
pub mod registry;

pub use context::{InstallError, LocalScriptContext, ScriptContext, ScriptContextError};
pub use dispatcher::{delivery_script, Dispatcher, FlushError, FETCH_QUEUE_SCRIPT};
pub use registry::{Handler, HandlerArgs, HandlerRegistry};
