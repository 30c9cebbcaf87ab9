//! jsbridge-script library crate.
//!
//! The script-side half of the WebView JavaScript bridge: the code that would
//! live inside the sandboxed script context.  It owns the outbound message
//! queue and the pending-callback table, and exposes the four-entry surface
//! script code programs against:
//!
//! - `send(data)` — fire-and-forget notification to the host
//! - `call_native(handler, data)` — awaitable call into a named host handler
//! - `fetch_queue()` — atomic drain, invoked from the host side only
//! - `handle_native_message(json)` — result delivery, invoked from the host
//!
//! The script side never calls the host directly.  Its only outward channel
//! is the opaque notify token emitted through a [`notify::NotifySink`]; the
//! host's only way in is evaluating the fetch/delivery entry points.

pub mod bridge;
pub mod notify;

pub use bridge::{CallError, ScriptBridge};
pub use notify::{notify_channel, NotifySink};
