//! # jsbridge-core
//!
//! Shared protocol vocabulary for the WebView JavaScript bridge: the wire
//! message types, correlation-id generation, the script-literal escape codec,
//! and the notify-token recognition rule.
//!
//! This crate is used by both halves of the bridge.  It has zero dependencies
//! on async runtimes, UI frameworks, or any concrete transport.
//!
//! # Architecture overview
//!
//! The bridge connects a sandboxed script environment (no direct host-API
//! access) with a privileged host that exposes named callable handlers.  The
//! two halves never share memory; everything crosses the boundary as text:
//!
//! - **Outbound** (script → host): the script side queues
//!   [`OutboundMessage`] values; the host drains the queue as one JSON array.
//! - **Inbound** (host → script): the host delivers one [`InboundResult`]
//!   per call, embedded as a single-quoted string literal inside a script
//!   evaluation — which is why the [`protocol::escape`] codec exists.
//! - **Notify** (script → host): an opaque token string on a shared one-way
//!   channel tells the host that the queue is non-empty
//!   ([`protocol::notify`]).
//!
//! Calls and results are paired by a correlation id
//! ([`protocol::correlation`]), unique within a bridge lifetime.

pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `jsbridge_core::OutboundMessage` instead of the full module path.
pub use protocol::correlation::{CallbackIdGenerator, CorrelationCounter};
pub use protocol::escape::{escape_script_literal, unescape_script_literal};
pub use protocol::messages::{ErrorPayload, InboundResult, OutboundMessage, ProtocolError};
pub use protocol::notify::{is_bridge_notification, QUEUE_MESSAGE_TOKEN};
