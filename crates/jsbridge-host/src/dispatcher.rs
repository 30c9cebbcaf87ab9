//! The host-side dispatcher: notification loop, flush, and result delivery.
//!
//! One flush is one drain-and-dispatch cycle, triggered by a single notify
//! token.  Messages are processed strictly in the order they were drained,
//! each fully resolved — handler invoked, result delivered — before the next
//! begins, so response delivery order always matches call order.
//!
//! Failure boundaries, from widest to narrowest:
//!
//! - an unrecognized token on the shared channel is ignored;
//! - a failed flush (fetch error, malformed queue JSON) is logged and the
//!   loop continues with the next notification;
//! - a failed message (unknown handler, handler error) is reported to its
//!   caller as a sanitized error payload and never affects later messages;
//! - a failed delivery is suppressed and logged — there is no way to retry
//!   into a script context that may already be gone.

use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, warn};

use jsbridge_core::{
    escape_script_literal, is_bridge_notification, ErrorPayload, InboundResult, OutboundMessage,
};

use crate::context::{ScriptContext, ScriptContextError};
use crate::registry::{HandlerArgs, HandlerRegistry};

// ── Script entry points ───────────────────────────────────────────────────────

/// Expression the host evaluates to drain the outbound queue.
pub const FETCH_QUEUE_SCRIPT: &str = "JavaScriptBridge.fetchQueue()";

/// Delivery command text surrounding the escaped result JSON.
pub(crate) const DELIVERY_PREFIX: &str = "JavaScriptBridge.handleNativeMessage('";
pub(crate) const DELIVERY_SUFFIX: &str = "')";

/// Builds the delivery command for one result.
///
/// This is the single point where a value crosses into "text to be evaluated
/// as code": the JSON is escaped here, with the codec's explicit table, and
/// nowhere else.
///
/// # Errors
///
/// Returns the serialization error if the result cannot be rendered as JSON
/// (not expected for values that came through the wire types).
pub fn delivery_script(result: &InboundResult) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(result)?;
    Ok(format!(
        "{}{}{}",
        DELIVERY_PREFIX,
        escape_script_literal(&json),
        DELIVERY_SUFFIX
    ))
}

// ── Error type ────────────────────────────────────────────────────────────────

/// Failure of one complete flush cycle.
///
/// Per-message failures are not represented here — they are delivered to the
/// individual callers and never abort the cycle.
#[derive(Debug, Error)]
pub enum FlushError {
    /// The queue could not be fetched from the script context.
    #[error("failed to fetch the outbound queue: {0}")]
    Fetch(#[from] ScriptContextError),

    /// The fetched text was not a JSON array of bridge messages.
    #[error("outbound queue was not a message array: {0}")]
    MalformedQueue(#[from] serde_json::Error),
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Routes drained messages to registered handlers and delivers results.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use jsbridge_host::{Dispatcher, HandlerArgs, HandlerRegistry, LocalScriptContext};
/// use jsbridge_script::{notify_channel, ScriptBridge};
///
/// # async fn example() {
/// let (sink, notifications) = notify_channel();
/// let bridge = Arc::new(ScriptBridge::new(sink));
///
/// let mut registry = HandlerRegistry::new();
/// registry.register("echo", |args: HandlerArgs| Ok(args.raw().clone()));
///
/// let context = LocalScriptContext::with_bridge(Arc::clone(&bridge));
/// let dispatcher = Dispatcher::new(context, registry);
/// tokio::spawn(dispatcher.run(notifications));
/// # }
/// ```
pub struct Dispatcher<C: ScriptContext> {
    context: C,
    registry: HandlerRegistry,
}

impl<C: ScriptContext> Dispatcher<C> {
    /// Creates a dispatcher over a script context and a populated registry.
    pub fn new(context: C, registry: HandlerRegistry) -> Self {
        Self { context, registry }
    }

    /// Consumes the notification channel until it closes.
    ///
    /// Each recognized token triggers one [`flush`](Self::flush); tokens
    /// from other producers sharing the channel are ignored.  The caller
    /// that emitted a token is never waited on — by the time the flush runs,
    /// the script side has long since moved on.
    pub async fn run(self, mut notifications: UnboundedReceiver<String>) {
        while let Some(token) = notifications.recv().await {
            if !is_bridge_notification(&token) {
                debug!(%token, "ignoring non-bridge notification on shared channel");
                continue;
            }
            match self.flush().await {
                Ok(count) => debug!("flush complete, {count} message(s) processed"),
                Err(e) => warn!("flush failed: {e}"),
            }
        }
        debug!("notification channel closed; dispatcher stopping");
    }

    /// Runs one drain-and-dispatch cycle.
    ///
    /// Returns the number of messages processed.  A message enqueued on the
    /// script side after the drain has happened is not part of this cycle;
    /// its own notification brings it into the next one.
    pub async fn flush(&self) -> Result<usize, FlushError> {
        let raw = self.context.eval(FETCH_QUEUE_SCRIPT).await?;
        let messages: Vec<OutboundMessage> = serde_json::from_str(&raw)?;
        debug!("retrieved {} message(s)", messages.len());

        let count = messages.len();
        for message in messages {
            self.process_message(message).await;
        }
        Ok(count)
    }

    /// Handles one drained message: lookup, invoke, deliver.
    async fn process_message(&self, message: OutboundMessage) {
        let OutboundMessage {
            handler,
            data,
            callback_id,
        } = message;

        // A message without a handler is a plain notification.
        let Some(handler_name) = handler else {
            debug!("plain notification received; no dispatch, no reply");
            return;
        };

        let outcome = match self.registry.lookup(&handler_name) {
            None => {
                warn!("no handler registered for '{handler_name}'");
                Err(ErrorPayload::new(format!("{handler_name} not supported.")))
            }
            Some(handler) => match handler.invoke(HandlerArgs::new(data)) {
                Ok(value) => Ok(value),
                Err(e) => {
                    // Log the full chain host-side; only the top-level
                    // message crosses the boundary.
                    warn!("error while processing '{handler_name}': {e:#}");
                    Err(ErrorPayload::from_error(&e))
                }
            },
        };

        // No callback id: the caller did not ask for the result.
        let Some(callback_id) = callback_id else {
            return;
        };

        let result = match outcome {
            Ok(value) => InboundResult::success(callback_id, value),
            Err(payload) => InboundResult::failure(callback_id, payload),
        };
        self.deliver(result).await;
    }

    /// Pushes one result back into the script context, best-effort.
    async fn deliver(&self, result: InboundResult) {
        let script = match delivery_script(&result) {
            Ok(script) => script,
            Err(e) => {
                error!(callback_id = %result.callback_id, "failed to serialize result: {e}");
                return;
            }
        };
        if let Err(e) = self.context.eval(&script).await {
            warn!(callback_id = %result.callback_id, "failed to deliver result: {e}");
        }
    }

    /// The registry this dispatcher routes through.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
