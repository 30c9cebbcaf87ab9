//! The script-side bridge: queue, pending callbacks, and the call surface.
//!
//! One [`ScriptBridge`] instance exists per script context.  It is an
//! explicit object owned by whichever component holds the context — there is
//! no ambient global singleton, and installing it into a context twice is
//! rejected by the context (see `LocalScriptContext` in `jsbridge-host`).
//!
//! # Ownership and locking
//!
//! The outbound queue and the pending-callback table live behind a single
//! async mutex.  The lock is held only across plain in-memory mutation,
//! never across an `.await`, so enqueue order is exactly drain order and a
//! drain can never observe a half-applied enqueue.
//!
//! # Callback lifecycle
//!
//! `call_native` registers a oneshot sender under a fresh correlation id and
//! suspends on the receiver.  Delivery through [`handle_native_message`]
//! removes the entry and completes the oneshot, which wakes the caller on a
//! later scheduler tick — resolution never runs synchronously inside the
//! delivery call.  A result that never arrives leaves the caller suspended
//! forever; the bridge has no timeout machinery by design.
//!
//! [`handle_native_message`]: ScriptBridge::handle_native_message

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};

use jsbridge_core::{CallbackIdGenerator, ErrorPayload, InboundResult, OutboundMessage};

use crate::notify::NotifySink;

// ── Error type ────────────────────────────────────────────────────────────────

/// Failure of a single `call_native` round trip.
#[derive(Debug, Error)]
pub enum CallError {
    /// The host delivered an error result for this call.  Displays as the
    /// sanitized message text, which is all the information that survives
    /// the boundary.
    #[error("{}", .0.message)]
    Rejected(ErrorPayload),

    /// The bridge was dropped while this call was still pending.
    #[error("bridge was torn down before the result arrived")]
    BridgeClosed,
}

impl CallError {
    /// The error payload for the rejection, or one synthesized from the
    /// error's own message for teardown.
    pub fn into_payload(self) -> ErrorPayload {
        match self {
            CallError::Rejected(payload) => payload,
            other => ErrorPayload::new(other.to_string()),
        }
    }
}

/// What delivery hands to a suspended caller.
type CallOutcome = Result<Value, ErrorPayload>;

// ── Bridge state ──────────────────────────────────────────────────────────────

/// Queue and callback table, mutated only under the bridge lock.
#[derive(Default)]
struct BridgeState {
    /// Outbound messages awaiting the next drain, in enqueue order.
    queue: Vec<OutboundMessage>,
    /// Suspended callers by correlation id.  An entry is removed the instant
    /// its result is delivered.
    pending: HashMap<String, oneshot::Sender<CallOutcome>>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// The script-side half of the bridge.
///
/// # Example
///
/// ```no_run
/// use jsbridge_script::{notify_channel, ScriptBridge};
/// use serde_json::json;
///
/// # async fn example() {
/// let (sink, _notifications) = notify_channel();
/// let bridge = ScriptBridge::new(sink);
///
/// // Fire-and-forget: queued, no response ever.
/// bridge.send(json!({"event": "pageReady"})).await;
///
/// // Awaitable call: suspends until the host delivers the result.
/// let product = bridge.call_native("getProduct", json!(["Apple"])).await;
/// # let _ = product;
/// # }
/// ```
pub struct ScriptBridge {
    state: Mutex<BridgeState>,
    ids: CallbackIdGenerator,
    notify: NotifySink,
}

impl ScriptBridge {
    /// Creates a bridge that signals queued messages through `notify`.
    pub fn new(notify: NotifySink) -> Self {
        Self {
            state: Mutex::new(BridgeState::default()),
            ids: CallbackIdGenerator::new(),
            notify,
        }
    }

    /// Enqueues a fire-and-forget notification.
    ///
    /// No handler is named and no callback is registered: the host will see
    /// the message on the next flush and produce no reply for it.  Returns
    /// as soon as the message is queued.
    pub async fn send(&self, data: Value) {
        {
            let mut state = self.state.lock().await;
            state.queue.push(OutboundMessage::notification(normalize(data)));
        }
        self.notify.queue_message();
    }

    /// Calls the named host handler and suspends until its result arrives.
    ///
    /// The suspension spans one full round trip: enqueue, cross-boundary
    /// notify, host flush, cross-boundary delivery.  Pass `Value::Null` for
    /// a handler that takes no arguments.
    ///
    /// # Errors
    ///
    /// [`CallError::Rejected`] with the sanitized message when the host
    /// reports failure (unknown handler, handler error);
    /// [`CallError::BridgeClosed`] if the bridge is torn down mid-flight.
    pub async fn call_native(&self, handler: &str, data: Value) -> Result<Value, CallError> {
        let rx = self.enqueue_call(handler, data).await;
        match rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(CallError::Rejected(payload)),
            Err(_) => Err(CallError::BridgeClosed),
        }
    }

    /// Callback-style variant of [`call_native`](Self::call_native).
    ///
    /// Sugar over the awaitable path — the round trip is identical; the
    /// callbacks run on a spawned task once the result arrives.
    pub fn call_native_with_callbacks<S, F>(
        self: Arc<Self>,
        handler: &str,
        data: Value,
        on_success: S,
        on_failure: F,
    ) where
        S: FnOnce(Value) + Send + 'static,
        F: FnOnce(ErrorPayload) + Send + 'static,
    {
        let bridge = self;
        let handler = handler.to_string();
        tokio::spawn(async move {
            match bridge.call_native(&handler, data).await {
                Ok(value) => on_success(value),
                Err(err) => on_failure(err.into_payload()),
            }
        });
    }

    /// Atomically drains the outbound queue.
    ///
    /// The queue is swapped for an empty one in a single step under the
    /// lock: every message is drained exactly once, and a message enqueued
    /// while a drain is in progress lands in the next one.  Safe to call
    /// only from the host side of the boundary.
    pub async fn fetch_queue(&self) -> Vec<OutboundMessage> {
        mem::take(&mut self.state.lock().await.queue)
    }

    /// Delivers one host result into the bridge.
    ///
    /// The text is validated as a whole before any state changes; a
    /// malformed delivery is logged and dropped without touching the
    /// callback table.  A result for an unknown or already-resolved id is a
    /// silent no-op (the host may legitimately deliver late or twice).
    pub async fn handle_native_message(&self, result_json: &str) {
        let result = match InboundResult::parse(result_json) {
            Ok(result) => result,
            Err(e) => {
                warn!("discarding malformed native message: {e}");
                return;
            }
        };

        let sender = self.state.lock().await.pending.remove(&result.callback_id);
        let Some(sender) = sender else {
            debug!(
                callback_id = %result.callback_id,
                "no pending callback for result (already resolved or unknown id)"
            );
            return;
        };

        // errorData presence wins over responseData, per the wire contract.
        let outcome = match result.error_data {
            Some(payload) => Err(payload),
            None => Ok(result.response_data.unwrap_or(Value::Null)),
        };

        if sender.send(outcome).is_err() {
            // The caller dropped its future; nobody is listening any more.
            debug!(callback_id = %result.callback_id, "caller abandoned call before delivery");
        }
    }

    /// Number of calls still waiting for a result.  Diagnostic only.
    pub async fn pending_count(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    /// Number of messages queued for the next drain.  Diagnostic only.
    pub async fn queued_count(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    /// Registers the pending callback and queues the call message.
    async fn enqueue_call(&self, handler: &str, data: Value) -> oneshot::Receiver<CallOutcome> {
        let callback_id = self.ids.next_id();
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.lock().await;
            state.pending.insert(callback_id.clone(), tx);
            state
                .queue
                .push(OutboundMessage::call(handler, normalize(data), callback_id));
        }
        self.notify.queue_message();
        rx
    }
}

/// Treats a JSON `null` argument as "no data" so the wire message omits the
/// field entirely.
fn normalize(data: Value) -> Option<Value> {
    if data.is_null() {
        None
    } else {
        Some(data)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::notify_channel;
    use jsbridge_core::QUEUE_MESSAGE_TOKEN;
    use serde_json::json;

    fn test_bridge() -> (Arc<ScriptBridge>, tokio::sync::mpsc::UnboundedReceiver<String>) {
        let (sink, rx) = notify_channel();
        (Arc::new(ScriptBridge::new(sink)), rx)
    }

    // ── Queue semantics ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_send_enqueues_notification_without_callback_id() {
        let (bridge, _rx) = test_bridge();

        bridge.send(json!({"x": 1})).await;

        let drained = bridge.fetch_queue().await;
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].handler, None);
        assert_eq!(drained[0].callback_id, None);
        assert_eq!(drained[0].data, Some(json!({"x": 1})));
    }

    #[tokio::test]
    async fn test_send_emits_notify_token() {
        let (bridge, mut rx) = test_bridge();

        bridge.send(json!(1)).await;

        assert_eq!(rx.recv().await.as_deref(), Some(QUEUE_MESSAGE_TOKEN));
    }

    #[tokio::test]
    async fn test_null_data_is_omitted_from_the_message() {
        let (bridge, _rx) = test_bridge();

        bridge.send(json!(null)).await;

        let drained = bridge.fetch_queue().await;
        assert_eq!(drained[0].data, None);
    }

    #[tokio::test]
    async fn test_fetch_queue_drains_in_enqueue_order_exactly_once() {
        let (bridge, _rx) = test_bridge();
        for i in 0..5 {
            bridge.send(json!(i)).await;
        }

        let first = bridge.fetch_queue().await;
        let second = bridge.fetch_queue().await;

        let values: Vec<_> = first.iter().map(|m| m.data.clone().unwrap()).collect();
        assert_eq!(values, vec![json!(0), json!(1), json!(2), json!(3), json!(4)]);
        assert!(second.is_empty(), "a second drain must find nothing");
    }

    #[tokio::test]
    async fn test_concurrent_producers_lose_nothing() {
        let (bridge, _rx) = test_bridge();
        let tasks: Vec<_> = (0..8)
            .map(|t| {
                let b = Arc::clone(&bridge);
                tokio::spawn(async move {
                    for i in 0..50 {
                        b.send(json!(t * 100 + i)).await;
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let mut values: Vec<i64> = bridge
            .fetch_queue()
            .await
            .into_iter()
            .map(|m| m.data.unwrap().as_i64().unwrap())
            .collect();

        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), 400, "no message may be lost or duplicated");
    }

    // ── Call lifecycle ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_call_native_registers_pending_callback_and_queues_call() {
        let (bridge, _rx) = test_bridge();
        let b = Arc::clone(&bridge);
        let call = tokio::spawn(async move { b.call_native("echo", json!({"x": 1})).await });

        // Yield until the call task has enqueued its message.
        while bridge.queued_count().await == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(bridge.pending_count().await, 1);
        let drained = bridge.fetch_queue().await;
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].handler.as_deref(), Some("echo"));
        assert!(drained[0].callback_id.as_deref().unwrap().starts_with("cb_1_"));
        call.abort();
    }

    #[tokio::test]
    async fn test_delivery_resolves_suspended_caller() {
        let (bridge, _rx) = test_bridge();
        let b = Arc::clone(&bridge);
        let call = tokio::spawn(async move { b.call_native("echo", json!(7)).await });

        while bridge.queued_count().await == 0 {
            tokio::task::yield_now().await;
        }
        let message = bridge.fetch_queue().await.remove(0);
        let id = message.callback_id.unwrap();
        bridge
            .handle_native_message(&format!(
                r#"{{"callbackId":"{id}","responseData":{{"echoed":7}}}}"#
            ))
            .await;

        let outcome = call.await.unwrap();
        assert_eq!(outcome.unwrap(), json!({"echoed": 7}));
        assert_eq!(bridge.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_error_delivery_rejects_with_message_text() {
        let (bridge, _rx) = test_bridge();
        let b = Arc::clone(&bridge);
        let call = tokio::spawn(async move { b.call_native("missing", json!(null)).await });

        while bridge.queued_count().await == 0 {
            tokio::task::yield_now().await;
        }
        let id = bridge.fetch_queue().await.remove(0).callback_id.unwrap();
        bridge
            .handle_native_message(&format!(
                r#"{{"callbackId":"{id}","errorData":{{"message":"missing not supported."}}}}"#
            ))
            .await;

        let err = call.await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "missing not supported.");
        assert!(matches!(err, CallError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_result_without_response_data_resolves_to_null() {
        let (bridge, _rx) = test_bridge();
        let b = Arc::clone(&bridge);
        let call = tokio::spawn(async move { b.call_native("fireOnly", json!(null)).await });

        while bridge.queued_count().await == 0 {
            tokio::task::yield_now().await;
        }
        let id = bridge.fetch_queue().await.remove(0).callback_id.unwrap();
        bridge
            .handle_native_message(&format!(r#"{{"callbackId":"{id}"}}"#))
            .await;

        assert_eq!(call.await.unwrap().unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_duplicate_delivery_is_a_no_op() {
        let (bridge, _rx) = test_bridge();
        let b = Arc::clone(&bridge);
        let call = tokio::spawn(async move { b.call_native("echo", json!(1)).await });

        while bridge.queued_count().await == 0 {
            tokio::task::yield_now().await;
        }
        let id = bridge.fetch_queue().await.remove(0).callback_id.unwrap();
        let first = format!(r#"{{"callbackId":"{id}","responseData":1}}"#);
        let second = format!(r#"{{"callbackId":"{id}","responseData":2}}"#);
        bridge.handle_native_message(&first).await;
        bridge.handle_native_message(&second).await;

        // Exactly one resolution, with the first delivery's value.
        assert_eq!(call.await.unwrap().unwrap(), json!(1));
    }

    #[tokio::test]
    async fn test_unknown_callback_id_is_a_silent_no_op() {
        let (bridge, _rx) = test_bridge();

        bridge
            .handle_native_message(r#"{"callbackId":"cb_999_0","responseData":1}"#)
            .await;

        assert_eq!(bridge.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_malformed_delivery_leaves_pending_callbacks_untouched() {
        let (bridge, _rx) = test_bridge();
        let b = Arc::clone(&bridge);
        let call = tokio::spawn(async move { b.call_native("echo", json!(1)).await });
        while bridge.queued_count().await == 0 {
            tokio::task::yield_now().await;
        }
        let id = bridge.fetch_queue().await.remove(0).callback_id.unwrap();

        bridge.handle_native_message("{not json").await;
        bridge.handle_native_message(r#"{"responseData":1}"#).await;

        // The real delivery still works afterwards.
        assert_eq!(bridge.pending_count().await, 1);
        bridge
            .handle_native_message(&format!(r#"{{"callbackId":"{id}","responseData":"ok"}}"#))
            .await;
        assert_eq!(call.await.unwrap().unwrap(), json!("ok"));
    }

    #[tokio::test]
    async fn test_dropped_caller_makes_delivery_a_no_op() {
        let (bridge, _rx) = test_bridge();
        let b = Arc::clone(&bridge);
        let call = tokio::spawn(async move { b.call_native("echo", json!(1)).await });
        while bridge.queued_count().await == 0 {
            tokio::task::yield_now().await;
        }
        let id = bridge.fetch_queue().await.remove(0).callback_id.unwrap();

        call.abort();
        let _ = call.await;

        // Delivery for the abandoned call must not panic or disturb state.
        bridge
            .handle_native_message(&format!(r#"{{"callbackId":"{id}","responseData":1}}"#))
            .await;
        assert_eq!(bridge.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_callback_overload_invokes_success_path() {
        let (bridge, _rx) = test_bridge();
        let (done_tx, done_rx) = oneshot::channel();

        Arc::clone(&bridge).call_native_with_callbacks(
            "echo",
            json!({"x": 1}),
            move |value| {
                let _ = done_tx.send(value);
            },
            |_err| panic!("must not fail"),
        );

        while bridge.queued_count().await == 0 {
            tokio::task::yield_now().await;
        }
        let id = bridge.fetch_queue().await.remove(0).callback_id.unwrap();
        bridge
            .handle_native_message(&format!(r#"{{"callbackId":"{id}","responseData":{{"x":1}}}}"#))
            .await;

        assert_eq!(done_rx.await.unwrap(), json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_callback_overload_invokes_failure_path() {
        let (bridge, _rx) = test_bridge();
        let (done_tx, done_rx) = oneshot::channel();

        Arc::clone(&bridge).call_native_with_callbacks(
            "nope",
            json!(null),
            |_value| panic!("must not succeed"),
            move |payload| {
                let _ = done_tx.send(payload);
            },
        );

        while bridge.queued_count().await == 0 {
            tokio::task::yield_now().await;
        }
        let id = bridge.fetch_queue().await.remove(0).callback_id.unwrap();
        bridge
            .handle_native_message(&format!(
                r#"{{"callbackId":"{id}","errorData":{{"message":"nope not supported."}}}}"#
            ))
            .await;

        assert_eq!(done_rx.await.unwrap().message, "nope not supported.");
    }

    #[tokio::test]
    async fn test_enqueue_during_drain_lands_in_next_flush() {
        let (bridge, _rx) = test_bridge();
        bridge.send(json!("first")).await;

        let drained = bridge.fetch_queue().await;
        // Script code reacting to the first batch queues more work.
        bridge.send(json!("second")).await;

        assert_eq!(drained.len(), 1);
        let next = bridge.fetch_queue().await;
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].data, Some(json!("second")));
    }

    #[tokio::test]
    async fn test_correlation_ids_increase_across_calls() {
        let (bridge, _rx) = test_bridge();
        let b1 = Arc::clone(&bridge);
        let c1 = tokio::spawn(async move { b1.call_native("a", json!(null)).await });
        let b2 = Arc::clone(&bridge);
        let c2 = tokio::spawn(async move { b2.call_native("b", json!(null)).await });

        while bridge.queued_count().await < 2 {
            tokio::task::yield_now().await;
        }
        let drained = bridge.fetch_queue().await;
        let ids: Vec<_> = drained
            .iter()
            .map(|m| m.callback_id.clone().unwrap())
            .collect();

        assert_ne!(ids[0], ids[1]);
        c1.abort();
        c2.abort();
    }
}
