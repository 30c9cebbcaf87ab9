//! The script side's one-way notification channel to the host.
//!
//! Queuing a message must never block or suspend the script code that caused
//! it: the sink pushes the opaque token onto an unbounded channel and returns
//! immediately.  The host consumes the channel on its own loop (see the
//! dispatcher in `jsbridge-host`), so the two halves never wait on each
//! other here.
//!
//! The channel carries plain strings, not a bridge-specific type, because in
//! the real embedding the notification primitive is shared with unrelated
//! components.  The host filters with the recognition rule in
//! `jsbridge_core::protocol::notify`.

use jsbridge_core::QUEUE_MESSAGE_TOKEN;
use tokio::sync::mpsc;
use tracing::debug;

/// Creates a connected notify channel: the sink goes to the script bridge,
/// the receiver to the host-side dispatcher.
pub fn notify_channel() -> (NotifySink, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NotifySink::new(tx), rx)
}

/// Fire-and-forget sender for the bridge's queue notification token.
#[derive(Clone)]
pub struct NotifySink {
    tx: mpsc::UnboundedSender<String>,
}

impl NotifySink {
    /// Wraps an existing channel sender, e.g. one shared with other
    /// notification producers.
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    /// Signals the host that the outbound queue is non-empty.
    ///
    /// If the host side is gone the token is silently dropped; the queued
    /// messages simply wait for a host that never comes, which is the
    /// documented behavior for a torn-down boundary.
    pub fn queue_message(&self) {
        if self.tx.send(QUEUE_MESSAGE_TOKEN.to_string()).is_err() {
            debug!("notify channel closed; host side is gone");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use jsbridge_core::is_bridge_notification;

    #[tokio::test]
    async fn test_queue_message_delivers_recognizable_token() {
        let (sink, mut rx) = notify_channel();

        sink.queue_message();

        let token = rx.recv().await.expect("token must arrive");
        assert_eq!(token, QUEUE_MESSAGE_TOKEN);
        assert!(is_bridge_notification(&token));
    }

    #[tokio::test]
    async fn test_queue_message_with_closed_receiver_does_not_panic() {
        let (sink, rx) = notify_channel();
        drop(rx);

        // Must be a silent no-op.
        sink.queue_message();
    }

    #[tokio::test]
    async fn test_sink_can_be_cloned_and_both_deliver() {
        let (sink, mut rx) = notify_channel();
        let other = sink.clone();

        sink.queue_message();
        other.queue_message();

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());
    }
}
