//! The cross-boundary notify token and its recognition rule.
//!
//! The script side cannot call into the host directly; it can only emit an
//! opaque string on a one-way notification channel that other components may
//! share.  The bridge claims exactly one token shape on that channel and
//! ignores everything else.

/// Token emitted by the script side whenever the outbound queue gains a
/// message.  The payload carries no information beyond "bridge traffic".
pub const QUEUE_MESSAGE_TOKEN: &str = "jsbridge://queue_message";

/// Scheme prefix a token must start with to be considered bridge traffic.
const NOTIFY_SCHEME: &str = "jsbridge";

/// Marker substring a token must additionally contain.
const QUEUE_MARKER: &str = "queue_message";

/// Returns `true` when `message` is a bridge queue notification.
///
/// Both checks are case-insensitive: the token must start with the
/// `jsbridge` scheme AND contain the `queue_message` marker.  Anything else
/// on the shared channel belongs to someone else and is ignored.
///
/// # Examples
///
/// ```rust
/// use jsbridge_core::{is_bridge_notification, QUEUE_MESSAGE_TOKEN};
///
/// assert!(is_bridge_notification(QUEUE_MESSAGE_TOKEN));
/// assert!(!is_bridge_notification("app://something_else"));
/// ```
pub fn is_bridge_notification(message: &str) -> bool {
    if message.is_empty() {
        return false;
    }
    let lowered = message.to_ascii_lowercase();
    lowered.starts_with(NOTIFY_SCHEME) && lowered.contains(QUEUE_MARKER)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_token_is_recognized() {
        assert!(is_bridge_notification(QUEUE_MESSAGE_TOKEN));
    }

    #[test]
    fn test_recognition_is_case_insensitive() {
        assert!(is_bridge_notification("JSBridge://Queue_Message"));
        assert!(is_bridge_notification("JSBRIDGE://QUEUE_MESSAGE"));
    }

    #[test]
    fn test_unrelated_scheme_is_rejected() {
        assert!(!is_bridge_notification("app://queue_message"));
        assert!(!is_bridge_notification("https://example.com"));
    }

    #[test]
    fn test_missing_marker_is_rejected() {
        assert!(!is_bridge_notification("jsbridge://ready"));
        assert!(!is_bridge_notification("jsbridge://"));
    }

    #[test]
    fn test_marker_without_scheme_prefix_is_rejected() {
        // The scheme must be a prefix, not merely present somewhere.
        assert!(!is_bridge_notification("notify jsbridge queue_message"));
    }

    #[test]
    fn test_empty_message_is_rejected() {
        assert!(!is_bridge_notification(""));
    }
}
