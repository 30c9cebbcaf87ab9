//! Correlation-id generation for pairing outbound calls with inbound results.
//!
//! Every call that expects a response carries a correlation id of the form
//! `cb_<counter>_<unix-millis>`.  The counter alone guarantees uniqueness
//! within one bridge lifetime; the timestamp additionally distinguishes ids
//! across bridge reloads, so a result produced for a previous incarnation of
//! the script context can never resolve a callback in the current one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// A thread-safe, monotonically increasing counter for correlation ids.
///
/// The first call to [`next`](Self::next) returns 1, matching the script
/// side's historical numbering.  The counter wraps around at `u64::MAX`
/// without panicking.
pub struct CorrelationCounter {
    inner: AtomicU64,
}

impl CorrelationCounter {
    /// Creates a new counter whose first value is 1.
    pub fn new() -> Self {
        Self {
            inner: AtomicU64::new(1),
        }
    }

    /// Returns the next counter value and atomically increments.
    ///
    /// # Atomic ordering
    ///
    /// `Ordering::Relaxed` is sufficient: the value is only used to number
    /// ids, not to synchronise memory between threads.
    pub fn next(&self) -> u64 {
        self.inner.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the current value without incrementing.
    pub fn current(&self) -> u64 {
        self.inner.load(Ordering::Relaxed)
    }
}

impl Default for CorrelationCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates `cb_<counter>_<millis>` correlation ids.
///
/// # Examples
///
/// ```rust
/// use jsbridge_core::CallbackIdGenerator;
///
/// let ids = CallbackIdGenerator::new();
/// let first = ids.next_id();
/// let second = ids.next_id();
/// assert!(first.starts_with("cb_1_"));
/// assert_ne!(first, second);
/// ```
#[derive(Default)]
pub struct CallbackIdGenerator {
    counter: CorrelationCounter,
}

impl CallbackIdGenerator {
    /// Creates a generator whose first id carries counter value 1.
    pub fn new() -> Self {
        Self {
            counter: CorrelationCounter::new(),
        }
    }

    /// Returns a fresh correlation id, never repeated by this generator.
    pub fn next_id(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        format!("cb_{}_{}", self.counter.next(), millis)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
