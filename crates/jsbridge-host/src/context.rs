//! The script-context seam and its in-process implementation.
//!
//! The host can do exactly one thing to the sandbox: evaluate script text
//! and read back the result as a JSON string.  [`ScriptContext`] captures
//! that single capability; the dispatcher is generic over it and never
//! learns what sits behind the seam (a real embedded web view, or the
//! in-process emulation below).
//!
//! [`LocalScriptContext`] stands in for the script engine when both halves
//! run in one process — in tests and in the demo embedding.  It interprets
//! the two entry points the host is allowed to evaluate: the queue fetch and
//! the result delivery, including the literal unescaping a real engine's
//! parser would perform.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use thiserror::Error;

use jsbridge_core::unescape_script_literal;
use jsbridge_script::ScriptBridge;

use crate::dispatcher::{DELIVERY_PREFIX, DELIVERY_SUFFIX, FETCH_QUEUE_SCRIPT};

// ── Error types ───────────────────────────────────────────────────────────────

/// Failure to evaluate script text inside the sandbox.
///
/// Every variant is recoverable from the dispatcher's point of view: a
/// failed fetch fails that one flush, a failed delivery is suppressed and
/// logged (there is no way to retry into a possibly-torn-down context).
#[derive(Debug, Error)]
pub enum ScriptContextError {
    /// The context exists but no bridge is installed in it.
    #[error("no bridge is installed in the script context")]
    BridgeNotInstalled,

    /// Evaluation itself failed (unknown entry point, engine gone, …).
    #[error("script evaluation failed: {0}")]
    Eval(String),
}

/// Failure to install the bridge into a context.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The context already has a bridge; re-initialization is forbidden.
    #[error("a bridge is already installed in this script context")]
    AlreadyInstalled,
}

// ── The seam ──────────────────────────────────────────────────────────────────

/// The host's only capability against the sandbox: evaluate script text.
///
/// Implementations return whatever the evaluated expression produced,
/// serialized as a JSON string (an empty string when there is no result).
pub trait ScriptContext: Send + Sync {
    /// Evaluates `script` inside the context.
    fn eval(&self, script: &str)
        -> impl Future<Output = Result<String, ScriptContextError>> + Send;
}

// ── In-process implementation ─────────────────────────────────────────────────

/// In-process stand-in for the script engine's eval surface.
///
/// Exactly one bridge can ever be installed; a second installation is
/// rejected rather than silently replacing the queue and callback table out
/// from under suspended callers.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use jsbridge_host::LocalScriptContext;
/// use jsbridge_script::{notify_channel, ScriptBridge};
///
/// let (sink, _notifications) = notify_channel();
/// let bridge = Arc::new(ScriptBridge::new(sink));
/// let context = LocalScriptContext::new();
/// context.install(Arc::clone(&bridge)).expect("first install");
/// assert!(context.install(bridge).is_err());
/// ```
#[derive(Default)]
pub struct LocalScriptContext {
    bridge: OnceLock<Arc<ScriptBridge>>,
}

impl LocalScriptContext {
    /// Creates a context with no bridge installed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with `bridge` already installed.
    pub fn with_bridge(bridge: Arc<ScriptBridge>) -> Self {
        let context = Self::new();
        // A fresh OnceLock cannot already be set.
        let _ = context.bridge.set(bridge);
        context
    }

    /// Installs the bridge, failing if one is already present.
    pub fn install(&self, bridge: Arc<ScriptBridge>) -> Result<(), InstallError> {
        self.bridge
            .set(bridge)
            .map_err(|_| InstallError::AlreadyInstalled)
    }

    /// `true` once a bridge has been installed.
    pub fn is_installed(&self) -> bool {
        self.bridge.get().is_some()
    }

    fn bridge(&self) -> Result<&Arc<ScriptBridge>, ScriptContextError> {
        self.bridge
            .get()
            .ok_or(ScriptContextError::BridgeNotInstalled)
    }
}

impl ScriptContext for LocalScriptContext {
    async fn eval(&self, script: &str) -> Result<String, ScriptContextError> {
        // Queue fetch: the engine would stringify the returned array; we do
        // the same so the dispatcher sees exactly the wire-level JSON text.
        if script == FETCH_QUEUE_SCRIPT {
            let queue = self.bridge()?.fetch_queue().await;
            return serde_json::to_string(&queue)
                .map_err(|e| ScriptContextError::Eval(e.to_string()));
        }

        // Result delivery: undo the string-literal escaping (the engine's
        // parser would) and hand the JSON to the bridge.
        if let Some(literal) = script
            .strip_prefix(DELIVERY_PREFIX)
            .and_then(|rest| rest.strip_suffix(DELIVERY_SUFFIX))
        {
            let result_json = unescape_script_literal(literal);
            self.bridge()?.handle_native_message(&result_json).await;
            return Ok(String::new());
        }

        Err(ScriptContextError::Eval(format!(
            "unknown entry point: {script}"
        )))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
