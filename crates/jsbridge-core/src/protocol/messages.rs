//! Wire message types for the JavaScript bridge protocol.
//!
//! The script side and the host side exchange camelCase JSON.  Absent fields
//! are omitted entirely rather than serialized as `null`, so a
//! fire-and-forget notification is just `{"data":…}` and a successful result
//! is `{"callbackId":"…","responseData":…}`.
//!
//! # Message flow
//!
//! ```text
//! Script → Host:  queued OutboundMessage values, drained as one JSON array
//! Host → Script:  one InboundResult per answered call, delivered by eval
//! ```
//!
//! # Canonical schema
//!
//! The field names are fixed: `handler`, `data`, `callbackId` outbound and
//! `callbackId`, `responseData`, `errorData` inbound.  Historical spellings
//! (`callback`, `response`) and string-wrapped handler data are not accepted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ── Protocol constants ────────────────────────────────────────────────────────

/// Name of the global object the bridge installs into the script context.
///
/// The host reaches the script side exclusively through entry points on this
/// object (`fetchQueue`, `handleNativeMessage`).
pub const SCRIPT_GLOBAL: &str = "JavaScriptBridge";

/// Component tag placed in [`ErrorPayload::source`] for host-originated
/// failures.
pub const ERROR_SOURCE: &str = "JavaScriptBridge";

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors that can occur while decoding bridge wire data.
///
/// These are per-message failures: a malformed entry is skipped and logged by
/// the caller, never allowed to corrupt bridge state or abort a flush.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The text was not valid JSON or did not match the expected shape.
    #[error("malformed bridge message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// An inbound result arrived without a usable correlation id.
    #[error("inbound result carries an empty callback id")]
    EmptyCallbackId,
}

// ── Script → Host ─────────────────────────────────────────────────────────────

/// One entry in the script side's outbound queue.
///
/// Three shapes are meaningful:
///
/// | `handler` | `callbackId` | Meaning                                  |
/// |-----------|--------------|------------------------------------------|
/// | absent    | absent       | fire-and-forget notification (`send`)    |
/// | present   | present      | host handler call expecting a response   |
/// | present   | absent       | host handler call, response discarded    |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Name of the host handler to invoke.  Absent for plain notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    /// Arguments for the handler, as raw JSON (object or array).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Correlation id pairing this call with its eventual result.
    /// Present only when the caller expects a response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
}

impl OutboundMessage {
    /// Builds a fire-and-forget notification (no handler, no callback).
    pub fn notification(data: Option<Value>) -> Self {
        Self {
            handler: None,
            data,
            callback_id: None,
        }
    }

    /// Builds a host handler call that expects a response.
    pub fn call(handler: impl Into<String>, data: Option<Value>, callback_id: String) -> Self {
        Self {
            handler: Some(handler.into()),
            data,
            callback_id: Some(callback_id),
        }
    }

    /// `true` when this message names a host handler.
    pub fn is_call(&self) -> bool {
        self.handler.is_some()
    }

    /// `true` when the caller registered a callback for this message.
    pub fn expects_response(&self) -> bool {
        self.callback_id.is_some()
    }
}

// ── Host → Script ─────────────────────────────────────────────────────────────

/// The host's answer to one outbound call, delivered into the script context.
///
/// Exactly one of `response_data` / `error_data` is meaningful: the presence
/// of `error_data` indicates failure and takes precedence on the script side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundResult {
    /// Correlation id copied from the originating [`OutboundMessage`].
    pub callback_id: String,

    /// Handler return value on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_data: Option<Value>,

    /// Sanitized failure description when the call did not succeed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_data: Option<ErrorPayload>,
}

impl InboundResult {
    /// Builds a successful result.
    pub fn success(callback_id: String, response_data: Value) -> Self {
        Self {
            callback_id,
            response_data: Some(response_data),
            error_data: None,
        }
    }

    /// Builds a failed result.
    pub fn failure(callback_id: String, error_data: ErrorPayload) -> Self {
        Self {
            callback_id,
            response_data: None,
            error_data: Some(error_data),
        }
    }

    /// Parses and validates one result from its JSON text.
    ///
    /// Validation happens before the script side mutates any state: a result
    /// that fails here must leave the pending-callback table untouched.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::Malformed`] for invalid JSON or shape,
    /// [`ProtocolError::EmptyCallbackId`] for a result that could never be
    /// correlated with a pending call.
    pub fn parse(json: &str) -> Result<Self, ProtocolError> {
        let result: Self = serde_json::from_str(json)?;
        if result.callback_id.is_empty() {
            return Err(ProtocolError::EmptyCallbackId);
        }
        Ok(result)
    }

    /// `true` when this result carries an error payload.
    pub fn is_error(&self) -> bool {
        self.error_data.is_some()
    }
}

// ── Error payload ─────────────────────────────────────────────────────────────

/// A host failure as seen by script code: message text plus an optional
/// source tag, nothing else.
///
/// Host exceptions are reduced to their top-level message before crossing the
/// boundary.  Error types, chains, and backtraces stay on the host side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    /// Human-readable failure description.
    pub message: String,

    /// Component that produced the failure, normally [`ERROR_SOURCE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ErrorPayload {
    /// Builds a payload tagged with the bridge's component source.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: Some(ERROR_SOURCE.to_string()),
        }
    }

    /// Sanitizes an arbitrary host error down to its display message.
    pub fn from_error(err: &dyn std::fmt::Display) -> Self {
        Self::new(err.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
