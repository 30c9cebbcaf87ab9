//! Protocol module containing the wire message types, correlation ids, the
//! script-literal escape codec, and the notify-token recognition rule.

pub mod correlation;
pub mod escape;
pub mod messages;
pub mod notify;

pub use correlation::{CallbackIdGenerator, CorrelationCounter};
pub use escape::{escape_script_literal, unescape_script_literal};
pub use messages::*;
pub use notify::{is_bridge_notification, QUEUE_MESSAGE_TOKEN};
