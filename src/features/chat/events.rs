//! # Chat Events
//!
//! Display events emitted by the session driver while a reply streams.
//! The web layer forwards each one as a server-sent event whose name is
//! [`ChatEvent::name`] and whose data is the JSON encoding of the event.

use serde::{Deserialize, Serialize};

use crate::features::render::Bubble;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// The user's message, rendered immediately
    UserMessage { bubble: Bubble },
    /// Transient placeholder for warm personas, shown before the first fragment
    Thinking { bubble: Bubble },
    /// One incremental piece of the assistant reply
    Fragment { text: String },
    /// The placeholder should be removed
    ThinkingCleared,
    /// Stream finished; the assistant message as stored in the transcript
    Done { bubble: Bubble },
    /// Upstream failure text, forwarded untranslated
    Error { message: String },
}

impl ChatEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::UserMessage { .. } => "user_message",
            ChatEvent::Thinking { .. } => "thinking",
            ChatEvent::Fragment { .. } => "fragment",
            ChatEvent::ThinkingCleared => "thinking_cleared",
            ChatEvent::Done { .. } => "done",
            ChatEvent::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::Done { .. } | ChatEvent::Error { .. })
    }
}
