//! Chat bubble display model
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Markdown-rendered `html` alongside the raw content
//! - 1.0.0: Role-conditional avatar and inline style

use serde::{Deserialize, Serialize};

use super::markdown::render_markdown;
use crate::features::chat::{ChatMessage, Role};
use crate::features::personas::{BubbleStyle, PersonaConfig};

pub const THINKING_TEXT: &str = "Thinking...";

/// One rendered chat bubble as the browser draws it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bubble {
    pub role: Role,
    pub content: String,
    /// `content` rendered from Markdown, raw HTML escaped
    pub html: String,
    /// Avatar URL; only assistant bubbles carry one
    pub avatar: Option<String>,
    /// Inline CSS; `None` means the default chat styling
    pub style: Option<String>,
}

impl Bubble {
    /// Render a transcript message for the given persona.
    ///
    /// Assistant bubbles get the persona avatar and bubble style, user and
    /// system bubbles keep the defaults.
    pub fn for_message(message: &ChatMessage, persona: &PersonaConfig) -> Self {
        match message.role {
            Role::Assistant => Self::assistant(message.content.clone(), persona),
            role => Bubble {
                role,
                html: render_markdown(&message.content),
                content: message.content.clone(),
                avatar: None,
                style: None,
            },
        }
    }

    pub fn assistant(content: String, persona: &PersonaConfig) -> Self {
        Bubble {
            role: Role::Assistant,
            html: render_markdown(&content),
            content,
            avatar: persona.avatar.clone(),
            style: Some(persona.bubble_style.css().to_string()),
        }
    }

    /// Transient placeholder shown while a warm persona's reply streams in
    pub fn thinking(persona: &PersonaConfig) -> Self {
        Bubble {
            role: Role::Assistant,
            content: THINKING_TEXT.to_string(),
            html: render_markdown(THINKING_TEXT),
            avatar: persona.avatar.clone(),
            style: Some(format!("{} font-style: italic;", BubbleStyle::Rounded.css())),
        }
    }
}
