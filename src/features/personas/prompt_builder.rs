//! Outbound request composition
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Fixed four-message layout (prompt, secondary prompt, sources, user)

use super::PersonaConfig;
use crate::features::chat::ChatMessage;

/// Builder for the message list sent to the completion service.
///
/// The list never includes transcript history: the model sees the persona's
/// three system messages and the latest user message only.
///
/// # Example
///
/// ```ignore
/// let messages = PromptBuilder::new(&persona)
///     .with_user_message("What is 2+2?")
///     .build();
/// assert_eq!(messages.len(), 4);
/// ```
pub struct PromptBuilder<'a> {
    persona: &'a PersonaConfig,
    user_message: String,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(persona: &'a PersonaConfig) -> Self {
        Self {
            persona,
            user_message: String::new(),
        }
    }

    pub fn with_user_message(mut self, text: &str) -> Self {
        self.user_message = text.to_string();
        self
    }

    /// Build `[system, secondary system, sources directive, user]`.
    /// Empty persona fields are still sent so the shape stays fixed.
    pub fn build(self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.persona.system_prompt.clone()),
            ChatMessage::system(self.persona.system_prompt_secondary.clone()),
            ChatMessage::system(self.persona.sources_directive.clone()),
            ChatMessage::user(self.user_message),
        ]
    }
}
