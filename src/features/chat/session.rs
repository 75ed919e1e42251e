//! Per-page chat session and its transcript
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Owned session object replacing ambient page state

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::message::ChatMessage;
use crate::features::personas::PersonaConfig;
use crate::features::render::Bubble;

/// One browser page's conversation.
///
/// The transcript is for display only. Index 0 is the persona's primary
/// system prompt once [`ChatSession::init_session`] has run; later entries are
/// appended in submission order and never removed.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: Uuid,
    pub persona: PersonaConfig,
    transcript: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl ChatSession {
    /// Create a session with the transcript already initialized
    pub fn new(persona: PersonaConfig) -> Self {
        let now = Utc::now();
        let mut session = ChatSession {
            id: Uuid::new_v4(),
            persona,
            transcript: Vec::new(),
            created_at: now,
            last_active: now,
        };
        session.init_session();
        session
    }

    /// Seed the transcript with the system prompt. No-op once populated.
    pub fn init_session(&mut self) {
        if self.transcript.is_empty() {
            self.transcript
                .push(ChatMessage::system(self.persona.system_prompt.clone()));
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.transcript.push(message);
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// Bubbles for every message after the system prompt
    pub fn render_history(&self) -> Vec<Bubble> {
        self.transcript
            .iter()
            .skip(1)
            .map(|message| Bubble::for_message(message, &self.persona))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::chat::Role;
    use crate::features::personas::{BubbleStyle, PersonaRegistry};

    #[test]
    fn test_new_session_has_system_prompt() {
        let registry = PersonaRegistry::new();
        let session = ChatSession::new(registry.lookup(3).clone());

        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, Role::System);
        assert_eq!(
            session.transcript()[0].content,
            registry.lookup(3).system_prompt
        );
    }

    #[test]
    fn test_init_session_is_idempotent() {
        let registry = PersonaRegistry::new();
        let mut session = ChatSession::new(registry.lookup(1).clone());
        session.push(ChatMessage::user("hi"));
        session.push(ChatMessage::assistant("hello!"));

        session.init_session();
        session.init_session();

        assert_eq!(session.transcript().len(), 3);
        assert_eq!(session.transcript()[1], ChatMessage::user("hi"));
    }

    #[test]
    fn test_render_history_skips_system_prompt() {
        let registry = PersonaRegistry::new();
        let session = ChatSession::new(registry.lookup(2).clone());
        assert!(session.render_history().is_empty());
    }

    #[test]
    fn test_render_history_styles() {
        let registry = PersonaRegistry::new();
        let mut session = ChatSession::new(registry.lookup(4).clone());
        session.push(ChatMessage::user("q"));
        session.push(ChatMessage::assistant("a"));

        let bubbles = session.render_history();

        assert_eq!(bubbles.len(), 2);
        assert_eq!(bubbles[0].role, Role::User);
        assert!(bubbles[0].style.is_none());
        assert_eq!(bubbles[1].role, Role::Assistant);
        assert_eq!(bubbles[1].style.as_deref(), Some(BubbleStyle::Square.css()));
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let registry = PersonaRegistry::new();
        let a = ChatSession::new(registry.lookup(1).clone());
        let b = ChatSession::new(registry.lookup(1).clone());
        assert_ne!(a.id, b.id);
    }
}
