//! HTML page rendering
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Chat page and credential-missing page from one template

use anyhow::{Context, Result};
use minijinja::{context, Environment};
use uuid::Uuid;

use crate::features::personas::PersonaConfig;

const CHAT_TEMPLATE: &str = include_str!("../../../templates/chat.html");

pub const DISCLAIMER: &str = "⚠️ Please keep in mind that this chatbot does not remember previous messages or conversations due to privacy reasons. For the best experience, include any important context or details in your message.";

pub const MISSING_KEY_MESSAGE: &str = "🗝️ Please add your OpenAI API key to continue.";

/// Template environment holding the page templates
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("chat.html", CHAT_TEMPLATE)
            .context("Failed to load chat.html template")?;
        Ok(Self { env })
    }

    /// Full chat surface bound to a live session
    pub fn chat_page(&self, persona: &PersonaConfig, session_id: Uuid) -> Result<String> {
        self.render(persona, Some(session_id), None)
    }

    /// Header, description and disclaimer only; no input, no session
    pub fn missing_key_page(&self, persona: &PersonaConfig) -> Result<String> {
        self.render(persona, None, Some(MISSING_KEY_MESSAGE))
    }

    fn render(
        &self,
        persona: &PersonaConfig,
        session_id: Option<Uuid>,
        info_message: Option<&str>,
    ) -> Result<String> {
        let template = self.env.get_template("chat.html")?;
        template
            .render(context! {
                title => &persona.title,
                description => &persona.description,
                avatar_url => &persona.avatar,
                disclaimer => DISCLAIMER,
                input_placeholder => &persona.input_placeholder,
                assistant_style => persona.bubble_style.css(),
                session_id => session_id.map(|id| id.to_string()),
                info_message => info_message,
            })
            .context("Failed to render chat page")
    }
}
