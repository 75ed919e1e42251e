//! # Feature: Persona Registry
//!
//! Four canned chat personas selected by a small integer id. Prompt bodies are
//! loaded from prompt/*.md files at compile time.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Added avatar URL resolution with optional AVATAR_BASE_URL
//! - 1.0.0: Initial release with Emma, Jane and the two academic assistants

use serde::{Deserialize, Serialize};

use super::choices::DEFAULT_PERSONA_ID;

/// Visual treatment for assistant bubbles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubbleStyle {
    Rounded,
    Square,
}

impl BubbleStyle {
    /// Inline CSS for this style: background color, radius and padding
    pub fn css(&self) -> &'static str {
        match self {
            BubbleStyle::Rounded => "background-color: #e0f7fa; border-radius: 20px; padding: 10px;",
            BubbleStyle::Square => "background-color: #e0e0e0; border-radius: 5px; padding: 10px;",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub id: u8,
    pub title: String,
    pub description: String,
    pub system_prompt: String,
    pub system_prompt_secondary: String,
    pub input_placeholder: String,
    /// Instruction appended as a third system message; empty for personas without it
    pub sources_directive: String,
    /// Avatar reference relative to the public directory, e.g. `public/emma.png`
    pub avatar: Option<String>,
    pub bubble_style: BubbleStyle,
    /// Warm personas show a "Thinking..." placeholder while the reply streams
    pub warm: bool,
}

#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<PersonaConfig>,
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

const COMPANION_DESCRIPTION: &str =
    "I'm your academic companion for offering guidance on coursework, study strategies, writing, and more.";
const ACADEMIC_TITLE: &str = "Academic AI Assistant";
const ACADEMIC_DESCRIPTION: &str = "Get answers, fast.";

impl PersonaRegistry {
    pub fn new() -> Self {
        let show_sources = include_str!("../../../prompt/show_sources.md").trim_end();

        let personas = vec![
            PersonaConfig {
                id: 1,
                title: "Hi! I'm Emma, your AI assistant.".to_string(),
                description: COMPANION_DESCRIPTION.to_string(),
                system_prompt: include_str!("../../../prompt/emma.md").trim_end().to_string(),
                system_prompt_secondary: "You don't need to use language that is difficult to understand or big words. Just be conversational and use simple terminology to best answer the question, but have good knowledge to answer.".to_string(),
                input_placeholder: "How can I help?".to_string(),
                sources_directive: show_sources.to_string(),
                avatar: Some("public/emma.png".to_string()),
                bubble_style: BubbleStyle::Rounded,
                warm: true,
            },
            PersonaConfig {
                id: 2,
                title: "Hi! I'm Jane, your AI assistant.".to_string(),
                description: COMPANION_DESCRIPTION.to_string(),
                system_prompt: include_str!("../../../prompt/jane.md").trim_end().to_string(),
                system_prompt_secondary: "Ensure you are a friendly and helpful companion and use emojis. You don't need to use big words, use terminology that is easy to understand.".to_string(),
                input_placeholder: "How can I help?".to_string(),
                sources_directive: String::new(),
                avatar: Some("public/jane.png".to_string()),
                bubble_style: BubbleStyle::Rounded,
                warm: true,
            },
            PersonaConfig {
                id: 3,
                title: ACADEMIC_TITLE.to_string(),
                description: ACADEMIC_DESCRIPTION.to_string(),
                system_prompt: include_str!("../../../prompt/direct.md").trim_end().to_string(),
                system_prompt_secondary: "Ensure your answer is correct and provides the function of assisting the user with their assignment.".to_string(),
                input_placeholder: "Input query...".to_string(),
                sources_directive: String::new(),
                avatar: None,
                bubble_style: BubbleStyle::Square,
                warm: false,
            },
            PersonaConfig {
                id: 4,
                title: ACADEMIC_TITLE.to_string(),
                description: ACADEMIC_DESCRIPTION.to_string(),
                system_prompt: include_str!("../../../prompt/structured.md").trim_end().to_string(),
                system_prompt_secondary: String::new(),
                input_placeholder: "Input query...".to_string(),
                sources_directive: show_sources.to_string(),
                avatar: None,
                bubble_style: BubbleStyle::Square,
                warm: false,
            },
        ];

        PersonaRegistry { personas }
    }

    /// Strict lookup; `None` for ids outside the registry
    pub fn get(&self, id: i64) -> Option<&PersonaConfig> {
        self.personas.iter().find(|p| i64::from(p.id) == id)
    }

    /// Lookup with fallback: any unknown id resolves to the default persona (id 1)
    pub fn lookup(&self, id: i64) -> &PersonaConfig {
        self.get(id).unwrap_or_else(|| self.default_persona())
    }

    /// Parse a raw `type` query value and look it up
    pub fn resolve(&self, raw: Option<&str>) -> &PersonaConfig {
        self.lookup(super::choices::parse_selector(raw))
    }

    /// Resolve a selector and return an owned persona whose avatar is a browser URL
    pub fn resolve_with_avatar(&self, raw: Option<&str>, base_url: Option<&str>) -> PersonaConfig {
        let mut persona = self.resolve(raw).clone();
        persona.avatar = persona
            .avatar
            .as_deref()
            .map(|avatar| avatar_url(avatar, base_url));
        persona
    }

    pub fn default_persona(&self) -> &PersonaConfig {
        self.personas
            .iter()
            .find(|p| i64::from(p.id) == DEFAULT_PERSONA_ID)
            .unwrap_or(&self.personas[0])
    }

    /// All personas in id order
    pub fn list(&self) -> &[PersonaConfig] {
        &self.personas
    }
}

/// Resolve an avatar reference to the URL the browser should load.
///
/// With a base URL the file name is appended to it, otherwise the reference is
/// served from the local public directory as an absolute path.
pub fn avatar_url(avatar: &str, base_url: Option<&str>) -> String {
    match base_url {
        Some(base) => {
            let base = base.trim_end_matches('/');
            let file = avatar.rsplit('/').next().unwrap_or(avatar);
            format!("{base}/{file}")
        }
        None => format!("/{}", avatar.trim_start_matches('/')),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_four_personas() {
        let registry = PersonaRegistry::new();
        let ids: Vec<u8> = registry.list().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_lookup_known_ids() {
        let registry = PersonaRegistry::new();
        for id in 1..=4 {
            assert_eq!(i64::from(registry.lookup(id).id), id);
        }
    }

    #[test]
    fn test_lookup_unknown_ids_fall_back_to_default() {
        let registry = PersonaRegistry::new();
        let default = registry.lookup(1).clone();
        for id in [0, 5, -1, 42, i64::MAX, i64::MIN] {
            assert_eq!(registry.lookup(id), &default, "id {id} should fall back");
        }
    }

    #[test]
    fn test_lookup_is_deterministic() {
        let registry = PersonaRegistry::new();
        assert_eq!(registry.lookup(3), registry.lookup(3));
        assert_eq!(registry.lookup(99), registry.lookup(99));
    }

    #[test]
    fn test_get_is_strict() {
        let registry = PersonaRegistry::new();
        assert!(registry.get(2).is_some());
        assert!(registry.get(0).is_none());
        assert!(registry.get(5).is_none());
    }

    #[test]
    fn test_resolve_selector_values() {
        let registry = PersonaRegistry::new();
        assert_eq!(registry.resolve(None), registry.lookup(1));
        assert_eq!(registry.resolve(Some("3")).id, 3);
        assert_eq!(registry.resolve(Some("abc")).id, 1);
        assert_eq!(registry.resolve(Some("-1")).id, 1);
    }

    #[test]
    fn test_emma_prompt_loaded() {
        let registry = PersonaRegistry::new();
        let emma = registry.lookup(1);
        assert!(emma.title.contains("Emma"));
        assert!(emma.system_prompt.contains("friendly and enthusiastic"));
        assert!(emma.system_prompt.contains("‘whimsical’"));
        assert!(!emma.system_prompt.ends_with('\n'));
        assert!(emma.sources_directive.contains("'Sources' section"));
        assert_eq!(emma.avatar.as_deref(), Some("public/emma.png"));
    }

    #[test]
    fn test_persona_content_axes() {
        let registry = PersonaRegistry::new();

        let jane = registry.lookup(2);
        assert!(jane.system_prompt.contains("Engage in small talk"));
        assert!(jane.sources_directive.is_empty());
        assert!(jane.system_prompt_secondary.contains("emojis"));

        let direct = registry.lookup(3);
        assert!(direct.system_prompt.contains("purely functional"));
        assert!(direct.avatar.is_none());
        assert_eq!(direct.input_placeholder, "Input query...");

        let structured = registry.lookup(4);
        assert!(structured.system_prompt.contains("numbered steps"));
        assert!(structured.system_prompt_secondary.is_empty());
        assert_eq!(structured.sources_directive, registry.lookup(1).sources_directive);
    }

    #[test]
    fn test_warm_and_bubble_styles() {
        let registry = PersonaRegistry::new();
        for persona in registry.list() {
            let warm = persona.id == 1 || persona.id == 2;
            assert_eq!(persona.warm, warm);
            let expected = if warm {
                BubbleStyle::Rounded
            } else {
                BubbleStyle::Square
            };
            assert_eq!(persona.bubble_style, expected);
            assert!(!persona.title.is_empty());
            assert!(!persona.description.is_empty());
            assert!(!persona.system_prompt.is_empty());
            assert!(!persona.input_placeholder.is_empty());
        }
    }

    #[test]
    fn test_bubble_css_triples() {
        assert_eq!(
            BubbleStyle::Rounded.css(),
            "background-color: #e0f7fa; border-radius: 20px; padding: 10px;"
        );
        assert_eq!(
            BubbleStyle::Square.css(),
            "background-color: #e0e0e0; border-radius: 5px; padding: 10px;"
        );
    }

    #[test]
    fn test_avatar_url_local() {
        assert_eq!(avatar_url("public/emma.png", None), "/public/emma.png");
    }

    #[test]
    fn test_resolve_with_avatar() {
        let registry = PersonaRegistry::new();

        let jane = registry.resolve_with_avatar(Some("2"), None);
        assert_eq!(jane.avatar.as_deref(), Some("/public/jane.png"));

        let emma = registry.resolve_with_avatar(None, Some("https://cdn.example.com"));
        assert_eq!(emma.avatar.as_deref(), Some("https://cdn.example.com/emma.png"));

        let direct = registry.resolve_with_avatar(Some("3"), Some("https://cdn.example.com"));
        assert!(direct.avatar.is_none());
        assert_eq!(direct.system_prompt, registry.lookup(3).system_prompt);
    }

    #[test]
    fn test_avatar_url_with_base() {
        assert_eq!(
            avatar_url("public/jane.png", Some("https://cdn.example.com/img/")),
            "https://cdn.example.com/img/jane.png"
        );
    }
}
