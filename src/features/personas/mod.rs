//! # Personas Feature
//!
//! Four canned chat personas selected by the `type` query parameter.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add avatar_url() for CDN-hosted avatars
//! - 1.0.0: Initial release

pub mod choices;
pub mod prompt_builder;
pub mod registry;

pub use choices::{is_known_persona, parse_selector, DEFAULT_PERSONA_ID};
pub use prompt_builder::PromptBuilder;
pub use registry::{avatar_url, BubbleStyle, PersonaConfig, PersonaRegistry};
