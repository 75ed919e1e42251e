//! # Features
//!
//! - `personas`: persona registry, selector parsing, request composition
//! - `chat`: sessions, submission driver, streaming completions
//! - `render`: chat bubbles and the HTML page

pub mod chat;
pub mod personas;
pub mod render;

pub use chat::{ChatDriver, ChatEvent, ChatMessage, ChatSession, CompletionService, OpenAiCompletion, Role};
pub use personas::{BubbleStyle, PersonaConfig, PersonaRegistry, PromptBuilder};
pub use render::{Bubble, PageRenderer};
