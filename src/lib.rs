// Core layer - configuration
pub mod core;

// Features layer - personas, chat sessions, rendering
pub mod features;

// Web layer - HTTP routes, session store, SSE streaming
pub mod web;

pub use core::Config;

pub use features::{
    // Chat
    ChatDriver, ChatEvent, ChatMessage, ChatSession, CompletionService, OpenAiCompletion, Role,
    // Personas
    BubbleStyle, PersonaConfig, PersonaRegistry, PromptBuilder,
    // Rendering
    Bubble, PageRenderer,
};

pub use web::{router, AppState, SessionStore};
