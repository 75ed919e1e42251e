//! # Chat Feature
//!
//! Per-page chat sessions, the submission driver and the streaming completion
//! seam.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod completion;
pub mod driver;
pub mod events;
pub mod message;
pub mod session;

pub use completion::{CompletionRequest, CompletionService, FragmentStream, OpenAiCompletion};
pub use driver::ChatDriver;
pub use events::ChatEvent;
pub use message::{ChatMessage, Role};
pub use session::ChatSession;
