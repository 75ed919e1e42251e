//! # Render Feature
//!
//! Chat bubbles, Markdown rendering and the HTML page served to the browser.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod bubble;
pub mod markdown;
pub mod page;

pub use bubble::{Bubble, THINKING_TEXT};
pub use markdown::render_markdown;
pub use page::{PageRenderer, DISCLAIMER, MISSING_KEY_MESSAGE};
